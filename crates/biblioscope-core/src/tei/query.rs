use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{ReconError, Result};
use crate::tei::tree::{NodeId, XmlDocument, XmlElement};

/// Prefix to namespace URI bindings available to queries.
pub type Namespaces = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    AnyIn(String),
    Name {
        namespace: Option<String>,
        local: String,
    },
}

impl NameTest {
    fn parse(raw: &str, namespaces: &Namespaces) -> Result<Self> {
        let resolve = |prefix: &str| {
            namespaces
                .get(prefix)
                .cloned()
                .ok_or_else(|| ReconError::InvalidQuery(format!("unbound prefix '{prefix}'")))
        };

        match raw.split_once(':') {
            None if raw == "*" => Ok(Self::Any),
            None => Ok(Self::Name {
                namespace: None,
                local: raw.to_string(),
            }),
            Some((prefix, "*")) => Ok(Self::AnyIn(resolve(prefix)?)),
            Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => Ok(Self::Name {
                namespace: Some(resolve(prefix)?),
                local: local.to_string(),
            }),
            Some(_) => Err(ReconError::InvalidQuery(format!("bad name test '{raw}'"))),
        }
    }

    fn matches(&self, element: &XmlElement) -> bool {
        match self {
            Self::Any => true,
            Self::AnyIn(ns) => element.namespace.as_deref() == Some(ns.as_str()),
            Self::Name { namespace, local } => {
                element.local_name == *local && element.namespace == *namespace
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NameTest,
}

/// A location path over element names: `//t:sourceDesc//t:author/t:persName`.
///
/// Supports the child (`/`) and descendant (`//`) axes with prefixed,
/// unprefixed and wildcard name tests. Relative paths are evaluated from a
/// context element; absolute paths always start at the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    expr: String,
    absolute: bool,
    steps: Vec<Step>,
}

impl PathQuery {
    pub fn parse(expr: &str, namespaces: &Namespaces) -> Result<Self> {
        let invalid = |why: &str| ReconError::InvalidQuery(format!("{expr}: {why}"));

        let mut rest = expr.trim();
        let absolute = rest.starts_with('/');
        let mut axis = Axis::Child;
        if let Some(stripped) = rest.strip_prefix("//") {
            axis = Axis::Descendant;
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
        }

        let mut steps = Vec::new();
        loop {
            let end = rest.find('/').unwrap_or(rest.len());
            let name = rest[..end].trim();
            if name.is_empty() {
                return Err(invalid("empty step"));
            }
            steps.push(Step {
                axis,
                test: NameTest::parse(name, namespaces)?,
            });

            rest = &rest[end..];
            if rest.is_empty() {
                break;
            }
            if let Some(stripped) = rest.strip_prefix("//") {
                axis = Axis::Descendant;
                rest = stripped;
            } else {
                axis = Axis::Child;
                rest = &rest[1..];
            }
        }

        Ok(Self {
            expr: expr.trim().to_string(),
            absolute,
            steps,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.expr
    }

    /// Matching elements of an absolute query, in document order.
    pub fn select(&self, doc: &XmlDocument) -> Vec<NodeId> {
        self.evaluate(doc, None)
    }

    /// Matching elements relative to `context`, in document order.
    pub fn select_from(&self, doc: &XmlDocument, context: NodeId) -> Vec<NodeId> {
        if self.absolute {
            self.evaluate(doc, None)
        } else {
            self.evaluate(doc, Some(context))
        }
    }

    pub fn first(&self, doc: &XmlDocument) -> Option<NodeId> {
        self.select(doc).into_iter().next()
    }

    // `None` is the document node, whose only child is the root element.
    fn evaluate(&self, doc: &XmlDocument, context: Option<NodeId>) -> Vec<NodeId> {
        let mut current: Vec<Option<NodeId>> = vec![context];

        for step in &self.steps {
            let mut next = BTreeSet::new();
            for ctx in &current {
                let candidates: Vec<NodeId> = match (step.axis, ctx) {
                    (Axis::Child, None) => vec![doc.root()],
                    (Axis::Child, Some(id)) => doc.element(*id).children.clone(),
                    (Axis::Descendant, None) => doc.all().collect(),
                    (Axis::Descendant, Some(id)) => doc.descendants(*id).collect(),
                };
                next.extend(
                    candidates
                        .into_iter()
                        .filter(|id| step.test.matches(doc.element(*id))),
                );
            }
            current = next.into_iter().map(Some).collect();
            if current.is_empty() {
                break;
            }
        }

        current.into_iter().flatten().collect()
    }
}

impl fmt::Display for PathQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}
