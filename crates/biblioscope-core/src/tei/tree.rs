use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use crate::error::{ReconError, Result};

/// Index of an element in [`XmlDocument`]. Ids follow document order.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub namespace: Option<String>,
    pub local_name: String,
    pub value: String,
}

impl XmlAttribute {
    /// Clark notation, `{namespace}local` or just `local`.
    pub fn qualified_name(&self) -> String {
        clark_name(self.namespace.as_deref(), &self.local_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub namespace: Option<String>,
    pub local_name: String,
    pub attributes: Vec<XmlAttribute>,
    /// Text between the start tag and the first child element.
    pub text: Option<String>,
    pub children: Vec<NodeId>,
    /// One past the last descendant's id.
    subtree_end: NodeId,
    /// Set once a child node (element, comment or processing instruction)
    /// has started; later text is tail text, not this element's.
    text_closed: bool,
}

impl XmlElement {
    pub fn qualified_name(&self) -> String {
        clark_name(self.namespace.as_deref(), &self.local_name)
    }

    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

fn clark_name(namespace: Option<&str>, local: &str) -> String {
    match namespace {
        Some(ns) => format!("{{{ns}}}{local}"),
        None => local.to_string(),
    }
}

/// Parsed element tree, stored as an arena in document order.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    elements: Vec<XmlElement>,
}

impl XmlDocument {
    /// Reads and parses a UTF-8 document. Other encodings are rejected as
    /// XML errors rather than transcoded.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| ReconError::file_io(path, e))?;
        let xml = String::from_utf8(bytes).map_err(|e| ReconError::Xml {
            path: path.to_path_buf(),
            message: format!(
                "not valid UTF-8 (byte offset {}); only UTF-8 documents are supported",
                e.utf8_error().valid_up_to()
            ),
        })?;
        Self::parse(path, &xml)
    }

    /// Parses `xml`; `source` only labels errors.
    pub fn parse(source: &Path, xml: &str) -> Result<Self> {
        let fail = |message: String| ReconError::Xml {
            path: source.to_path_buf(),
            message,
        };

        let mut reader = NsReader::from_str(xml);
        let mut elements: Vec<XmlElement> = Vec::new();
        let mut open: Vec<NodeId> = Vec::new();
        let mut root_closed = false;

        loop {
            let (ns, event) = reader
                .read_resolved_event()
                .map_err(|e| fail(e.to_string()))?;
            let namespace = namespace_uri(ns);

            match event {
                Event::Start(start) | Event::Empty(start) if root_closed => {
                    return Err(fail(format!(
                        "second root element <{}>",
                        String::from_utf8_lossy(start.local_name().as_ref())
                    )));
                }
                Event::Start(start) => {
                    let id = push_element(&reader, &mut elements, &open, namespace, &start)
                        .map_err(&fail)?;
                    open.push(id);
                }
                Event::Empty(start) => {
                    let id = push_element(&reader, &mut elements, &open, namespace, &start)
                        .map_err(&fail)?;
                    elements[id].subtree_end = id + 1;
                    if open.is_empty() {
                        root_closed = true;
                    }
                }
                Event::End(_) => {
                    let Some(id) = open.pop() else {
                        return Err(fail("unbalanced end tag".to_string()));
                    };
                    elements[id].subtree_end = elements.len();
                    if open.is_empty() {
                        root_closed = true;
                    }
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| fail(e.to_string()))?;
                    append_text(&mut elements, &open, &text);
                }
                Event::CData(cdata) => {
                    let bytes = cdata.into_inner();
                    append_text(&mut elements, &open, &String::from_utf8_lossy(&bytes));
                }
                Event::Comment(_) | Event::PI(_) => close_text(&mut elements, &open),
                Event::Eof => break,
                _ => {}
            }
        }

        if !open.is_empty() {
            return Err(fail("unexpected end of document".to_string()));
        }
        if elements.is_empty() {
            return Err(fail("document has no root element".to_string()));
        }

        Ok(Self { elements })
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn element(&self, id: NodeId) -> &XmlElement {
        &self.elements[id]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Descendants of `id` in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        (id + 1)..self.elements[id].subtree_end
    }

    /// Every element in document order.
    pub fn all(&self) -> impl Iterator<Item = NodeId> + '_ {
        0..self.elements.len()
    }
}

fn namespace_uri(ns: ResolveResult<'_>) -> Option<String> {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        _ => None,
    }
}

fn push_element(
    reader: &NsReader<&[u8]>,
    elements: &mut Vec<XmlElement>,
    open: &[NodeId],
    namespace: Option<String>,
    start: &BytesStart<'_>,
) -> std::result::Result<NodeId, String> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (ns, local) = reader.resolve_attribute(attr.key);
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        attributes.push(XmlAttribute {
            namespace: namespace_uri(ns),
            local_name: String::from_utf8_lossy(local.as_ref()).into_owned(),
            value: value.into_owned(),
        });
    }

    let id = elements.len();
    elements.push(XmlElement {
        namespace,
        local_name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attributes,
        text: None,
        children: Vec::new(),
        subtree_end: id + 1,
        text_closed: false,
    });
    if let Some(&parent) = open.last() {
        elements[parent].children.push(id);
        elements[parent].text_closed = true;
    }
    Ok(id)
}

fn append_text(elements: &mut [XmlElement], open: &[NodeId], text: &str) {
    let Some(&current) = open.last() else {
        return;
    };
    let element = &mut elements[current];
    if element.text_closed {
        return;
    }
    element.text.get_or_insert_with(String::new).push_str(text);
}

fn close_text(elements: &mut [XmlElement], open: &[NodeId]) {
    if let Some(&current) = open.last() {
        elements[current].text_closed = true;
    }
}
