use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};
use crate::models::{Field, RecordId, Triplet};

// ─── Line patterns ──────────────────────────────────────────────────────────
//
// Every pattern anchors on `<id> <tag><ind1><ind2> L ` and captures the tag so
// the owning rule can check it against its tag set.

static TITLE_SUBTITLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<id>[0-9]{9}) (?P<tag>[0-9]{3}).. L .*\$\$a(?P<a>[^$]+).*\$\$b(?P<b>[^$]+)")
        .unwrap()
});

static SUBFIELD_A_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<id>[0-9]{9}) (?P<tag>[0-9]{3}).. L .*\$\$a(?P<a>[^$]+)").unwrap()
});

static INVERTED_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<id>[0-9]{9}) (?P<tag>[0-9]{3}).. L .*\$\$a(?P<family>[^$,]+), (?P<given>[^$,]+)",
    )
    .unwrap()
});

// ─── Tag ranges ─────────────────────────────────────────────────────────────

/// Inclusive range of catalogue field tags, written `"245"` or `"240-246"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagRange {
    pub start: u16,
    pub end: u16,
}

impl TagRange {
    pub const fn single(tag: u16) -> Self {
        Self {
            start: tag,
            end: tag,
        }
    }

    pub fn new(start: u16, end: u16) -> Result<Self> {
        if start > end || end > 999 {
            return Err(ReconError::InvalidTagRange(format!("{start}-{end}")));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, tag: u16) -> bool {
        (self.start..=self.end).contains(&tag)
    }
}

impl FromStr for TagRange {
    type Err = ReconError;

    fn from_str(input: &str) -> Result<Self> {
        let input = input.trim();
        let parse_tag = |raw: &str| {
            let raw = raw.trim();
            if raw.len() != 3 {
                return Err(ReconError::InvalidTagRange(input.to_string()));
            }
            raw.parse::<u16>()
                .map_err(|_| ReconError::InvalidTagRange(input.to_string()))
        };

        match input.split_once('-') {
            Some((start, end)) => Self::new(parse_tag(start)?, parse_tag(end)?),
            None => parse_tag(input).map(Self::single),
        }
    }
}

impl TryFrom<String> for TagRange {
    type Error = ReconError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TagRange> for String {
    fn from(range: TagRange) -> Self {
        range.to_string()
    }
}

impl fmt::Display for TagRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{:03}", self.start)
        } else {
            write!(f, "{:03}-{:03}", self.start, self.end)
        }
    }
}

fn tags_contain(tags: &[TagRange], tag: u16) -> bool {
    tags.iter().any(|range| range.contains(tag))
}

// ─── Rules ──────────────────────────────────────────────────────────────────

type Extractor = fn(&RecordId, &Captures<'_>) -> Vec<Triplet>;

/// A catalogue line pattern paired with the triplets it produces.
pub struct Rule {
    name: &'static str,
    tags: Vec<TagRange>,
    pattern: &'static Lazy<Regex>,
    extract: Extractor,
}

impl Rule {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Triplets for `line`, or `None` when the rule does not recognize it.
    pub fn apply(&self, line: &str) -> Option<Vec<Triplet>> {
        let caps = self.pattern.captures(line)?;
        let tag = caps["tag"].parse::<u16>().ok()?;
        if !tags_contain(&self.tags, tag) {
            return None;
        }
        let id = RecordId::parse(&caps["id"]).ok()?;
        Some((self.extract)(&id, &caps))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .finish()
    }
}

fn title_and_subtitle(id: &RecordId, caps: &Captures<'_>) -> Vec<Triplet> {
    vec![
        Triplet::new(id.clone(), Field::Title, &caps["a"]),
        Triplet::new(id.clone(), Field::Title, &caps["b"]),
    ]
}

fn title(id: &RecordId, caps: &Captures<'_>) -> Vec<Triplet> {
    vec![Triplet::new(id.clone(), Field::Title, &caps["a"])]
}

fn inverted_name(id: &RecordId, caps: &Captures<'_>) -> Vec<Triplet> {
    let name = format!("{} {}", &caps["given"], &caps["family"]);
    vec![Triplet::new(id.clone(), Field::Authors, name)]
}

fn plain_name(id: &RecordId, caps: &Captures<'_>) -> Vec<Triplet> {
    vec![Triplet::new(id.clone(), Field::Authors, &caps["a"])]
}

/// Which built-in tag sets a [`RuleSet`] starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSetVariant {
    #[default]
    Strict,
    Loose,
}

impl RuleSetVariant {
    pub fn title_tags(self) -> Vec<TagRange> {
        match self {
            Self::Strict => vec![TagRange::single(245)],
            Self::Loose => vec![TagRange { start: 240, end: 246 }],
        }
    }

    pub fn author_tags(self) -> Vec<TagRange> {
        match self {
            Self::Strict => vec![TagRange::single(100), TagRange::single(110)],
            Self::Loose => vec![TagRange { start: 100, end: 111 }],
        }
    }
}

impl FromStr for RuleSetVariant {
    type Err = ReconError;

    fn from_str(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "loose" => Ok(Self::Loose),
            other => Err(ReconError::Config(format!("unknown rule set: {other}"))),
        }
    }
}

/// Ordered catalogue rules. The first rule that recognizes a line wins,
/// so "title with subtitle" sits ahead of the bare title rule it overlaps.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(title_tags: Vec<TagRange>, author_tags: Vec<TagRange>) -> Self {
        let rules = vec![
            Rule {
                name: "title-with-subtitle",
                tags: title_tags.clone(),
                pattern: &TITLE_SUBTITLE_REGEX,
                extract: title_and_subtitle,
            },
            Rule {
                name: "title",
                tags: title_tags,
                pattern: &SUBFIELD_A_REGEX,
                extract: title,
            },
            Rule {
                name: "author-inverted",
                tags: author_tags.clone(),
                pattern: &INVERTED_NAME_REGEX,
                extract: inverted_name,
            },
            Rule {
                name: "author",
                tags: author_tags,
                pattern: &SUBFIELD_A_REGEX,
                extract: plain_name,
            },
        ];
        Self { rules }
    }

    pub fn strict() -> Self {
        Self::from_variant(RuleSetVariant::Strict)
    }

    pub fn loose() -> Self {
        Self::from_variant(RuleSetVariant::Loose)
    }

    pub fn from_variant(variant: RuleSetVariant) -> Self {
        Self::new(variant.title_tags(), variant.author_tags())
    }

    /// First rule recognizing `line`, with the triplets it extracted.
    pub fn first_match(&self, line: &str) -> Option<(&Rule, Vec<Triplet>)> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(line).map(|triplets| (rule, triplets)))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::strict()
    }
}
