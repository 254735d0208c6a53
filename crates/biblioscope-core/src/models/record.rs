use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};

static RECORD_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{9}$").unwrap());

/// Join key shared by the catalogue export and the TEI documents.
///
/// Catalogue ids are always nine digits. Ids derived from TEI filenames
/// that do not follow `<id>.tei.xml` keep the whole filename instead, so
/// they can never collide with a catalogue id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn parse(input: &str) -> Result<Self> {
        if RECORD_ID_REGEX.is_match(input) {
            Ok(Self(input.to_string()))
        } else {
            Err(ReconError::InvalidRecordId(input.to_string()))
        }
    }

    /// Id for a source that carries no recognizable record id.
    pub fn fallback(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id has the nine-digit catalogue form.
    pub fn is_catalogue_form(&self) -> bool {
        RECORD_ID_REGEX.is_match(&self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical per-record metadata, shared by both extraction paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub authors: Vec<String>,
}

impl MetadataRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Title as used for comparison: absent titles read as empty.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

pub type MetadataMap = BTreeMap<RecordId, MetadataRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Authors,
}

/// One value pulled out of a catalogue line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triplet {
    pub id: RecordId,
    pub field: Field,
    pub value: String,
}

impl Triplet {
    pub fn new(id: RecordId, field: Field, value: impl Into<String>) -> Self {
        Self {
            id,
            field,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nine_digit_id() {
        let id = RecordId::parse("123456789").unwrap();
        assert_eq!(id.as_str(), "123456789");
        assert!(id.is_catalogue_form());
    }

    #[test]
    fn rejects_short_and_alphanumeric_ids() {
        assert!(RecordId::parse("12345678").is_err());
        assert!(RecordId::parse("1234567890").is_err());
        assert!(RecordId::parse("12345678a").is_err());
    }

    #[test]
    fn fallback_id_is_not_catalogue_form() {
        let id = RecordId::fallback("notes.xml");
        assert_eq!(id.to_string(), "notes.xml");
        assert!(!id.is_catalogue_form());
    }

    #[test]
    fn empty_record_has_empty_title() {
        let record = MetadataRecord::default();
        assert_eq!(record.title_or_empty(), "");
        assert!(record.authors.is_empty());
    }

    #[test]
    fn record_serializes_without_absent_title() {
        let json = serde_json::to_string(&MetadataRecord::default()).unwrap();
        assert_eq!(json, r#"{"authors":[]}"#);
    }
}
