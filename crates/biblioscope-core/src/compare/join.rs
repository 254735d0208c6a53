use std::collections::BTreeSet;

use crate::models::{MetadataMap, MetadataRecord, RecordId};

static EMPTY_RECORD: MetadataRecord = MetadataRecord {
    title: None,
    authors: Vec::new(),
};

/// The two sides of one record id. A side missing from its source is the
/// empty record, never omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPair<'a> {
    pub id: &'a RecordId,
    pub catalogue: &'a MetadataRecord,
    pub extracted: &'a MetadataRecord,
}

/// Full outer join on record id, ordered by id.
pub fn join_records<'a>(catalogue: &'a MetadataMap, extracted: &'a MetadataMap) -> Vec<RecordPair<'a>> {
    let ids: BTreeSet<&RecordId> = catalogue.keys().chain(extracted.keys()).collect();
    ids.into_iter()
        .map(|id| RecordPair {
            id,
            catalogue: catalogue.get(id).unwrap_or(&EMPTY_RECORD),
            extracted: extracted.get(id).unwrap_or(&EMPTY_RECORD),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> MetadataMap {
        entries
            .iter()
            .map(|(id, title)| (RecordId::parse(id).unwrap(), MetadataRecord::new(*title)))
            .collect()
    }

    #[test]
    fn union_of_ids_each_once() {
        let catalogue = map(&[("111111111", "A"), ("222222222", "B")]);
        let extracted = map(&[("222222222", "B"), ("333333333", "C")]);

        let pairs = join_records(&catalogue, &extracted);
        let ids: Vec<&str> = pairs.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["111111111", "222222222", "333333333"]);
    }

    #[test]
    fn absent_side_is_empty_record() {
        let catalogue = map(&[("111111111", "A")]);
        let extracted = MetadataMap::new();

        let pairs = join_records(&catalogue, &extracted);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].catalogue.title.as_deref(), Some("A"));
        assert_eq!(pairs[0].extracted, &MetadataRecord::default());
    }

    #[test]
    fn empty_inputs_join_to_nothing() {
        assert!(join_records(&MetadataMap::new(), &MetadataMap::new()).is_empty());
    }
}
