use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::compare::join::{RecordPair, join_records};
use crate::models::{MetadataMap, MetadataRecord, RecordId};

/// Title agreement for one record id. Lower scores mean closer titles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub id: RecordId,
    pub score: f64,
    pub catalogue_title: String,
    pub extracted_title: String,
}

impl ComparisonResult {
    /// Ascending score, then catalogue title, extracted title and id.
    pub fn report_order(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.catalogue_title.cmp(&other.catalogue_title))
            .then_with(|| self.extracted_title.cmp(&other.extracted_title))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.4}  {}  {:?}  {:?}",
            self.score, self.id, self.catalogue_title, self.extracted_title
        )
    }
}

/// Levenshtein distance divided by the longer title's length in characters.
///
/// Two empty titles score 0, not NaN.
pub fn normalized_score(a: &str, b: &str) -> f64 {
    let distance = strsim::levenshtein(a, b);
    let longest = a.chars().count().max(b.chars().count()).max(1);
    distance as f64 / longest as f64
}

pub fn evaluate(id: &RecordId, catalogue: &MetadataRecord, extracted: &MetadataRecord) -> ComparisonResult {
    let catalogue_title = catalogue.title_or_empty().to_lowercase();
    let extracted_title = extracted.title_or_empty().to_lowercase();
    ComparisonResult {
        id: id.clone(),
        score: normalized_score(&catalogue_title, &extracted_title),
        catalogue_title,
        extracted_title,
    }
}

pub fn evaluate_pair(pair: &RecordPair<'_>) -> ComparisonResult {
    evaluate(pair.id, pair.catalogue, pair.extracted)
}

/// One result per id in either map, in report order.
pub fn compare_metadata(catalogue: &MetadataMap, extracted: &MetadataMap) -> Vec<ComparisonResult> {
    let mut results: Vec<ComparisonResult> = join_records(catalogue, extracted)
        .iter()
        .map(evaluate_pair)
        .collect();
    results.sort_by(ComparisonResult::report_order);
    results
}
