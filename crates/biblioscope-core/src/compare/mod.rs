//! Joining, scoring, classifying and summarizing the two metadata sources.

pub mod classify;
pub mod join;
pub mod report;
pub mod score;

pub use classify::{Category, Thresholds};
pub use join::{RecordPair, join_records};
pub use report::{CategoryCount, ClassifiedResult, Report, SummaryMode, summarize};
pub use score::{ComparisonResult, compare_metadata, evaluate, normalized_score};
