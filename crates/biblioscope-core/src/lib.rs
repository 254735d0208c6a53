//! biblioscope: measures how well metadata extracted from TEI documents
//! agrees with a catalogue export of the same records.

pub mod catalogue;
pub mod compare;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod tei;

pub use catalogue::{RuleSet, RuleSetVariant, TagRange};
pub use compare::{Category, ComparisonResult, Report, SummaryMode, Thresholds};
pub use config::ReconConfig;
pub use error::{ExitCode, ReconError, Result};
pub use models::*;
pub use pipeline::{Reconciler, Sources, find_catalogue_file};
pub use tei::{TeiExtractor, TreeCache};
