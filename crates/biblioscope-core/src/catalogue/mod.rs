//! Catalogue export parsing: ordered line rules, per-record grouping and
//! electronic-location links.

pub mod links;
pub mod parser;
pub mod rules;

pub use links::{CatalogueLink, extract_links, split_subfields};
pub use parser::{metadata_from_file, metadata_from_lines, metadata_from_triplets, parse_line};
pub use rules::{Rule, RuleSet, RuleSetVariant, TagRange};
