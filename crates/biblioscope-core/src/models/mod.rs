pub mod record;

pub use record::{Field, MetadataMap, MetadataRecord, RecordId, Triplet};
