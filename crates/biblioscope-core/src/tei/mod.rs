//! TEI document side: element trees, path queries, the per-run tree cache
//! and metadata extraction.

pub mod cache;
pub mod extractor;
pub mod query;
pub mod schema;
pub mod tree;

pub use cache::TreeCache;
pub use extractor::{TeiExtractor, record_id_from_filename, xml_files_in};
pub use query::{Namespaces, PathQuery};
pub use tree::{XmlDocument, XmlElement};

pub const TEI_NAMESPACE: &str = "http://www.tei-c.org/ns/1.0";
