use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::config::TeiConfig;
use crate::error::{ReconError, Result};
use crate::models::{MetadataMap, MetadataRecord, RecordId};
use crate::tei::cache::TreeCache;
use crate::tei::query::PathQuery;
use crate::tei::tree::XmlDocument;

static TEI_FILENAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{9})\.tei\.xml$").unwrap());

/// Record id encoded in a TEI filename (`123456789.tei.xml`), or the
/// filename itself when it does not follow that pattern.
pub fn record_id_from_filename(filename: &str) -> RecordId {
    TEI_FILENAME_REGEX
        .captures(filename)
        .and_then(|caps| RecordId::parse(&caps[1]).ok())
        .unwrap_or_else(|| RecordId::fallback(filename))
}

/// `*.xml` files directly inside `dir`, sorted by name. Hidden files are skipped.
pub fn xml_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ReconError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ReconError::file_io(dir, e))? {
        let path = entry.map_err(|e| ReconError::file_io(dir, e))?.path();
        let hidden = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with('.'));
        let is_xml = path.extension().is_some_and(|ext| ext == "xml");
        if path.is_file() && is_xml && !hidden {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Pulls title and author metadata out of TEI documents with path queries.
///
/// Parsed trees are memoized in a [`TreeCache`] owned by the extractor, so
/// several queries against one file parse it once.
#[derive(Debug)]
pub struct TeiExtractor {
    title: PathQuery,
    author: PathQuery,
    name_part: PathQuery,
    cache: TreeCache,
}

impl TeiExtractor {
    pub fn new(config: &TeiConfig) -> Result<Self> {
        let namespaces = &config.namespaces;
        Ok(Self {
            title: PathQuery::parse(&config.title_query, namespaces)?,
            author: PathQuery::parse(&config.author_query, namespaces)?,
            name_part: PathQuery::parse(&config.name_part_query, namespaces)?,
            cache: TreeCache::new(config.cache_capacity),
        })
    }

    pub fn cache(&self) -> &TreeCache {
        &self.cache
    }

    fn document(&mut self, path: &Path) -> Result<std::rc::Rc<XmlDocument>> {
        self.cache.get_or_parse(path)
    }

    /// Direct text of the first title match; `None` when nothing matches.
    pub fn title(&mut self, path: &Path) -> Result<Option<String>> {
        let doc = self.document(path)?;
        Ok(self
            .title
            .first(&doc)
            .and_then(|id| doc.element(id).text.clone()))
    }

    /// One name per matching author element, its name parts joined by spaces.
    pub fn authors(&mut self, path: &Path) -> Result<Vec<String>> {
        let doc = self.document(path)?;
        let authors = self
            .author
            .select(&doc)
            .into_iter()
            .map(|person| {
                self.name_part
                    .select_from(&doc, person)
                    .into_iter()
                    .map(|part| doc.element(part).text.as_deref().unwrap_or(""))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        Ok(authors)
    }

    pub fn metadata_from_file(&mut self, path: &Path) -> Result<MetadataRecord> {
        Ok(MetadataRecord {
            title: self.title(path)?,
            authors: self.authors(path)?,
        })
    }

    /// Metadata for every `*.xml` file in `dir`, keyed by filename-derived id.
    pub fn metadata_from_dir(&mut self, dir: &Path) -> Result<MetadataMap> {
        let files = xml_files_in(dir)?;
        info!(dir = %dir.display(), files = files.len(), "extracting TEI metadata");

        let mut metadata = MetadataMap::new();
        for path in files {
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let id = record_id_from_filename(&filename);
            if !id.is_catalogue_form() {
                debug!(%filename, "no record id in filename, using filename as id");
            }
            let record = self.metadata_from_file(&path)?;
            metadata.insert(id, record);
        }

        debug!(
            hits = self.cache.hits(),
            misses = self.cache.misses(),
            "tree cache usage"
        );
        Ok(metadata)
    }
}
