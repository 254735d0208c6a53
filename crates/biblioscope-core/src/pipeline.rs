use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::catalogue::{self, RuleSet};
use crate::compare::{Report, compare_metadata};
use crate::config::ReconConfig;
use crate::error::{ReconError, Result};
use crate::models::MetadataMap;
use crate::tei::TeiExtractor;

/// First file (by name) in `dir` with the given extension. Hidden files are skipped.
pub fn find_catalogue_file(dir: &Path, extension: &str) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(ReconError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| ReconError::file_io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            let hidden = path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with('.'));
            path.is_file() && !hidden && path.extension().is_some_and(|ext| ext == extension)
        })
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| ReconError::CatalogueNotFound {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        })
}

/// Both metadata universes of one input directory.
#[derive(Debug, Clone)]
pub struct Sources {
    pub catalogue_file: PathBuf,
    pub tei_dir: PathBuf,
    pub catalogue: MetadataMap,
    pub extracted: MetadataMap,
}

/// Runs the whole comparison for an input directory holding one catalogue
/// export and a subdirectory of TEI documents.
#[derive(Debug)]
pub struct Reconciler {
    config: ReconConfig,
    rules: RuleSet,
}

impl Reconciler {
    pub fn new(config: ReconConfig) -> Result<Self> {
        config.validate()?;
        let rules = config.catalogue.rule_set();
        Ok(Self { config, rules })
    }

    /// Locates and parses both sources. Missing inputs abort the run.
    pub fn load(&self, input_dir: &Path) -> Result<Sources> {
        let catalogue_file = find_catalogue_file(input_dir, &self.config.catalogue.extension)?;
        let tei_dir = input_dir.join(&self.config.tei.directory);
        if !tei_dir.is_dir() {
            return Err(ReconError::DirectoryNotFound(tei_dir));
        }

        info!(catalogue = %catalogue_file.display(), "loading catalogue export");
        let catalogue = catalogue::metadata_from_file(&self.rules, &catalogue_file)?;

        // The cache lives exactly as long as this run's extractor.
        let mut extractor = TeiExtractor::new(&self.config.tei)?;
        let extracted = extractor.metadata_from_dir(&tei_dir)?;

        info!(
            catalogue_records = catalogue.len(),
            extracted_records = extracted.len(),
            "sources loaded"
        );

        Ok(Sources {
            catalogue_file,
            tei_dir,
            catalogue,
            extracted,
        })
    }

    pub fn compare(&self, sources: &Sources) -> Report {
        let results = compare_metadata(&sources.catalogue, &sources.extracted);
        Report::build(results, &self.config.classify, self.config.report.summary)
    }

    pub fn load_and_compare(&self, input_dir: &Path) -> Result<Report> {
        let sources = self.load(input_dir)?;
        Ok(self.compare(&sources))
    }
}
