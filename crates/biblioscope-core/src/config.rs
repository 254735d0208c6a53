use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalogue::{RuleSet, RuleSetVariant, TagRange};
use crate::compare::{SummaryMode, Thresholds};
use crate::error::{ReconError, Result};
use crate::tei::cache::DEFAULT_CACHE_CAPACITY;
use crate::tei::{Namespaces, TEI_NAMESPACE};

/// Settings for one reconciliation run. Every field has a default, so a
/// config file only needs the keys it changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub catalogue: CatalogueConfig,
    pub tei: TeiConfig,
    pub classify: Thresholds,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogueConfig {
    pub rule_set: RuleSetVariant,
    /// Overrides the rule set's title tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_tags: Option<Vec<TagRange>>,
    /// Overrides the rule set's author tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_tags: Option<Vec<TagRange>>,
    /// Extension of the catalogue export inside the input directory.
    pub extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeiConfig {
    /// Subdirectory of the input directory holding the TEI files.
    pub directory: String,
    pub title_query: String,
    pub author_query: String,
    /// Evaluated relative to each author match.
    pub name_part_query: String,
    pub cache_capacity: usize,
    /// Prefixes usable in the queries above.
    pub namespaces: Namespaces,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub summary: SummaryMode,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            rule_set: RuleSetVariant::Strict,
            title_tags: None,
            author_tags: None,
            extension: "seq".to_string(),
        }
    }
}

impl Default for TeiConfig {
    fn default() -> Self {
        Self {
            directory: "tei".to_string(),
            title_query: "//t:titleStmt/t:title".to_string(),
            author_query: "//t:sourceDesc//t:author/t:persName".to_string(),
            name_part_query: "*".to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            namespaces: Namespaces::from([("t".to_string(), TEI_NAMESPACE.to_string())]),
        }
    }
}

impl CatalogueConfig {
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::new(
            self.title_tags
                .clone()
                .unwrap_or_else(|| self.rule_set.title_tags()),
            self.author_tags
                .clone()
                .unwrap_or_else(|| self.rule_set.author_tags()),
        )
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl ReconConfig {
    /// Load config from a specific path, falling back to defaults if the
    /// file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.classify.validate()?;
        for tags in [&self.catalogue.title_tags, &self.catalogue.author_tags]
            .into_iter()
            .flatten()
        {
            if tags.is_empty() {
                return Err(ReconError::Config("tag list must not be empty".to_string()));
            }
        }
        if self.catalogue.extension.trim().is_empty() {
            return Err(ReconError::Config("catalogue extension must not be empty".to_string()));
        }
        if self.tei.directory.trim().is_empty() {
            return Err(ReconError::Config("TEI directory must not be empty".to_string()));
        }
        Ok(())
    }
}
