use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::catalogue::rules::RuleSet;
use crate::error::{ReconError, Result};
use crate::models::{Field, MetadataMap, MetadataRecord, RecordId, Triplet};

/// Triplets for a single catalogue line. Unrecognized lines yield nothing.
pub fn parse_line(rules: &RuleSet, line: &str) -> Vec<Triplet> {
    rules
        .first_match(line)
        .map(|(_, triplets)| triplets)
        .unwrap_or_default()
}

/// Folds one record's triplets into its canonical metadata.
///
/// Title values are space-joined in production order; the title is always
/// present on catalogue records, empty when no title line was seen.
pub fn metadata_from_triplets<'a, I>(triplets: I) -> MetadataRecord
where
    I: IntoIterator<Item = &'a Triplet>,
{
    let mut titles: Vec<&str> = Vec::new();
    let mut authors = Vec::new();
    for triplet in triplets {
        match triplet.field {
            Field::Title => titles.push(&triplet.value),
            Field::Authors => authors.push(triplet.value.clone()),
        }
    }

    MetadataRecord {
        title: Some(titles.join(" ")),
        authors,
    }
}

/// Canonical metadata for every record id mentioned by a recognized line.
pub fn metadata_from_lines<'a, I>(rules: &RuleSet, lines: I) -> MetadataMap
where
    I: IntoIterator<Item = &'a str>,
{
    let mut grouped: BTreeMap<RecordId, Vec<Triplet>> = BTreeMap::new();
    let mut recognized = 0usize;
    let mut skipped = 0usize;

    for line in lines {
        let triplets = parse_line(rules, line);
        if triplets.is_empty() {
            skipped += 1;
            continue;
        }
        recognized += 1;
        for triplet in triplets {
            grouped.entry(triplet.id.clone()).or_default().push(triplet);
        }
    }

    debug!(
        recognized,
        skipped,
        records = grouped.len(),
        "parsed catalogue lines"
    );

    grouped
        .into_iter()
        .map(|(id, triplets)| (id, metadata_from_triplets(&triplets)))
        .collect()
}

/// Reads a catalogue export from disk and parses it.
pub fn metadata_from_file(rules: &RuleSet, path: &Path) -> Result<MetadataMap> {
    let bytes = std::fs::read(path).map_err(|e| ReconError::file_io(path, e))?;
    let contents = String::from_utf8_lossy(&bytes);
    debug!(path = %path.display(), "reading catalogue export");
    Ok(metadata_from_lines(rules, contents.lines()))
}
