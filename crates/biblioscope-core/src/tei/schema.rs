use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::Result;
use crate::tei::cache::TreeCache;
use crate::tei::tree::{NodeId, XmlDocument};

/// Element and attribute paths occurring in a document, in document order.
///
/// An element is listed when it has non-blank text or child elements; each
/// attribute is listed as `<element>/<attribute>`. Names use Clark notation.
pub fn element_paths(doc: &XmlDocument) -> Vec<String> {
    let mut paths = Vec::new();
    collect(doc, doc.root(), &mut paths);
    paths
}

fn collect(doc: &XmlDocument, id: NodeId, paths: &mut Vec<String>) {
    let element = doc.element(id);
    let tag = element.qualified_name();
    if element.has_text() || !element.children.is_empty() {
        paths.push(tag.clone());
    }
    for attr in &element.attributes {
        paths.push(format!("{tag}/{}", attr.qualified_name()));
    }
    for child in &element.children {
        collect(doc, *child, paths);
    }
}

/// `(file, path)` pairs for every file, files in the given order.
pub fn paths_from_files(
    cache: &mut TreeCache,
    files: &[PathBuf],
) -> Result<Vec<(PathBuf, String)>> {
    let mut out = Vec::new();
    for file in files {
        let doc = cache.get_or_parse(file)?;
        out.extend(
            element_paths(&doc)
                .into_iter()
                .map(|path| (file.clone(), path)),
        );
    }
    Ok(out)
}

/// Each distinct path across `files`, sorted.
pub fn distinct_paths(cache: &mut TreeCache, files: &[PathBuf]) -> Result<BTreeSet<String>> {
    Ok(paths_from_files(cache, files)?
        .into_iter()
        .map(|(_, path)| path)
        .collect())
}
