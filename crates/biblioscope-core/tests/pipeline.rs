use std::fs;
use std::path::Path;

use biblioscope_core::{
    Category, ReconConfig, ReconError, Reconciler, RecordId, RuleSetVariant, SummaryMode,
};
use tempfile::TempDir;

const CATALOGUE: &str = "\
123456789 FMT   L BK
123456789 1001  L $$aDoe, Jane$$eauthor
123456789 24510 L $$aMain Title$$bA Subtitle
111111111 24500 L $$aFoo
222222222 24510 L $$aA study of catalogue quality
333333333 1001  L $$aNobody, Known
333333333 85641 L $$uhttps://example.org/333$$yDigitoitu julkaisu
";

fn tei(title: Option<&str>, authors: &[(&str, &str)]) -> String {
    let title = title
        .map(|t| format!("<titleStmt><title>{t}</title></titleStmt>"))
        .unwrap_or_default();
    let authors: String = authors
        .iter()
        .map(|(given, family)| {
            format!(
                "<author><persName><forename>{given}</forename><surname>{family}</surname></persName></author>"
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <teiHeader><fileDesc>{title}<sourceDesc><biblStruct><analytic>{authors}</analytic></biblStruct></sourceDesc></fileDesc></teiHeader>
</TEI>
"#
    )
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("export.seq"), CATALOGUE).unwrap();
    let tei_dir = dir.path().join("tei");
    fs::create_dir(&tei_dir).unwrap();
    fs::write(
        tei_dir.join("123456789.tei.xml"),
        tei(Some("Main Title A Subtitle"), &[("Jane", "Doe")]),
    )
    .unwrap();
    fs::write(
        tei_dir.join("222222222.tei.xml"),
        tei(Some("A stdy of catalog qualty"), &[]),
    )
    .unwrap();
    fs::write(tei_dir.join("333333333.tei.xml"), tei(None, &[("Known", "Nobody")])).unwrap();
    fs::write(tei_dir.join("unnamed.xml"), tei(Some("Stray"), &[])).unwrap();
    dir
}

fn reconciler() -> Reconciler {
    Reconciler::new(ReconConfig::default()).unwrap()
}

fn id(raw: &str) -> RecordId {
    RecordId::parse(raw).unwrap()
}

#[test]
fn every_id_appears_once() {
    let dir = fixture();
    let sources = reconciler().load(dir.path()).unwrap();
    let report = reconciler().compare(&sources);

    let mut union: Vec<&RecordId> = sources
        .catalogue
        .keys()
        .chain(sources.extracted.keys())
        .collect();
    union.sort();
    union.dedup();
    assert_eq!(report.total, union.len());
    assert_eq!(report.results.len(), 5);
}

#[test]
fn both_sources_share_the_canonical_shape() {
    let dir = fixture();
    let sources = reconciler().load(dir.path()).unwrap();

    let from_catalogue = &sources.catalogue[&id("123456789")];
    let from_tei = &sources.extracted[&id("123456789")];
    assert_eq!(from_catalogue.title.as_deref(), Some("Main Title A Subtitle"));
    assert_eq!(from_catalogue.authors, vec!["Jane Doe"]);
    assert_eq!(from_catalogue, from_tei);
}

#[test]
fn matching_titles_are_correct() {
    let dir = fixture();
    let report = reconciler().load_and_compare(dir.path()).unwrap();

    let main = report
        .results
        .iter()
        .find(|r| r.result.id == id("123456789"))
        .unwrap();
    assert_eq!(main.result.catalogue_title, "main title a subtitle");
    assert_eq!(main.result.score, 0.0);
    assert_eq!(main.category, Category::Correct);
}

#[test]
fn small_edits_have_changes() {
    let dir = fixture();
    let report = reconciler().load_and_compare(dir.path()).unwrap();
    let study = report
        .results
        .iter()
        .find(|r| r.result.id == id("222222222"))
        .unwrap();
    assert!(study.result.score > 0.13 && study.result.score < 0.65);
    assert_eq!(study.category, Category::HasChanges);
}

#[test]
fn catalogue_only_record_is_missing() {
    let dir = fixture();
    let report = reconciler().load_and_compare(dir.path()).unwrap();
    let foo = report
        .results
        .iter()
        .find(|r| r.result.id == id("111111111"))
        .unwrap();
    assert_eq!(foo.result.catalogue_title, "foo");
    assert_eq!(foo.result.extracted_title, "");
    assert_eq!(foo.result.score, 1.0);
    assert_eq!(foo.category, Category::Missing);
}

#[test]
fn empty_titles_on_both_sides_are_correct() {
    let dir = fixture();
    let report = reconciler().load_and_compare(dir.path()).unwrap();
    let untitled = report
        .results
        .iter()
        .find(|r| r.result.id == id("333333333"))
        .unwrap();
    assert_eq!(untitled.result.score, 0.0);
    assert_eq!(untitled.category, Category::Correct);
}

#[test]
fn unnamed_tei_file_never_joins() {
    let dir = fixture();
    let report = reconciler().load_and_compare(dir.path()).unwrap();
    let stray = report
        .results
        .iter()
        .find(|r| r.result.id.as_str() == "unnamed.xml")
        .unwrap();
    assert_eq!(stray.result.catalogue_title, "");
    assert_eq!(stray.category, Category::Missing);
}

#[test]
fn summary_lines_follow_sorted_runs() {
    let dir = fixture();
    let report = reconciler().load_and_compare(dir.path()).unwrap();
    assert_eq!(
        report.summary_lines(),
        vec!["correct : 2 of 5", "has changes : 1 of 5", "missing : 2 of 5"]
    );

    let mut text = Vec::new();
    report.write_text(&mut text).unwrap();
    assert_eq!(String::from_utf8(text).unwrap().lines().count(), 8);
}

#[test]
fn by_category_summary_matches_on_monotonic_bands() {
    let dir = fixture();
    let mut config = ReconConfig::default();
    config.report.summary = SummaryMode::ByCategory;
    let report = Reconciler::new(config)
        .unwrap()
        .load_and_compare(dir.path())
        .unwrap();
    assert_eq!(report.summary.len(), 3);
    assert_eq!(report.count(Category::Missing), 2);
}

#[test]
fn repeated_runs_are_identical() {
    let dir = fixture();
    let first = reconciler().load_and_compare(dir.path()).unwrap();
    let second = reconciler().load_and_compare(dir.path()).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn zero_capacity_cache_gives_same_output() {
    let dir = fixture();
    let mut config = ReconConfig::default();
    config.tei.cache_capacity = 0;
    let uncached = Reconciler::new(config)
        .unwrap()
        .load_and_compare(dir.path())
        .unwrap();
    let cached = reconciler().load_and_compare(dir.path()).unwrap();
    assert_eq!(uncached, cached);
}

#[test]
fn loose_rules_pick_up_more_lines() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("export.seq"),
        "444444444 24610 L $$aVariant title\n",
    )
    .unwrap();
    fs::create_dir(dir.path().join("tei")).unwrap();

    let strict = reconciler().load(dir.path()).unwrap();
    assert!(strict.catalogue.is_empty());

    let mut config = ReconConfig::default();
    config.catalogue.rule_set = RuleSetVariant::Loose;
    let loose = Reconciler::new(config).unwrap().load(dir.path()).unwrap();
    assert_eq!(loose.catalogue.len(), 1);
}

#[test]
fn first_catalogue_file_by_name_is_used() {
    let dir = fixture();
    fs::write(dir.path().join("zzz.seq"), "999999999 24500 L $$aOther\n").unwrap();
    let sources = reconciler().load(dir.path()).unwrap();
    assert_eq!(sources.catalogue_file, dir.path().join("export.seq"));
}

#[test]
fn hidden_catalogue_files_are_ignored() {
    let dir = fixture();
    fs::write(dir.path().join(".draft.seq"), "999999999 24500 L $$aDraft\n").unwrap();
    let sources = reconciler().load(dir.path()).unwrap();
    assert_eq!(sources.catalogue_file, dir.path().join("export.seq"));
    assert!(!sources.catalogue.contains_key(&id("999999999")));
}

#[test]
fn only_hidden_catalogue_counts_as_missing() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("tei")).unwrap();
    fs::write(dir.path().join(".draft.seq"), CATALOGUE).unwrap();
    let err = reconciler().load(dir.path()).unwrap_err();
    assert!(matches!(err, ReconError::CatalogueNotFound { .. }));
}

#[test]
fn missing_catalogue_is_fatal() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("tei")).unwrap();
    let err = reconciler().load(dir.path()).unwrap_err();
    assert!(matches!(err, ReconError::CatalogueNotFound { .. }));
}

#[test]
fn missing_tei_directory_is_fatal() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("export.seq"), CATALOGUE).unwrap();
    let err = reconciler().load(dir.path()).unwrap_err();
    assert!(matches!(err, ReconError::DirectoryNotFound(ref p) if p.ends_with("tei")));
}

#[test]
fn missing_input_directory_is_fatal() {
    let err = reconciler()
        .load(Path::new("/nonexistent/biblioscope/input"))
        .unwrap_err();
    assert!(matches!(err, ReconError::DirectoryNotFound(_)));
}
