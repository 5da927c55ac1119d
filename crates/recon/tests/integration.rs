use std::path::PathBuf;

use lawlist_recon::catalogue::parse_catalogue;
use lawlist_recon::config::{Direction, ReconConfig};
use lawlist_recon::engine::run;
use lawlist_recon::extract::TitleExtractor;
use lawlist_recon::model::{AnnotatedTitle, ReconInput, ReconReport, SideInput};
use lawlist_recon::report::report_tables;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn load_and_run(config: &ReconConfig, catalogue_file: &str) -> ReconReport {
    let extraction = TitleExtractor::new(config.extract.filter)
        .unwrap()
        .extract(&fixture("wiki.html"));
    let wiki: Vec<AnnotatedTitle> = extraction.titles.into_iter().map(Into::into).collect();

    let catalogue = parse_catalogue(&fixture(catalogue_file), config.b.schema);

    let input = ReconInput {
        a: SideInput::new(&config.a.label, wiki).with_issues(extraction.issues),
        b: SideInput::new(&config.b.label, catalogue.titles).with_issues(catalogue.issues),
    };
    run(config, &input).unwrap()
}

fn texts(titles: &[AnnotatedTitle]) -> Vec<&str> {
    titles.iter().map(|t| t.raw.text.as_str()).collect()
}

// -------------------------------------------------------------------------
// Statute names (both directions, indexed catalogue)
// -------------------------------------------------------------------------

#[test]
fn names_from_toml() {
    let config = ReconConfig::from_toml(&fixture("names.recon.toml")).unwrap();
    let report = load_and_run(&config, "catalogue_names.txt");

    assert_eq!(report.meta.config_name, "statute names");
    assert_eq!(report.meta.direction, Direction::Both);
    assert_eq!(report.summary.a.total, 7);
    assert_eq!(report.summary.b.total, 5);
    assert_eq!(report.summary.matched, 3);
    assert_eq!(report.summary.a.missing, 4);
    assert_eq!(report.summary.b.missing, 2);
    assert_eq!(report.summary.b.parse_issues, 1);
    assert_eq!(report.summary.divergences, 1);
}

#[test]
fn names_pairs_keep_catalogue_index() {
    let report = load_and_run(&ReconConfig::names_preset(), "catalogue_names.txt");

    let pairs: Vec<(&str, &str)> = report
        .result
        .matched
        .iter()
        .map(|p| (p.label().map(|l| l.index.as_str()).unwrap_or(""), p.report_name()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("1", "חוק החוזים (חלק כללי), התשל\"ג-1973"),
            ("17", "חוק הדוגמה (נוסח חדש) תשפ\"ג-2023"),
            ("3", "פקודת מס הכנסה [נוסח חדש]"),
        ]
    );
}

#[test]
fn names_missing_on_each_side() {
    let report = load_and_run(&ReconConfig::names_preset(), "catalogue_names.txt");

    assert_eq!(
        texts(&report.result.missing_from_a),
        vec![
            "חוק זר",
            "חוק המקרקעין, התשכ\"ט-1969",
            "תקנותהתעבורה, התשכ\"א-1961",
            "חוק לתיקון פקודת מס הכנסה (מס' 12), התשל\"ה-1975",
        ]
    );
    let missing_b: Vec<&str> = report
        .result
        .missing_from_b
        .iter()
        .map(|t| t.display())
        .collect();
    assert_eq!(missing_b, vec!["חוק זרה", "חוק הגנת הצרכן"]);
}

#[test]
fn names_skipped_record_is_reported() {
    let report = load_and_run(&ReconConfig::names_preset(), "catalogue_names.txt");
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].issue.raw, "bad*^*x*^*y");
    assert_eq!(report.issues[0].issue.position, Some(5));
}

#[test]
fn names_tables() {
    let report = load_and_run(&ReconConfig::names_preset(), "catalogue_names.txt");
    let tables = report_tables(&report);
    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["matched", "missing_from_a", "missing_from_b", "audit", "issues"]);

    let matched = &tables[0];
    assert_eq!(matched.columns, vec!["RuleIndex", "RuleName"]);
    assert_eq!(matched.rows[1][0], "17");

    let missing_b = &tables[2];
    assert_eq!(missing_b.columns, vec!["RuleIndex", "RuleName"]);
    assert_eq!(missing_b.rows[0], vec!["4".to_string(), "חוק זרה".to_string()]);
}

// -------------------------------------------------------------------------
// Regulations (one direction, categorized catalogue)
// -------------------------------------------------------------------------

#[test]
fn rules_one_direction() {
    let report = load_and_run(&ReconConfig::rules_preset(), "catalogue_rules.txt");

    assert_eq!(report.meta.direction, Direction::AInB);
    assert_eq!(report.summary.matched, 1);
    assert_eq!(report.summary.a.missing, 6);
    // B is never searched in this direction
    assert!(report.result.missing_from_b.is_empty());

    let pair = &report.result.matched[0];
    assert_eq!(pair.b.category(), Some("תקנות"));
    assert_eq!(pair.report_name(), "תקנותהתעבורה, התשכ\"א-1961");

    let tables = report_tables(&report);
    assert_eq!(tables[0].columns, vec!["RuleIndex", "RuleName", "RuleCategory"]);
}

#[test]
fn exact_mode_is_stricter() {
    let mut config = ReconConfig::names_preset();
    config.matcher = lawlist_recon::MatchMode::Exact;
    let report = load_and_run(&config, "catalogue_names.txt");
    // same three keys are identical after normalization
    assert_eq!(report.summary.matched, 3);

    let mut rules = ReconConfig::rules_preset();
    rules.matcher = lawlist_recon::MatchMode::Exact;
    let report = load_and_run(&rules, "catalogue_rules.txt");
    // "תקנותהתעבורה" vs "תקנות התעבורה" differ by a space
    assert_eq!(report.summary.matched, 0);
}

#[test]
fn report_serializes_to_json() {
    let report = load_and_run(&ReconConfig::names_preset(), "catalogue_names.txt");
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["meta"]["direction"], "both");
    assert_eq!(json["meta"]["match_mode"]["mode"], "edit_distance");
    assert_eq!(json["summary"]["matched"], 3);
    assert_eq!(json["result"]["matched"][1]["b"]["label"]["index"], "17");
}
