//! `lawlist compare` / `lawlist validate`: the full reconciliation pipeline.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};

use lawlist_config::Settings;
use lawlist_io::ExportFormat;
use lawlist_recon::config::DEFAULT_OVERLAP_THRESHOLD;
use lawlist_recon::{
    parse_catalogue, report_tables, Direction, MatchMode, RecordSchema, ReconConfig, ReconInput,
    ReconReport, SideInput, TitleExtractor,
};

use crate::fetch;
use crate::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Statute names, both directions, catalogue index kept
    Names,
    /// Regulations, wiki titles missing from the catalogue
    Rules,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    AInB,
    BInA,
    Both,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::AInB => Direction::AInB,
            DirectionArg::BInA => Direction::BInA,
            DirectionArg::Both => Direction::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    EditDistance,
    Overlap,
    Exact,
}

#[derive(Args)]
pub struct CompareArgs {
    /// Built-in run (default: names)
    #[arg(value_enum, conflicts_with = "config")]
    preset: Option<Preset>,

    /// Run config (.recon.toml) instead of a preset
    #[arg(long)]
    config: Option<PathBuf>,

    /// Wiki index page URL (default from settings)
    #[arg(long, conflicts_with = "wiki_file")]
    wiki_url: Option<String>,

    /// Read the wiki page from a local file
    #[arg(long)]
    wiki_file: Option<PathBuf>,

    /// Catalogue service URL (default from settings, by schema)
    #[arg(long, conflicts_with = "catalogue_file")]
    catalogue_url: Option<String>,

    /// Read the catalogue payload from a local file
    #[arg(long)]
    catalogue_file: Option<PathBuf>,

    /// Override lookup direction
    #[arg(long, value_enum)]
    direction: Option<DirectionArg>,

    /// Override equivalence mode
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Overlap ratio for --mode overlap (0 < t <= 1)
    #[arg(long)]
    threshold: Option<f64>,

    /// Skip the variant normalizer audit
    #[arg(long)]
    no_audit: bool,

    /// Report format
    #[arg(long, default_value = "xlsx")]
    format: ExportFormat,

    /// Output directory (default from settings)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print the full report as JSON to stdout
    #[arg(long)]
    json: bool,
}

// ============================================================================
// compare
// ============================================================================

pub fn cmd_compare(args: CompareArgs, settings: &Settings) -> Result<(), CliError> {
    let config = resolve_config(&args)?;
    log::info!("compare '{}' ({}, {})", config.name, config.direction, config.matcher);

    // Both payloads are retrieved before anything is compared
    let markup = load_wiki(&args, settings)?;
    let catalogue_raw = load_catalogue(&args, &config, settings)?;

    let LoadedInput { input, degraded } = build_input(&config, &markup, &catalogue_raw)?;
    let report = lawlist_recon::run(&config, &input).map_err(|e| CliError::config(e.to_string()))?;

    let out_dir = args.out.clone().unwrap_or_else(|| settings.output_dir.clone());
    let written = write_report(&report, args.format, &out_dir, &slug(&config.name))?;

    if args.json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("cannot serialize report: {e}")))?;
        println!("{out}");
    }

    eprintln!("{}", report.summary);
    for path in &written {
        eprintln!("wrote {}", path.display());
    }

    // The report is out; an empty side still gets its own exit status
    if !degraded.is_empty() {
        return Err(CliError::parse(format!("degraded input: {}", degraded.join("; ")))
            .with_hint("the page layout or catalogue format may have changed; see the issues table"));
    }
    Ok(())
}

fn resolve_config(args: &CompareArgs) -> Result<ReconConfig, CliError> {
    let mut config = match (&args.config, args.preset) {
        (Some(path), _) => load_config(path)?,
        (None, Some(Preset::Rules)) => ReconConfig::rules_preset(),
        (None, Some(Preset::Names)) | (None, None) => ReconConfig::names_preset(),
    };

    if let Some(direction) = args.direction {
        config.direction = direction.into();
    }

    match (args.mode, args.threshold) {
        (Some(ModeArg::EditDistance), None) => config.matcher = MatchMode::EditDistance,
        (Some(ModeArg::Exact), None) => config.matcher = MatchMode::Exact,
        (Some(ModeArg::Overlap), threshold) => {
            config.matcher = MatchMode::Overlap {
                threshold: threshold.unwrap_or(DEFAULT_OVERLAP_THRESHOLD),
            };
        }
        (None, Some(threshold)) if matches!(config.matcher, MatchMode::Overlap { .. }) => {
            config.matcher = MatchMode::Overlap { threshold };
        }
        (_, Some(_)) => {
            return Err(CliError::usage("--threshold only applies to overlap matching")
                .with_hint("add --mode overlap"));
        }
        (None, None) => {}
    }

    if args.no_audit {
        config.normalize.audit = false;
    }

    config.validate().map_err(|e| CliError::config(e.to_string()))?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::usage(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text).map_err(|e| CliError::config(format!("{}: {e}", path.display())))
}

fn load_wiki(args: &CompareArgs, settings: &Settings) -> Result<String, CliError> {
    match &args.wiki_file {
        Some(path) => read_input(path),
        None => {
            let url = args.wiki_url.as_deref().unwrap_or(&settings.wiki_url);
            fetch::fetch_wiki(url, settings)
        }
    }
}

fn load_catalogue(args: &CompareArgs, config: &ReconConfig, settings: &Settings) -> Result<String, CliError> {
    match &args.catalogue_file {
        Some(path) => read_input(path),
        None => {
            let url = match &args.catalogue_url {
                Some(url) => url.as_str(),
                None if config.b.schema == RecordSchema::Categorized => settings.catalogue_rules_url.as_str(),
                None => settings.catalogue_names_url.as_str(),
            };
            fetch::fetch_catalogue(url, settings)
        }
    }
}

/// Read a local payload, decoding it as UTF-8 like a fetched body.
pub fn read_input(path: &Path) -> Result<String, CliError> {
    let bytes = std::fs::read(path)
        .map_err(|e| CliError::usage(format!("cannot read {}: {e}", path.display())))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Run input plus notes on sides that came back empty. Empty sides still
/// go through the run so the report and issues table are written.
struct LoadedInput {
    input: ReconInput,
    degraded: Vec<String>,
}

fn build_input(config: &ReconConfig, markup: &str, catalogue_raw: &str) -> Result<LoadedInput, CliError> {
    let extractor = TitleExtractor::new(config.extract.filter).map_err(|e| CliError::general(e.to_string()))?;
    let extraction = extractor.extract(markup);
    let catalogue = parse_catalogue(catalogue_raw, config.b.schema);

    let mut degraded = Vec::new();
    if extraction.titles.is_empty() {
        degraded.push(format!(
            "no titles extracted from the wiki page ({} links seen)",
            extraction.anchors_seen
        ));
    }
    if catalogue.titles.is_empty() {
        degraded.push(format!(
            "no usable records in the catalogue payload ({} skipped)",
            catalogue.issues.len()
        ));
    }
    for note in &degraded {
        log::warn!("{note}");
    }

    Ok(LoadedInput {
        input: ReconInput {
            a: SideInput::new(&config.a.label, extraction.titles.into_iter().map(Into::into).collect())
                .with_issues(extraction.issues),
            b: SideInput::new(&config.b.label, catalogue.titles).with_issues(catalogue.issues),
        },
        degraded,
    })
}

fn write_report(
    report: &ReconReport,
    format: ExportFormat,
    out_dir: &Path,
    slug: &str,
) -> Result<Vec<PathBuf>, CliError> {
    let tables = report_tables(report);
    std::fs::create_dir_all(out_dir)
        .map_err(|e| CliError::export(format!("cannot create {}: {e}", out_dir.display())))?;

    match format {
        ExportFormat::Xlsx => {
            let path = out_dir.join(format!("{slug}.xlsx"));
            lawlist_io::xlsx::export(&tables, &path).map_err(CliError::export)?;
            Ok(vec![path])
        }
        ExportFormat::Csv => lawlist_io::csv::export_dir(&tables, out_dir, slug).map_err(CliError::export),
    }
}

/// File-name stem for a run: ASCII alphanumerics kept, everything else `_`.
fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "report".to_string()
    } else {
        slug.to_string()
    }
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    eprintln!(
        "valid: {} ({}, {} vs {}, {})",
        config.name, config.direction, config.a.label, config.b.label, config.matcher
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: CompareArgs,
    }

    fn args(argv: &[&str]) -> CompareArgs {
        let mut full = vec!["compare"];
        full.extend_from_slice(argv);
        Harness::parse_from(full).args
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("statute names"), "statute_names");
        assert_eq!(slug("regulations"), "regulations");
        assert_eq!(slug("  --Rules 2024--"), "rules_2024");
        assert_eq!(slug("חוקים"), "report");
    }

    #[test]
    fn test_preset_defaults_to_names() {
        let config = resolve_config(&args(&[])).unwrap();
        assert_eq!(config.name, "statute names");
        assert_eq!(config.direction, Direction::Both);
    }

    #[test]
    fn test_rules_preset() {
        let config = resolve_config(&args(&["rules"])).unwrap();
        assert_eq!(config.direction, Direction::AInB);
        assert_eq!(config.b.schema, RecordSchema::Categorized);
    }

    #[test]
    fn test_overrides_apply() {
        let config = resolve_config(&args(&[
            "names",
            "--direction",
            "b-in-a",
            "--mode",
            "overlap",
            "--threshold",
            "0.9",
            "--no-audit",
        ]))
        .unwrap();
        assert_eq!(config.direction, Direction::BInA);
        assert_eq!(config.matcher, MatchMode::Overlap { threshold: 0.9 });
        assert!(!config.normalize.audit);
    }

    #[test]
    fn test_threshold_without_overlap_is_usage_error() {
        let err = resolve_config(&args(&["--threshold", "0.5"])).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);
        assert!(err.hint.is_some());
    }

    #[test]
    fn test_bad_threshold_is_config_error() {
        let err = resolve_config(&args(&["--mode", "overlap", "--threshold", "1.5"])).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_INVALID_CONFIG);
    }

    #[test]
    fn test_malformed_catalogue_still_reaches_the_run() {
        let config = ReconConfig::names_preset();
        let markup = r#"<a href="/a">חוק החוזים</a>"#;
        let loaded = build_input(&config, markup, "1*^*2*^*3*&* *&*").unwrap();
        assert_eq!(loaded.degraded.len(), 1);
        assert!(loaded.degraded[0].contains("1 skipped"), "{:?}", loaded.degraded);

        let report = lawlist_recon::run(&config, &loaded.input).unwrap();
        assert_eq!(report.summary.a.total, 1);
        assert_eq!(report.summary.a.missing, 1);
        assert_eq!(report.summary.b.parse_issues, 1);
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn test_page_without_anchors_still_reaches_the_run() {
        let config = ReconConfig::names_preset();
        let loaded = build_input(&config, "<p>no anchors</p>", "1*^*חוק החוזים*&*").unwrap();
        assert_eq!(loaded.degraded.len(), 1);
        assert!(loaded.degraded[0].contains("0 links"), "{:?}", loaded.degraded);

        let report = lawlist_recon::run(&config, &loaded.input).unwrap();
        assert_eq!(report.summary.b.missing, 1);
        // the degraded page is carried into the issues table
        assert_eq!(report.summary.a.parse_issues, 1);
        let tables = report_tables(&report);
        assert!(tables.iter().any(|t| t.name == "issues"));
    }

    #[test]
    fn test_clean_input_is_not_degraded() {
        let config = ReconConfig::names_preset();
        let loaded = build_input(&config, r#"<a href="/a">חוק החוזים</a>"#, "1*^*חוק החוזים*&*").unwrap();
        assert!(loaded.degraded.is_empty());
        let debug = format!("{:?}", loaded.input);
        assert!(debug.contains("wiki") && debug.contains("catalogue"), "{debug}");
    }
}
