//! `lawlist extract`: list the titles found on the wiki index page.

use std::path::PathBuf;

use clap::Args;

use lawlist_config::Settings;
use lawlist_recon::{FilterMode, OutputTable, TitleExtractor};

use crate::fetch;
use crate::recon::read_input;
use crate::CliError;

#[derive(Args)]
pub struct ExtractArgs {
    /// Wiki index page URL (default from settings)
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,

    /// Read the page from a local file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Keep every link, not only statute-like titles
    #[arg(long)]
    all: bool,

    /// Write the titles to a CSV file with a single `Title` column
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of titles to preview on stdout
    #[arg(long)]
    limit: Option<usize>,
}

pub fn cmd_extract(args: ExtractArgs, settings: &Settings) -> Result<(), CliError> {
    let markup = match &args.file {
        Some(path) => read_input(path)?,
        None => fetch::fetch_wiki(args.url.as_deref().unwrap_or(&settings.wiki_url), settings)?,
    };

    let filter = if args.all { FilterMode::All } else { FilterMode::LawLike };
    let extraction = TitleExtractor::new(filter)
        .map_err(|e| CliError::general(e.to_string()))?
        .extract(&markup);

    let limit = args.limit.unwrap_or(usize::MAX);
    for (n, title) in extraction.titles.iter().take(limit).enumerate() {
        println!("{:>5}  {}", n + 1, title.text);
    }

    eprintln!(
        "{} titles from {} links ({} filter)",
        extraction.titles.len(),
        extraction.anchors_seen,
        if args.all { "all" } else { "law-like" },
    );

    if let Some(path) = &args.output {
        let table = OutputTable {
            name: "titles".into(),
            columns: vec!["Title".into()],
            rows: extraction.titles.iter().map(|t| vec![t.text.clone()]).collect(),
        };
        let file = std::fs::File::create(path)
            .map_err(|e| CliError::export(format!("cannot create {}: {e}", path.display())))?;
        lawlist_io::csv::write_table(&table, file).map_err(CliError::export)?;
        eprintln!("wrote {}", path.display());
    }

    if extraction.is_degraded() {
        return Err(CliError::parse("no links found in the page markup")
            .with_hint("check that the URL points at the statute index page"));
    }
    Ok(())
}
