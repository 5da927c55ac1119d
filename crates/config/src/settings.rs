// Application settings
// Loaded from ~/.config/lawlist/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_WIKI_URL: &str = "https://he.wikisource.org/wiki/%D7%A1%D7%A4%D7%A8_%D7%94%D7%97%D7%95%D7%A7%D7%99%D7%9D_%D7%94%D7%A4%D7%AA%D7%95%D7%97";
pub const DEFAULT_CATALOGUE_NAMES_URL: &str =
    "https://www.lawdata.co.il/lawdata_face_lift_test/getallhoknamesforcompare.asp";
pub const DEFAULT_CATALOGUE_RULES_URL: &str =
    "https://www.lawdata.co.il/lawdata_face_lift_test/getallrulesnamesforcompare.asp";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Sources
    #[serde(rename = "sources.wiki_url")]
    pub wiki_url: String,

    #[serde(rename = "sources.catalogue_names_url")]
    pub catalogue_names_url: String,

    #[serde(rename = "sources.catalogue_rules_url")]
    pub catalogue_rules_url: String,

    // HTTP
    #[serde(rename = "http.timeout_secs")]
    pub timeout_secs: u64,

    #[serde(rename = "http.max_retries")]
    pub max_retries: u32,

    #[serde(rename = "http.user_agent")]
    pub user_agent: String,

    // Output
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wiki_url: DEFAULT_WIKI_URL.to_string(),
            catalogue_names_url: DEFAULT_CATALOGUE_NAMES_URL.to_string(),
            catalogue_rules_url: DEFAULT_CATALOGUE_RULES_URL.to_string(),
            timeout_secs: 30,
            max_retries: 3,
            user_agent: concat!("lawlist/", env!("CARGO_PKG_VERSION")).to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lawlist");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file yields defaults silently;
    /// an unreadable or malformed one yields defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!("error parsing {}: {e}; using default settings", path.display());
                Self::default()
            }),
            Err(e) => {
                log::warn!("error reading {}: {e}; using default settings", path.display());
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }
}
