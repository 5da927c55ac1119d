//! Retrieval of the two source payloads.

mod common;

use common::FetchClient;

use lawlist_config::Settings;

use crate::CliError;

/// Fetch the wiki index page markup.
pub fn fetch_wiki(url: &str, settings: &Settings) -> Result<String, CliError> {
    FetchClient::new("wiki", settings)?.get_text(url)
}

/// Fetch the catalogue's raw record payload.
pub fn fetch_catalogue(url: &str, settings: &Settings) -> Result<String, CliError> {
    FetchClient::new("catalogue", settings)?.get_text(url)
}
