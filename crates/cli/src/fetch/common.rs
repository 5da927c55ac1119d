//! Shared HTTP client for the wiki page and the catalogue service.
//!
//! Both upstreams are plain GET endpoints returning text. `FetchClient`
//! owns the retry loop and maps failures onto the fetch exit codes:
//!
//! | Condition                         | Behaviour              | Exit |
//! |-----------------------------------|------------------------|------|
//! | transport error (DNS, timeout)    | retry, then fail       | 50   |
//! | 429 / 5xx                         | retry, then fail       | 51   |
//! | other 4xx                         | fail immediately       | 51   |
//! | 2xx with blank body               | fail immediately       | 52   |
//!
//! Bodies are decoded as UTF-8 whatever the `charset` header claims;
//! invalid sequences are replaced and a leading BOM is dropped.

use std::thread;
use std::time::Duration;

use lawlist_config::Settings;

use crate::exit_codes;
use crate::CliError;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

pub struct FetchClient {
    http: reqwest::blocking::Client,
    source_name: String,
    max_retries: u32,
    backoff: Duration,
}

impl FetchClient {
    pub fn new(source_name: &str, settings: &Settings) -> Result<Self, CliError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| CliError::general(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            source_name: source_name.to_string(),
            max_retries: settings.max_retries,
            backoff: INITIAL_BACKOFF,
        })
    }

    /// Override the first retry delay (doubled on each further retry).
    #[cfg(test)]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// GET `url` and return the decoded body.
    pub fn get_text(&self, url: &str) -> Result<String, CliError> {
        let mut backoff = self.backoff;

        for attempt in 0..=self.max_retries {
            log::debug!("GET {url} ({}, attempt {})", self.source_name, attempt + 1);

            let resp = match self.http.get(url).send() {
                Ok(resp) => resp,
                Err(e) => {
                    if attempt == self.max_retries {
                        return Err(CliError {
                            code: exit_codes::EXIT_FETCH_NETWORK,
                            message: format!(
                                "{} unreachable after {} attempts: {}",
                                self.source_name,
                                attempt + 1,
                                e,
                            ),
                            hint: Some(format!("check network access to {url}")),
                        });
                    }
                    log::warn!(
                        "{}: retry {}/{} in {:?} ({})",
                        self.source_name,
                        attempt + 1,
                        self.max_retries,
                        backoff,
                        e,
                    );
                    thread::sleep(backoff);
                    backoff *= 2;
                    continue;
                }
            };

            let status = resp.status().as_u16();

            // Other 4xx (not 429): fail immediately
            if (400..500).contains(&status) && status != 429 {
                return Err(CliError {
                    code: exit_codes::EXIT_FETCH_UPSTREAM,
                    message: format!("{} error (HTTP {}) for {}", self.source_name, status, url),
                    hint: None,
                });
            }

            // Retryable: 429, 5xx
            if status == 429 || status >= 500 {
                if attempt == self.max_retries {
                    return Err(CliError {
                        code: exit_codes::EXIT_FETCH_UPSTREAM,
                        message: format!(
                            "{} error (HTTP {}) after {} attempts",
                            self.source_name,
                            status,
                            attempt + 1,
                        ),
                        hint: None,
                    });
                }

                // Respect Retry-After header for 429
                let wait = if status == 429 {
                    resp.headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .map(Duration::from_secs)
                        .unwrap_or(backoff)
                } else {
                    backoff
                };

                log::warn!(
                    "{}: retry {}/{} in {:?} (HTTP {})",
                    self.source_name,
                    attempt + 1,
                    self.max_retries,
                    wait,
                    status,
                );
                thread::sleep(wait);
                backoff *= 2;
                continue;
            }

            let bytes = resp.bytes().map_err(|e| CliError {
                code: exit_codes::EXIT_FETCH_NETWORK,
                message: format!("failed to read {} response body: {}", self.source_name, e),
                hint: None,
            })?;
            let text = decode_body(&bytes);

            if text.trim().is_empty() {
                return Err(CliError {
                    code: exit_codes::EXIT_FETCH_EMPTY,
                    message: format!("{} returned an empty body ({})", self.source_name, url),
                    hint: None,
                });
            }

            log::info!("{}: fetched {} bytes", self.source_name, bytes.len());
            return Ok(text);
        }

        Err(CliError::general(format!("{}: no fetch attempt was made", self.source_name)))
    }
}

fn decode_body(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.trim_start_matches('\u{feff}').to_string()
}
