use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, HeaderValue};

use crate::error::{ClimboxError, ClimboxResult};
use crate::ingest::source::TextFetcher;

/// Blocking HTTP fetcher that always asks for a fresh copy.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);

    pub fn new() -> ClimboxResult<Self> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> ClimboxResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClimboxError::InvalidConfig(format!("http client error: {e}")))?;
        Ok(Self { client })
    }
}

impl TextFetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> ClimboxResult<String> {
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, HeaderValue::from_static("no-store"))
            .send()
            .map_err(|e| ClimboxError::Fetch {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClimboxError::FetchStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(|e| ClimboxError::Fetch {
            url: url.to_owned(),
            reason: format!("body decode error: {e}"),
        })
    }
}
