//! Remote entries API.
//!
//! The reconciler only sees the [`EntrySource`] trait, so tests can drive it
//! with canned pages. [`HttpEntrySource`] is the real implementation, talking
//! to a dailymile-style API:
//!
//! - `GET {base}/people/{user}/entries.json?page={n}`, newest first, an empty
//!   page marks the end of history
//! - `GET {base}/people/{user}/entries.json?since={unix_seconds}`

use crate::entries::EntryCollection;
use crate::errors::{AppResult, FetchError};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

/// Something that can produce a user's entries, page by page or by age.
pub trait EntrySource {
    /// Fetches one page of history. Pages start at 1; an empty result means
    /// there are no more pages.
    fn fetch_page(&self, user: &str, page: u32) -> AppResult<EntryCollection>;

    /// Fetches the entries created after `since` (unix seconds).
    fn fetch_since(&self, user: &str, since: i64) -> AppResult<EntryCollection>;
}

/// Blocking HTTP client for the entries API.
pub struct HttpEntrySource {
    base_url: String,
    client: Client,
}

impl HttpEntrySource {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the API (e.g., "https://api.dailymile.com")
    /// * `timeout` - Upper bound for each request
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Request` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("milelog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| FetchError::Request {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self { base_url, client })
    }

    fn entries_url(&self, user: &str) -> String {
        format!("{}/people/{}/entries.json", self.base_url, user)
    }

    fn get_entries(&self, user: &str, query: &[(&str, String)]) -> AppResult<EntryCollection> {
        let url = self.entries_url(user);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(FetchError::Status { url, status, body }.into());
        }

        let entries: EntryCollection =
            response
                .json()
                .map_err(|e| FetchError::InvalidResponse {
                    url: url.clone(),
                    message: e.to_string(),
                })?;

        debug!("Received {} entries from {}", entries.len(), url);
        Ok(entries)
    }
}

impl EntrySource for HttpEntrySource {
    fn fetch_page(&self, user: &str, page: u32) -> AppResult<EntryCollection> {
        self.get_entries(user, &[("page", page.to_string())])
    }

    fn fetch_since(&self, user: &str, since: i64) -> AppResult<EntryCollection> {
        self.get_entries(user, &[("since", since.to_string())])
    }
}
