//! services/api/src/adapters/fetch.rs
//!
//! This module contains the outbound HTTP adapter used by the extraction
//! pipeline. It implements the `ContentFetchService` port from the `core`
//! crate: page fetches under a fixed client identity, plus the best-effort
//! oEmbed title lookup for video URLs.

use async_trait::async_trait;
use corepick_core::domain::MediaKind;
use corepick_core::ports::{ContentFetchService, PortError, PortResult};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Fixed desktop-browser identity presented to generic pages.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fixed crawler identity presented to video watch pages, which serve full
/// meta tags to search-engine crawlers.
const CRAWLER_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

/// Endpoint for the video title lookup.
const OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An HTTP adapter that implements the `ContentFetchService` port using `reqwest`.
#[derive(Clone)]
pub struct HttpFetchAdapter {
    client: Client,
}

impl HttpFetchAdapter {
    /// Creates a new `HttpFetchAdapter` with its own connection pool.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    fn user_agent_for(kind: MediaKind) -> &'static str {
        match kind {
            MediaKind::Generic => BROWSER_USER_AGENT,
            MediaKind::Video => CRAWLER_USER_AGENT,
        }
    }
}

impl Default for HttpFetchAdapter {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

/// The slice of the oEmbed payload the pipeline needs.
#[derive(Deserialize)]
struct OembedRecord {
    title: String,
}

//=========================================================================================
// `ContentFetchService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentFetchService for HttpFetchAdapter {
    /// Fetches the raw markup of a page. The response body is returned
    /// regardless of status code; an unreadable body is a fetch error.
    async fn fetch_page(&self, url: &str, kind: MediaKind) -> PortResult<String> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, Self::user_agent_for(kind))
            .send()
            .await
            .map_err(|e| PortError::Fetch(e.to_string()))?;

        response.text().await.map_err(|e| PortError::Fetch(e.to_string()))
    }

    /// Looks up a video's title via the host's oEmbed endpoint. Any failure,
    /// including a non-success status, is a fetch error; the caller decides
    /// how to degrade.
    async fn fetch_video_title(&self, url: &str) -> PortResult<String> {
        let response = self
            .client
            .get(OEMBED_ENDPOINT)
            .query(&[("url", url), ("format", "json")])
            .send()
            .await
            .map_err(|e| PortError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PortError::Fetch(format!(
                "oEmbed lookup returned {} for {}",
                response.status(),
                url
            )));
        }

        let record = response
            .json::<OembedRecord>()
            .await
            .map_err(|e| PortError::Fetch(e.to_string()))?;
        Ok(record.title)
    }
}
