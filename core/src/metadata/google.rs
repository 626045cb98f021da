//! Client for the Google Books volumes API.
//!
//! The store only ever needs two calls: a capped free-text (or `isbn:`)
//! search and a single-volume detail fetch. Both degrade to "no results" on
//! any network, HTTP, or parse failure; the UI treats an error and an empty
//! result identically, so failures are logged here and swallowed.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use super::Result;

static BASE_URL: &str = "https://www.googleapis.com/books/v1";

const TIMEOUT_SECS: u64 = 10;

/// One record returned by the volumes API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Volume {
    pub id: String,
    #[serde(default, rename = "volumeInfo")]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub page_count: Option<u32>,
    pub industry_identifiers: Option<Vec<IndustryIdentifier>>,
    pub image_links: Option<ImageLinks>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryIdentifier {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub identifier: Option<String>,
}

/// Cover thumbnails at the resolutions Google exposes, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
    pub small: Option<String>,
    pub medium: Option<String>,
    pub large: Option<String>,
    pub extra_large: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchEnvelope {
    // Absent on zero hits; never an error.
    #[serde(default)]
    items: Vec<Volume>,
}

/// Thin client over the volumes endpoints with a fixed request timeout.
#[derive(Debug, Clone)]
pub struct GoogleBooksClient {
    client: Client,
    base_url: String,
}

impl GoogleBooksClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    /// Point the client at a different host; used by tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(TIMEOUT_SECS)).build()?;
        Ok(Self { client, base_url: base_url.into() })
    }

    /// Search the catalog. `isbn:<digits>` performs an exact lookup; a blank
    /// query short-circuits to no results without touching the network.
    pub async fn search(&self, query: &str, max_results: u8) -> Vec<Volume> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let url = format!(
            "{}/volumes?q={}&maxResults={}&printType=books",
            self.base_url,
            urlencoding::encode(query),
            max_results,
        );

        match self.get_json::<SearchEnvelope>(&url).await {
            Ok(envelope) => envelope.items,
            Err(err) => {
                warn!(error = %err, "book search failed");
                Vec::new()
            }
        }
    }

    /// Fetch one volume by its catalog identifier.
    pub async fn volume(&self, id: &str) -> Option<Volume> {
        let url = format!("{}/volumes/{}", self.base_url, urlencoding::encode(id));
        match self.get_json::<Volume>(&url).await {
            Ok(volume) => Some(volume),
            Err(err) => {
                warn!(volume = id, error = %err, "volume detail fetch failed");
                None
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}

/// Build the exact-lookup query for a scanned or typed ISBN, keeping only the
/// characters that can appear in one.
pub fn isbn_query(raw: &str) -> String {
    let digits: String =
        raw.chars().filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x').collect();
    format!("isbn:{digits}")
}
