//! PokéAPI client over plain HTTP GET.
//!
//! - `GET {base}/pokemon?limit=&offset=` for the listing
//! - `GET {base}/pokemon/{id}` for a single entry

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use crate::catalog::{CatalogClient, CatalogError, PageDto, PokemonDto};

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

pub struct PokeApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl PokeApiClient {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout ({e}), using defaults");
                reqwest::Client::new()
            });

        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(classify)?;

        debug!("Catalog response status: {} for {}", response.status(), url);

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.ok().filter(|b| !b.trim().is_empty());
            warn!("Catalog HTTP error: {} - {:?}", status, body);
            return Err(CatalogError::Http {
                status,
                message: body,
            });
        }

        let bytes = response.bytes().await.map_err(classify)?;
        serde_json::from_slice(&bytes).map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

/// Splits reqwest failures into transport problems and everything else.
/// Only connect, timeout and body-read failures count as network errors.
fn classify(err: reqwest::Error) -> CatalogError {
    if err.is_decode() {
        CatalogError::Parse(err.to_string())
    } else if err.is_connect() || err.is_timeout() || err.is_body() {
        CatalogError::Network(err.to_string())
    } else {
        CatalogError::Other(err.to_string())
    }
}

#[async_trait]
impl CatalogClient for PokeApiClient {
    fn name(&self) -> &str {
        "pokeapi"
    }

    async fn fetch_page(&self, limit: NonZeroU32, offset: usize) -> Result<PageDto, CatalogError> {
        info!("Fetching page: limit={}, offset={}", limit, offset);
        let url = format!("{}/pokemon", self.base_url);
        self.get_json(
            &url,
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    async fn fetch_detail(&self, id: u32) -> Result<PokemonDto, CatalogError> {
        info!("Fetching detail: id={}", id);
        let url = format!("{}/pokemon/{}", self.base_url, id);
        self.get_json(&url, &[]).await
    }
}
