//! # Repository
//!
//! Wraps a [`CatalogClient`] and the mapper behind a result-returning API.
//! Every failure leaves as a [`RepoError`]; nothing panics or escapes.

use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

use log::{debug, warn};

use super::client::{CatalogClient, CatalogError};
use super::mapper::{self, MapError};
use super::types::{Page, PokemonDetail};

pub const DEFAULT_PAGE_SIZE: NonZeroU32 = NonZeroU32::new(20).unwrap();

/// Closed failure taxonomy seen by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum RepoError {
    /// Connection or timeout failure. No detail is kept.
    Network,
    /// Non-2xx answer; status and body are preserved verbatim.
    Http { code: u16, message: Option<String> },
    /// Anything else, with the cause kept for diagnostics.
    Unknown(String),
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoError::Network => write!(f, "network failure"),
            RepoError::Http {
                code,
                message: Some(message),
            } => write!(f, "HTTP {code}: {message}"),
            RepoError::Http {
                code,
                message: None,
            } => write!(f, "HTTP {code}"),
            RepoError::Unknown(cause) => write!(f, "unknown failure: {cause}"),
        }
    }
}

impl std::error::Error for RepoError {}

impl From<CatalogError> for RepoError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Network(_) => RepoError::Network,
            CatalogError::Http { status, message } => RepoError::Http {
                code: status,
                message,
            },
            CatalogError::Parse(cause) | CatalogError::Other(cause) => RepoError::Unknown(cause),
        }
    }
}

impl From<MapError> for RepoError {
    fn from(err: MapError) -> Self {
        RepoError::Unknown(err.to_string())
    }
}

pub struct Repository {
    client: Arc<dyn CatalogClient>,
}

impl Repository {
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self { client }
    }

    /// Loads one page. Exactly one client call per invocation.
    /// The caller owns offset sequencing.
    pub async fn load_page(&self, limit: NonZeroU32, offset: usize) -> Result<Page, RepoError> {
        let dto = self.client.fetch_page(limit, offset).await.map_err(|e| {
            warn!("{} fetch_page(limit={}, offset={}) failed: {}", self.client.name(), limit, offset, e);
            RepoError::from(e)
        })?;
        let page = mapper::map_page(dto).map_err(|e| {
            warn!("Mapping page at offset {} failed: {}", offset, e);
            RepoError::from(e)
        })?;
        debug!(
            "Loaded page: offset={}, items={}, has_more={}",
            offset,
            page.items.len(),
            page.has_more
        );
        Ok(page)
    }

    pub async fn load_detail(&self, id: u32) -> Result<PokemonDetail, RepoError> {
        let dto = self.client.fetch_detail(id).await.map_err(|e| {
            warn!("{} fetch_detail({}) failed: {}", self.client.name(), id, e);
            RepoError::from(e)
        })?;
        Ok(mapper::map_detail(dto))
    }
}
