use std::fmt;
use std::num::NonZeroU32;

use async_trait::async_trait;

use super::types::{PageDto, PokemonDto};

/// Errors raised at the transport boundary.
/// The repository folds these into [`RepoError`](super::RepoError).
#[derive(Debug)]
pub enum CatalogError {
    /// Connection refused, DNS failure, timeout.
    Network(String),
    /// Server answered with a non-2xx status.
    Http { status: u16, message: Option<String> },
    /// Body arrived but could not be decoded.
    Parse(String),
    /// Request never became a clean exchange: bad URL, redirect loop.
    Other(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Network(msg) => write!(f, "network error: {msg}"),
            CatalogError::Http {
                status,
                message: Some(message),
            } => write!(f, "HTTP {status}: {message}"),
            CatalogError::Http {
                status,
                message: None,
            } => write!(f, "HTTP {status}"),
            CatalogError::Parse(msg) => write!(f, "parse error: {msg}"),
            CatalogError::Other(msg) => write!(f, "request error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// A source of raw catalog payloads. One call, one request: no retry, no cache.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Returns the name of the client, for logs.
    fn name(&self) -> &str;

    /// Fetches one page of the listing.
    async fn fetch_page(&self, limit: NonZeroU32, offset: usize) -> Result<PageDto, CatalogError>;

    /// Fetches the full record for a single entry.
    async fn fetch_detail(&self, id: u32) -> Result<PokemonDto, CatalogError>;
}
