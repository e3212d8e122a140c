//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::catalog::{
    CatalogClient, CatalogError, PageDto, PokemonDto, Repository, ResourceDto,
};
use crate::core::controller::ListController;
use crate::core::snapshot::{MemorySnapshotStore, SnapshotStore};

/// A catalog that replays queued responses and records every call.
///
/// With a gate installed, each fetch blocks until the test releases it,
/// which is how in-flight behaviour is exercised.
pub struct ScriptedCatalog {
    pages: Mutex<VecDeque<Result<PageDto, CatalogError>>>,
    details: Mutex<VecDeque<Result<PokemonDto, CatalogError>>>,
    calls: Mutex<Vec<(u32, usize)>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(VecDeque::new()),
            details: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Every fetch waits for one permit from the returned semaphore.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let catalog = Self {
            gate: Some(gate.clone()),
            ..Self::new()
        };
        (catalog, gate)
    }

    pub fn push_page(&self, page: PageDto) {
        self.pages.lock().unwrap().push_back(Ok(page));
    }

    pub fn push_error(&self, err: CatalogError) {
        self.pages.lock().unwrap().push_back(Err(err));
    }

    pub fn push_detail(&self, detail: Result<PokemonDto, CatalogError>) {
        self.details.lock().unwrap().push_back(detail);
    }

    /// `(limit, offset)` of every page fetch so far.
    pub fn calls(&self) -> Vec<(u32, usize)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CatalogClient for ScriptedCatalog {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_page(&self, limit: NonZeroU32, offset: usize) -> Result<PageDto, CatalogError> {
        self.calls.lock().unwrap().push((limit.get(), offset));
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CatalogError::Network("script exhausted".to_string())))
    }

    async fn fetch_detail(&self, _id: u32) -> Result<PokemonDto, CatalogError> {
        self.details
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CatalogError::Network("script exhausted".to_string())))
    }
}

/// Builds a listing page from `(id, raw_name)` pairs.
pub fn page_dto(entries: &[(u32, &str)], has_more: bool) -> PageDto {
    PageDto {
        count: 1302,
        next: has_more.then(|| "https://pokeapi.co/api/v2/pokemon?offset=20&limit=20".to_string()),
        previous: None,
        results: entries
            .iter()
            .map(|(id, name)| ResourceDto {
                name: name.to_string(),
                url: format!("https://pokeapi.co/api/v2/pokemon/{id}/"),
            })
            .collect(),
    }
}

/// A controller over `catalog` backed by a fresh in-memory store.
pub fn test_controller(catalog: Arc<ScriptedCatalog>) -> (ListController, Arc<MemorySnapshotStore>) {
    let store = Arc::new(MemorySnapshotStore::new());
    let controller = controller_with_store(catalog, store.clone());
    (controller, store)
}

/// A controller over `catalog` that restores from (and persists to) `store`.
pub fn controller_with_store(
    catalog: Arc<ScriptedCatalog>,
    store: Arc<dyn SnapshotStore>,
) -> ListController {
    ListController::new(
        Arc::new(Repository::new(catalog)),
        store,
        "pokemon-list",
        crate::catalog::DEFAULT_PAGE_SIZE,
    )
}
