//! # List Controller
//!
//! Owns infinite-scroll pagination for one list screen.
//!
//! ```text
//! ListController
//! ├── repository: Arc<Repository>         // page source
//! ├── store: Arc<dyn SnapshotStore>       // durable snapshot, keyed by `key`
//! ├── snapshot: SnapshotRecord            // accumulated list, offset, scroll, errors
//! ├── state: watch::Sender<UiState>       // what the renderer observes
//! ├── in_flight: Option<InFlight>         // at most one fetch at a time
//! └── completions: mpsc channel           // fetch results, applied by the owner
//! ```
//!
//! Fetches run as spawned tokio tasks. Their results come back over a
//! channel and are applied on the owner's side, either by awaiting
//! [`ListController::settle`] or by draining [`ListController::poll_completions`]
//! from a synchronous event loop. Each fetch carries a ticket; results whose
//! ticket is no longer current are dropped.
//!
//! The snapshot is saved explicitly after every transition that changes it.
//! Scroll updates are the exception: they only mark the snapshot dirty and
//! ride along with the next save, `detach()`, or `flush()`.

use std::num::NonZeroU32;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;

use crate::catalog::{Page, RepoError, Repository};
use crate::core::snapshot::{ScrollPosition, SnapshotRecord, SnapshotStore};
use crate::core::state::{UiState, error_message};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    Initial,
    Next,
}

struct InFlight {
    ticket: u64,
    kind: FetchKind,
    handle: AbortHandle,
}

/// A finished fetch, sent back from the spawned task.
struct FetchDone {
    ticket: u64,
    result: Result<Page, RepoError>,
}

/// Delivers a fetch result exactly once. A task that panics before
/// delivering reports `Unknown` from its destructor, so `settle()` never
/// waits on a dead fetch. An aborted task reports nothing.
struct CompletionGuard {
    ticket: u64,
    tx: Option<mpsc::UnboundedSender<FetchDone>>,
}

impl CompletionGuard {
    fn deliver(mut self, result: Result<Page, RepoError>) {
        let ticket = self.ticket;
        if let Some(tx) = self.tx.take()
            && tx.send(FetchDone { ticket, result }).is_err()
        {
            warn!("Failed to deliver fetch result (ticket={ticket}): controller dropped");
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if std::thread::panicking()
            && let Some(tx) = self.tx.take()
        {
            let _ = tx.send(FetchDone {
                ticket: self.ticket,
                result: Err(RepoError::Unknown("fetch task panicked".to_string())),
            });
        }
    }
}

/// Host lifecycle hooks. Any environment that can show and hide the list drives these.
pub trait Lifecycle {
    /// The list became visible.
    fn attach(&mut self);
    /// The list is going away; in-flight work is cancelled.
    fn detach(&mut self);
}

pub struct ListController {
    repository: Arc<Repository>,
    store: Arc<dyn SnapshotStore>,
    key: String,
    page_size: NonZeroU32,
    snapshot: SnapshotRecord,
    state: watch::Sender<UiState>,
    in_flight: Option<InFlight>,
    next_ticket: u64,
    completions_tx: mpsc::UnboundedSender<FetchDone>,
    completions_rx: mpsc::UnboundedReceiver<FetchDone>,
    scroll_dirty: bool,
}

impl ListController {
    /// Restores the snapshot stored under `key` (or starts fresh) and
    /// computes the initial state from it. Never fetches.
    pub fn new(
        repository: Arc<Repository>,
        store: Arc<dyn SnapshotStore>,
        key: impl Into<String>,
        page_size: NonZeroU32,
    ) -> Self {
        let key = key.into();
        let snapshot = restore(store.as_ref(), &key, page_size);
        let (state, _) = watch::channel(UiState::from_snapshot(&snapshot));
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        info!(
            "List controller '{}' restored: items={}, has_more={}, last_error={:?}",
            key,
            snapshot.items.len(),
            snapshot.has_more,
            snapshot.last_error
        );

        Self {
            repository,
            store,
            key,
            page_size,
            snapshot,
            state,
            in_flight: None,
            next_ticket: 0,
            completions_tx,
            completions_rx,
            scroll_dirty: false,
        }
    }

    // ------------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------------

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> UiState {
        self.state.borrow().clone()
    }

    pub fn snapshot(&self) -> &SnapshotRecord {
        &self.snapshot
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    // ------------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------------

    /// Discards everything and fetches from offset 0.
    pub fn load_initial_page(&mut self) {
        self.cancel_in_flight();

        self.snapshot.items.clear();
        self.snapshot.offset = 0;
        self.snapshot.page_size = self.page_size.get();
        self.snapshot.has_more = true;
        self.snapshot.last_error = None;
        self.snapshot.scroll = ScrollPosition::default();
        self.snapshot.anchor_id = None;
        self.snapshot.selected_id = None;
        self.persist();

        self.publish(UiState::Loading);
        self.spawn_fetch(FetchKind::Initial);
    }

    /// Fetches the next page if the list is idle, has content, and has more.
    /// Otherwise a silent no-op; repeated calls never queue.
    pub fn load_next_page(&mut self) {
        if self.in_flight.is_some() || !self.state.borrow().can_load_more() {
            debug!("load_next_page ignored for '{}'", self.key);
            return;
        }

        self.publish(UiState::Content {
            items: self.snapshot.items.clone(),
            is_loading_more: true,
            has_more: self.snapshot.has_more,
        });
        self.spawn_fetch(FetchKind::Next);
    }

    /// Re-runs whichever fetch the list needs: the first page when empty,
    /// the next page otherwise.
    pub fn retry(&mut self) {
        if self.in_flight.is_some() {
            return;
        }
        info!("Retry requested for '{}' (last_error={:?})", self.key, self.snapshot.last_error);
        if self.snapshot.items.is_empty() {
            self.load_initial_page();
        } else {
            self.load_next_page();
        }
    }

    /// Records the viewport position. No I/O; saved with the next persist.
    pub fn on_scroll_position_changed(&mut self, index: usize, offset: i32, anchor_id: Option<u32>) {
        self.snapshot.scroll = ScrollPosition { index, offset };
        self.snapshot.anchor_id = anchor_id;
        self.scroll_dirty = true;
    }

    pub fn on_item_selected(&mut self, id: u32) {
        self.snapshot.selected_id = Some(id);
        self.persist();
    }

    /// Writes pending scroll state, if any.
    pub fn flush(&mut self) {
        if self.scroll_dirty {
            self.persist();
        }
    }

    // ------------------------------------------------------------------------
    // Completion handling
    // ------------------------------------------------------------------------

    /// Waits for the in-flight fetch (if any) and applies its result.
    /// A fetch that panicked arrives as `RepoError::Unknown`.
    pub async fn settle(&mut self) {
        while self.in_flight.is_some() {
            match self.completions_rx.recv().await {
                Some(done) => {
                    self.complete(done);
                }
                None => break,
            }
        }
    }

    /// Applies every completion that has already arrived. Returns true if
    /// the state changed.
    pub fn poll_completions(&mut self) -> bool {
        let mut changed = false;
        while let Ok(done) = self.completions_rx.try_recv() {
            changed |= self.complete(done);
        }
        changed
    }

    fn complete(&mut self, done: FetchDone) -> bool {
        let Some(in_flight) = self.in_flight.take_if(|f| f.ticket == done.ticket) else {
            debug!("Dropping stale completion (ticket={}) for '{}'", done.ticket, self.key);
            return false;
        };

        match done.result {
            Ok(page) => {
                self.snapshot.items.extend(page.items);
                self.snapshot.offset = self.snapshot.items.len();
                self.snapshot.has_more = page.has_more;
                self.snapshot.last_error = None;
                self.persist();

                info!(
                    "{:?} fetch done for '{}': items={}, has_more={}",
                    in_flight.kind,
                    self.key,
                    self.snapshot.items.len(),
                    self.snapshot.has_more
                );
                self.publish(UiState::Content {
                    items: self.snapshot.items.clone(),
                    is_loading_more: false,
                    has_more: self.snapshot.has_more,
                });
            }
            Err(err) => {
                let message = error_message(&err);
                warn!("{:?} fetch failed for '{}': {}", in_flight.kind, self.key, err);
                self.snapshot.last_error = Some(message.clone());
                self.persist();

                if self.snapshot.items.is_empty() {
                    self.publish(UiState::Error(message));
                } else {
                    // Existing content is never discarded by a later-page failure
                    self.publish(UiState::Content {
                        items: self.snapshot.items.clone(),
                        is_loading_more: false,
                        has_more: self.snapshot.has_more,
                    });
                }
            }
        }
        true
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn spawn_fetch(&mut self, kind: FetchKind) {
        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let repository = Arc::clone(&self.repository);
        let limit = self.page_size;
        let offset = self.snapshot.offset;

        info!(
            "Spawning {:?} fetch for '{}': limit={}, offset={}, ticket={}",
            kind, self.key, limit, offset, ticket
        );
        let guard = CompletionGuard {
            ticket,
            tx: Some(self.completions_tx.clone()),
        };
        let handle = tokio::spawn(async move {
            let result = repository.load_page(limit, offset).await;
            guard.deliver(result);
        });

        self.in_flight = Some(InFlight {
            ticket,
            kind,
            handle: handle.abort_handle(),
        });
    }

    /// Aborts the in-flight fetch. Its result is never applied.
    fn cancel_in_flight(&mut self) -> Option<FetchKind> {
        let in_flight = self.in_flight.take()?;
        in_flight.handle.abort();
        info!(
            "Cancelled {:?} fetch for '{}' (ticket={})",
            in_flight.kind, self.key, in_flight.ticket
        );
        Some(in_flight.kind)
    }

    fn publish(&self, state: UiState) {
        self.state.send_replace(state);
    }

    fn persist(&mut self) {
        self.snapshot.touch();
        match self.store.save(&self.key, &self.snapshot) {
            Ok(()) => debug!("Snapshot saved: {}", self.key),
            Err(e) => warn!("Failed to save snapshot '{}': {}", self.key, e),
        }
        self.scroll_dirty = false;
    }
}

impl Lifecycle for ListController {
    /// Reconciles restored content with live state. Already showing content
    /// means nothing to do; restored items are shown without fetching; only
    /// an empty list triggers a fetch.
    fn attach(&mut self) {
        if self.in_flight.is_some() || self.state.borrow().is_content() {
            debug!("attach: '{}' already active", self.key);
            return;
        }
        if !self.snapshot.items.is_empty() {
            self.publish(UiState::Content {
                items: self.snapshot.items.clone(),
                is_loading_more: false,
                has_more: self.snapshot.has_more,
            });
            return;
        }
        self.load_initial_page();
    }

    fn detach(&mut self) {
        if self.cancel_in_flight() == Some(FetchKind::Next) {
            self.publish(UiState::Content {
                items: self.snapshot.items.clone(),
                is_loading_more: false,
                has_more: self.snapshot.has_more,
            });
        }
        self.flush();
    }
}

impl Drop for ListController {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.handle.abort();
        }
    }
}

/// Loads and sanity-checks the stored snapshot. Unreadable snapshots are
/// treated as absent.
fn restore(store: &dyn SnapshotStore, key: &str, page_size: NonZeroU32) -> SnapshotRecord {
    let mut snapshot = match store.load(key) {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => SnapshotRecord::new(page_size.get()),
        Err(e) => {
            warn!("Discarding unreadable snapshot '{}': {}", key, e);
            SnapshotRecord::new(page_size.get())
        }
    };

    if snapshot.offset != snapshot.items.len() {
        warn!(
            "Snapshot '{}' offset {} does not match {} items; using item count",
            key,
            snapshot.offset,
            snapshot.items.len()
        );
        snapshot.offset = snapshot.items.len();
    }
    if snapshot.page_size != page_size.get() {
        debug!(
            "Snapshot '{}' page size {} replaced by {}",
            key, snapshot.page_size, page_size
        );
        snapshot.page_size = page_size.get();
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::catalog::{CatalogClient, CatalogError, DEFAULT_PAGE_SIZE, Item, PageDto, PokemonDto};
    use crate::core::snapshot::MemorySnapshotStore;
    use crate::test_support::{ScriptedCatalog, controller_with_store, page_dto, test_controller};

    fn names(state: &UiState) -> Vec<String> {
        state.items().iter().map(|i| i.name.clone()).collect()
    }

    async fn let_tasks_run() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    struct PanickingCatalog;

    #[async_trait]
    impl CatalogClient for PanickingCatalog {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn fetch_page(&self, _limit: NonZeroU32, _offset: usize) -> Result<PageDto, CatalogError> {
            panic!("catalog blew up")
        }

        async fn fetch_detail(&self, _id: u32) -> Result<PokemonDto, CatalogError> {
            panic!("catalog blew up")
        }
    }

    /// Controller showing `Content` with bulbasaur + ivysaur and `has_more = true`.
    async fn content_controller(
        catalog: Arc<ScriptedCatalog>,
    ) -> (ListController, Arc<MemorySnapshotStore>) {
        catalog.push_page(page_dto(&[(1, "bulbasaur"), (2, "ivysaur")], true));
        let (mut controller, store) = test_controller(catalog);
        controller.attach();
        controller.settle().await;
        assert!(controller.state().can_load_more());
        (controller, store)
    }

    #[tokio::test]
    async fn test_cold_start_then_first_page() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog.push_page(page_dto(&[(1, "bulbasaur"), (2, "ivysaur")], false));
        let (mut controller, _store) = test_controller(catalog.clone());

        assert_eq!(controller.state(), UiState::Loading);

        controller.attach();
        controller.settle().await;

        let state = controller.state();
        assert_eq!(names(&state), vec!["Bulbasaur", "Ivysaur"]);
        assert!(matches!(
            state,
            UiState::Content {
                is_loading_more: false,
                has_more: false,
                ..
            }
        ));
        assert_eq!(catalog.calls(), vec![(20, 0)]);
        assert_eq!(controller.snapshot().offset, 2);
    }

    #[tokio::test]
    async fn test_attach_is_idempotent_with_content() {
        let catalog = Arc::new(ScriptedCatalog::new());
        let (mut controller, _store) = content_controller(catalog.clone()).await;

        controller.attach();
        controller.attach();

        assert!(!controller.is_fetching());
        assert_eq!(catalog.call_count(), 1);
    }

    #[tokio::test]
    async fn test_attach_while_initial_fetch_in_flight_does_not_refetch() {
        let (catalog, gate) = ScriptedCatalog::gated();
        let catalog = Arc::new(catalog);
        catalog.push_page(page_dto(&[(1, "bulbasaur")], false));
        let (mut controller, _store) = test_controller(catalog.clone());

        controller.attach();
        let_tasks_run().await;
        controller.attach();
        let_tasks_run().await;
        assert_eq!(catalog.call_count(), 1);

        gate.add_permits(1);
        controller.settle().await;
        assert_eq!(names(&controller.state()), vec!["Bulbasaur"]);
    }

    #[tokio::test]
    async fn test_load_next_page_appends_and_advances_offset() {
        let catalog = Arc::new(ScriptedCatalog::new());
        let (mut controller, _store) = content_controller(catalog.clone()).await;
        catalog.push_page(page_dto(&[(3, "venusaur")], false));

        controller.load_next_page();
        assert!(matches!(
            controller.state(),
            UiState::Content {
                is_loading_more: true,
                ..
            }
        ));
        controller.settle().await;

        let state = controller.state();
        assert_eq!(state.items().len(), 3);
        assert_eq!(controller.snapshot().offset, 3);
        assert_eq!(catalog.calls(), vec![(20, 0), (20, 2)]);
        assert!(matches!(
            state,
            UiState::Content {
                is_loading_more: false,
                has_more: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_rapid_load_next_page_issues_one_request() {
        let (catalog, gate) = ScriptedCatalog::gated();
        let catalog = Arc::new(catalog);
        catalog.push_page(page_dto(&[(1, "bulbasaur"), (2, "ivysaur")], true));
        catalog.push_page(page_dto(&[(3, "venusaur")], true));
        let (mut controller, _store) = test_controller(catalog.clone());

        gate.add_permits(1);
        controller.attach();
        controller.settle().await;

        controller.load_next_page();
        controller.load_next_page();
        let_tasks_run().await;
        controller.load_next_page();
        let_tasks_run().await;
        assert_eq!(catalog.call_count(), 2);

        gate.add_permits(1);
        controller.settle().await;
        assert_eq!(controller.state().items().len(), 3);
        assert_eq!(catalog.call_count(), 2);
    }

    #[tokio::test]
    async fn test_load_next_page_noop_without_more() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog.push_page(page_dto(&[(1, "bulbasaur")], false));
        let (mut controller, _store) = test_controller(catalog.clone());

        controller.load_next_page(); // Loading: ignored
        assert_eq!(controller.state(), UiState::Loading);

        controller.attach();
        controller.settle().await;
        controller.load_next_page(); // has_more = false: ignored
        assert!(!controller.is_fetching());
        assert_eq!(catalog.call_count(), 1);
    }

    #[tokio::test]
    async fn test_later_page_failure_keeps_content() {
        let catalog = Arc::new(ScriptedCatalog::new());
        let (mut controller, store) = content_controller(catalog.clone()).await;
        catalog.push_error(CatalogError::Http {
            status: 500,
            message: Some("Internal server error".to_string()),
        });

        controller.load_next_page();
        controller.settle().await;

        let state = controller.state();
        assert_eq!(names(&state), vec!["Bulbasaur", "Ivysaur"]);
        assert!(matches!(
            state,
            UiState::Content {
                is_loading_more: false,
                has_more: true,
                ..
            }
        ));
        let last_error = controller.snapshot().last_error.clone().unwrap();
        assert!(last_error.contains("500"));
        let stored = store.load("pokemon-list").unwrap().unwrap();
        assert_eq!(stored.last_error, Some(last_error));
        assert_eq!(stored.offset, 2);
    }

    #[tokio::test]
    async fn test_first_page_network_failure_is_error() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog.push_error(CatalogError::Network("connect timeout".to_string()));
        let (mut controller, _store) = test_controller(catalog);

        controller.attach();
        controller.settle().await;

        match controller.state() {
            UiState::Error(message) => assert!(message.starts_with("network error")),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retry_after_first_page_failure() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog.push_error(CatalogError::Network("refused".to_string()));
        catalog.push_page(page_dto(&[(1, "bulbasaur")], false));
        let (mut controller, _store) = test_controller(catalog.clone());

        controller.attach();
        controller.settle().await;
        assert!(matches!(controller.state(), UiState::Error(_)));

        controller.retry();
        assert_eq!(controller.state(), UiState::Loading);
        controller.settle().await;

        assert_eq!(names(&controller.state()), vec!["Bulbasaur"]);
        assert!(controller.snapshot().last_error.is_none());
        assert_eq!(catalog.calls(), vec![(20, 0), (20, 0)]);
    }

    #[tokio::test]
    async fn test_retry_after_later_page_failure_refetches_same_offset() {
        let catalog = Arc::new(ScriptedCatalog::new());
        let (mut controller, _store) = content_controller(catalog.clone()).await;
        catalog.push_error(CatalogError::Network("reset".to_string()));
        catalog.push_page(page_dto(&[(3, "venusaur")], false));

        controller.load_next_page();
        controller.settle().await;
        controller.retry();
        controller.settle().await;

        assert_eq!(catalog.calls(), vec![(20, 0), (20, 2), (20, 2)]);
        assert_eq!(controller.state().items().len(), 3);
    }

    #[tokio::test]
    async fn test_load_initial_page_discards_content() {
        let catalog = Arc::new(ScriptedCatalog::new());
        let (mut controller, _store) = content_controller(catalog.clone()).await;
        controller.on_scroll_position_changed(1, 0, Some(2));
        controller.on_item_selected(2);
        catalog.push_page(page_dto(&[(4, "charmander")], false));

        controller.load_initial_page();
        assert_eq!(controller.state(), UiState::Loading);
        assert!(controller.snapshot().items.is_empty());
        assert_eq!(controller.snapshot().selected_id, None);
        controller.settle().await;

        assert_eq!(names(&controller.state()), vec!["Charmander"]);
        assert_eq!(catalog.calls().last(), Some(&(20, 0)));
        assert_eq!(controller.snapshot().scroll, ScrollPosition::default());
    }

    #[tokio::test]
    async fn test_stale_completion_is_dropped() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog.push_page(page_dto(&[(1, "bulbasaur")], false));
        catalog.push_page(page_dto(&[(4, "charmander")], false));
        let (mut controller, _store) = test_controller(catalog.clone());

        controller.attach();
        // First fetch finishes and queues its result before it is applied
        let_tasks_run().await;
        controller.load_initial_page();
        controller.settle().await;

        assert_eq!(names(&controller.state()), vec!["Charmander"]);
        assert_eq!(controller.snapshot().offset, 1);
    }

    #[tokio::test]
    async fn test_detach_cancels_without_touching_snapshot() {
        let (catalog, gate) = ScriptedCatalog::gated();
        let catalog = Arc::new(catalog);
        catalog.push_page(page_dto(&[(1, "bulbasaur"), (2, "ivysaur")], true));
        catalog.push_page(page_dto(&[(3, "venusaur")], true));
        let (mut controller, store) = test_controller(catalog.clone());

        gate.add_permits(1);
        controller.attach();
        controller.settle().await;
        let before = store.load("pokemon-list").unwrap().unwrap();

        controller.load_next_page();
        let_tasks_run().await;
        controller.detach();

        gate.add_permits(1);
        let_tasks_run().await;
        assert!(!controller.poll_completions());

        let after = store.load("pokemon-list").unwrap().unwrap();
        assert_eq!(after.items, before.items);
        assert_eq!(after.offset, 2);
        assert!(after.last_error.is_none());
        assert!(controller.state().can_load_more());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_restores_content_and_scroll() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog.push_page(page_dto(&[(1, "bulbasaur"), (2, "ivysaur")], true));
        let store = Arc::new(MemorySnapshotStore::new());

        let mut first = controller_with_store(catalog.clone(), store.clone());
        first.attach();
        first.settle().await;
        first.on_scroll_position_changed(1, 12, Some(2));
        first.detach();
        let expected_state = first.state();
        drop(first);

        let mut restored = controller_with_store(catalog.clone(), store);
        assert_eq!(restored.state(), expected_state);
        assert_eq!(restored.snapshot().scroll, ScrollPosition { index: 1, offset: 12 });
        assert_eq!(restored.snapshot().anchor_id, Some(2));
        assert_eq!(restored.snapshot().restore_index(), 1);

        restored.attach();
        assert!(!restored.is_fetching());
        assert_eq!(catalog.call_count(), 1);
    }

    #[tokio::test]
    async fn test_scroll_updates_are_not_saved_until_flush() {
        let catalog = Arc::new(ScriptedCatalog::new());
        let (mut controller, store) = content_controller(catalog).await;

        controller.on_scroll_position_changed(1, 0, Some(2));
        let stored = store.load("pokemon-list").unwrap().unwrap();
        assert_eq!(stored.scroll, ScrollPosition::default());

        controller.flush();
        let stored = store.load("pokemon-list").unwrap().unwrap();
        assert_eq!(stored.scroll, ScrollPosition { index: 1, offset: 0 });
    }

    #[tokio::test]
    async fn test_item_selection_is_persisted() {
        let catalog = Arc::new(ScriptedCatalog::new());
        let (mut controller, store) = content_controller(catalog).await;

        controller.on_item_selected(2);
        let stored = store.load("pokemon-list").unwrap().unwrap();
        assert_eq!(stored.selected_id, Some(2));
    }

    #[tokio::test]
    async fn test_restored_error_state_reloads_on_attach() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog.push_page(page_dto(&[(1, "bulbasaur")], false));
        let store = Arc::new(MemorySnapshotStore::new());
        let mut record = SnapshotRecord::new(20);
        record.last_error = Some("network error".to_string());
        store.save("pokemon-list", &record).unwrap();

        let mut controller = controller_with_store(catalog.clone(), store);
        assert_eq!(controller.state(), UiState::Error("network error".to_string()));

        controller.attach();
        assert_eq!(controller.state(), UiState::Loading);
        controller.settle().await;
        assert_eq!(names(&controller.state()), vec!["Bulbasaur"]);
    }

    #[tokio::test]
    async fn test_restore_reconciles_offset_with_items() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog.push_page(page_dto(&[(3, "venusaur")], false));
        let store = Arc::new(MemorySnapshotStore::new());
        let mut record = SnapshotRecord::new(20);
        record.items = vec![
            Item {
                id: 1,
                name: "Bulbasaur".to_string(),
                image_url: crate::catalog::mapper::image_url(1),
            },
            Item {
                id: 2,
                name: "Ivysaur".to_string(),
                image_url: crate::catalog::mapper::image_url(2),
            },
        ];
        record.offset = 40;
        store.save("pokemon-list", &record).unwrap();

        let mut controller = controller_with_store(catalog.clone(), store);
        assert_eq!(controller.snapshot().offset, 2);

        controller.load_next_page();
        controller.settle().await;
        assert_eq!(catalog.calls(), vec![(20, 2)]);
    }

    #[tokio::test]
    async fn test_subscribers_see_published_states() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog.push_page(page_dto(&[(1, "bulbasaur")], false));
        let (mut controller, _store) = test_controller(catalog);
        let mut rx = controller.subscribe();

        controller.attach();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), UiState::Loading);

        controller.settle().await;
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_content());
    }

    #[tokio::test]
    async fn test_panicked_fetch_settles_as_unknown() {
        let repository = Arc::new(Repository::new(Arc::new(PanickingCatalog)));
        let store = Arc::new(MemorySnapshotStore::new());
        let mut controller = ListController::new(repository, store, "pokemon-list", DEFAULT_PAGE_SIZE);

        controller.attach();
        tokio::time::timeout(Duration::from_secs(5), controller.settle())
            .await
            .expect("settle must return after a panicked fetch");

        assert!(!controller.is_fetching());
        assert_eq!(
            controller.state(),
            UiState::Error(error_message(&RepoError::Unknown(String::new())))
        );
        assert!(controller.snapshot().last_error.is_some());
    }
}
