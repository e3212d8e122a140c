//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the list and
//! detail screens, and drives the `ListController` from keyboard events.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Controller Contract
//!
//! - `attach()` once the terminal is up, `detach()` before it is torn down
//! - `load_next_page()` when the selection is near the end, at most once per
//!   navigation or list growth; a failed page waits for the user to move or
//!   press `r`
//! - `on_scroll_position_changed()` when the first visible row moves
//! - `on_item_selected()` when an entry is opened
//!
//! ## Redraw Strategy
//!
//! The loop polls fast (~80ms) while something is loading so completions
//! show up promptly, and sleeps up to 500ms when idle. It only redraws
//! after an input event, a resize, or a state change.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;

use crate::catalog::{PokeApiClient, PokemonDetail, RepoError, Repository};
use crate::core::config::ResolvedConfig;
use crate::core::state::error_message;
use crate::core::{FileSnapshotStore, Lifecycle, ListController};
use crate::tui::component::EventHandler;
use crate::tui::components::{DetailState, DetailView, ListEvent, PokemonListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Snapshot key of the one list screen.
pub const LIST_SNAPSHOT_KEY: &str = "pokemon-list";

pub enum Screen {
    List,
    Detail(DetailView),
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub list: PokemonListState,
    pub screen: Screen,
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            list: PokemonListState::new(),
            screen: Screen::List,
        }
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableMouseCapture)?;
        info!("Terminal modes enabled (mouse)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture);
    }
}

/// Result of an on-demand detail fetch.
struct DetailLoaded {
    id: u32,
    result: Result<PokemonDetail, RepoError>,
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let client = PokeApiClient::new(Some(config.base_url.clone()), config.timeout);
    let repository = Arc::new(Repository::new(Arc::new(client)));
    let store = Arc::new(FileSnapshotStore::new(config.snapshot_dir.clone()));
    let mut controller = ListController::new(
        repository.clone(),
        store,
        LIST_SNAPSHOT_KEY,
        config.page_size,
    );

    let mut tui = TuiState::new();
    tui.list.restore(controller.snapshot());

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for detail fetches from background tasks
    let (detail_tx, detail_rx) = mpsc::channel::<DetailLoaded>();
    let mut detail_abort: Option<tokio::task::AbortHandle> = None;

    let mut state_rx = controller.subscribe();
    controller.attach();
    let mut ui_state = controller.state();
    tui.list.sync_len(ui_state.items().len());
    if controller.snapshot().last_error.is_some() {
        tui.list.disarm_prefetch();
    }
    let mut needs_redraw = true; // Force first frame

    let result = loop {
        // Apply finished fetches, then pick up whatever the controller published
        controller.poll_completions();
        while let Ok(loaded) = detail_rx.try_recv() {
            if let Screen::Detail(view) = &mut tui.screen
                && view.item.id == loaded.id
            {
                view.state = match loaded.result {
                    Ok(detail) => DetailState::Loaded(detail),
                    Err(e) => DetailState::Failed(error_message(&e)),
                };
                detail_abort = None;
                needs_redraw = true;
            }
        }

        if matches!(tui.screen, Screen::List)
            && ui_state.can_load_more()
            && tui.list.take_prefetch()
        {
            controller.load_next_page();
        }

        if state_rx.has_changed().unwrap_or(false) {
            ui_state = state_rx.borrow_and_update().clone();
            tui.list.sync_len(ui_state.items().len());
            if ui_state.can_load_more() && controller.snapshot().last_error.is_some() {
                tui.list.disarm_prefetch();
            }
            needs_redraw = true;
        }

        if needs_redraw {
            let last_error = controller.snapshot().last_error.clone();
            if let Err(e) =
                terminal.draw(|f| ui::draw_ui(f, &ui_state, last_error.as_deref(), &mut tui))
            {
                break Err(e);
            }
            needs_redraw = false;

            if let Some(top) = tui.list.take_viewport_change() {
                let anchor = ui_state.items().get(top).map(|item| item.id);
                controller.on_scroll_position_changed(top, 0, anchor);
            }
        }

        let timeout = if controller.is_fetching() || detail_abort.is_some() {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match event {
                TuiEvent::Resize => continue,
                TuiEvent::ForceQuit | TuiEvent::Quit => {
                    should_quit = true;
                    break;
                }
                _ => {}
            }

            if matches!(tui.screen, Screen::List) {
                match event {
                    TuiEvent::Retry => controller.retry(),
                    TuiEvent::Reload => {
                        controller.load_initial_page();
                        tui.list = PokemonListState::new();
                    }
                    _ => {
                        if let Some(ListEvent::Open(index)) = tui.list.handle_event(&event)
                            && let Some(item) = ui_state.items().get(index).cloned()
                        {
                            controller.on_item_selected(item.id);
                            detail_abort =
                                Some(spawn_detail(&repository, item.id, detail_tx.clone()));
                            tui.screen = Screen::Detail(DetailView::new(item));
                        }
                    }
                }
            } else if let Screen::Detail(view) = &mut tui.screen {
                match event {
                    TuiEvent::Back => {
                        if let Some(handle) = detail_abort.take() {
                            handle.abort();
                        }
                        tui.screen = Screen::List;
                    }
                    TuiEvent::Retry if matches!(view.state, DetailState::Failed(_)) => {
                        view.state = DetailState::Loading;
                        detail_abort =
                            Some(spawn_detail(&repository, view.item.id, detail_tx.clone()));
                    }
                    _ => {}
                }
            }
        }

        if should_quit {
            info!("Quit requested");
            break Ok(());
        }
    };

    controller.detach();
    if let Some(handle) = detail_abort {
        handle.abort();
    }

    ratatui::restore();
    result
}

fn spawn_detail(
    repository: &Arc<Repository>,
    id: u32,
    tx: mpsc::Sender<DetailLoaded>,
) -> tokio::task::AbortHandle {
    info!("Spawning detail fetch: id={}", id);
    let repository = Arc::clone(repository);
    let handle = tokio::spawn(async move {
        let result = repository.load_detail(id).await;
        debug!("Detail fetch for id={} finished: ok={}", id, result.is_ok());
        if tx.send(DetailLoaded { id, result }).is_err() {
            warn!("Failed to send detail for id={}: receiver dropped", id);
        }
    });
    handle.abort_handle()
}

