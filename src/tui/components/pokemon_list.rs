//! # PokemonList Component
//!
//! Scrollable list of loaded entries plus the footer that reports
//! pagination progress.
//!
//! `PokemonList` is transient (built each frame) and wraps
//! `&mut PokemonListState`, which lives in `TuiState` across frames.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, List, ListItem, ListState, Paragraph, Wrap};

use crate::core::{SnapshotRecord, UiState};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Rows from the end at which the next page is requested.
pub const PREFETCH_DISTANCE: usize = 5;

pub enum ListEvent {
    /// User opened the entry at this index.
    Open(usize),
}

/// Selection and viewport state. Must be persisted in the parent TuiState.
pub struct PokemonListState {
    pub list_state: ListState,
    /// Number of entries currently shown.
    pub len: usize,
    /// Rows visible inside the border, from the last render.
    pub viewport_height: usize,
    /// First visible index last reported to the controller.
    last_reported_offset: Option<usize>,
    /// Set by navigation and list growth, spent by [`Self::take_prefetch`].
    prefetch_armed: bool,
}

impl Default for PokemonListState {
    fn default() -> Self {
        Self {
            list_state: ListState::default(),
            len: 0,
            viewport_height: 0,
            last_reported_offset: None,
            prefetch_armed: true,
        }
    }
}

impl PokemonListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings back the viewport and highlight saved in `snapshot`.
    pub fn restore(&mut self, snapshot: &SnapshotRecord) {
        self.len = snapshot.items.len();
        if self.len == 0 {
            return;
        }
        let top = snapshot.restore_index();
        *self.list_state.offset_mut() = top;
        self.list_state
            .select(Some(snapshot.selected_index().unwrap_or(top)));
        self.last_reported_offset = Some(top);
    }

    /// Keeps the selection valid after the item count changes.
    /// Growth re-arms prefetch.
    pub fn sync_len(&mut self, len: usize) {
        if len > self.len {
            self.prefetch_armed = true;
        }
        self.len = len;
        match (len, self.list_state.selected()) {
            (0, _) => self.list_state.select(None),
            (_, None) => self.list_state.select(Some(0)),
            (_, Some(i)) if i >= len => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    /// True when the selection is close enough to the end to fetch more.
    pub fn near_end(&self) -> bool {
        match self.list_state.selected() {
            Some(i) => i + PREFETCH_DISTANCE >= self.len,
            None => self.len == 0,
        }
    }

    /// True once per arming when the selection sits near the end.
    /// The caller only asks when the controller can load more.
    pub fn take_prefetch(&mut self) -> bool {
        if self.prefetch_armed && self.near_end() {
            self.prefetch_armed = false;
            return true;
        }
        false
    }

    /// A failed page stays failed until the user moves or retries.
    pub fn disarm_prefetch(&mut self) {
        self.prefetch_armed = false;
    }

    /// Returns the new first-visible index if it moved since last asked.
    pub fn take_viewport_change(&mut self) -> Option<usize> {
        let offset = self.list_state.offset();
        if self.len == 0 || self.last_reported_offset == Some(offset) {
            return None;
        }
        self.last_reported_offset = Some(offset);
        Some(offset)
    }

    fn move_by(&mut self, delta: isize) {
        if self.len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, self.len as isize - 1);
        self.list_state.select(Some(next as usize));
        self.prefetch_armed = true;
    }
}

impl EventHandler for PokemonListState {
    type Event = ListEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ListEvent> {
        let page = self.viewport_height.max(1) as isize;
        match event {
            TuiEvent::Up => self.move_by(-1),
            TuiEvent::Down => self.move_by(1),
            TuiEvent::PageUp => self.move_by(-page),
            TuiEvent::PageDown => self.move_by(page),
            TuiEvent::Home => self.move_by(-(self.len as isize)),
            TuiEvent::End => self.move_by(self.len as isize),
            TuiEvent::Open => return self.list_state.selected().map(ListEvent::Open),
            _ => {}
        }
        None
    }
}

pub struct PokemonList<'a> {
    pub state: &'a mut PokemonListState,
    pub ui: &'a UiState,
    /// Last pagination error, shown in the footer while content exists.
    pub last_error: Option<&'a str>,
}

impl Component for PokemonList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        match self.ui {
            UiState::Loading => {
                let text = Paragraph::new("Loading Pokédex...")
                    .centered()
                    .block(Block::bordered().title("Pokédex"));
                frame.render_widget(text, area);
            }
            UiState::Error(message) => {
                let lines = vec![
                    Line::from(message.as_str()).style(Style::default().fg(Color::Red)),
                    Line::from(""),
                    Line::from("Press r to retry, q to quit").style(Style::default().add_modifier(Modifier::DIM)),
                ];
                let text = Paragraph::new(lines)
                    .centered()
                    .wrap(Wrap { trim: true })
                    .block(Block::bordered().title("Error"));
                frame.render_widget(text, area);
            }
            UiState::Content {
                items,
                is_loading_more,
                has_more,
            } => {
                let [list_area, footer_area] =
                    Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
                self.state.viewport_height = list_area.height.saturating_sub(2) as usize;

                let rows: Vec<ListItem> = items
                    .iter()
                    .map(|item| ListItem::new(format!("#{:03} {}", item.id, item.name)))
                    .collect();
                let list = List::new(rows)
                    .block(Block::bordered().title(format!("Pokédex ({})", items.len())))
                    .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                    .highlight_symbol("> ");
                frame.render_stateful_widget(list, list_area, &mut self.state.list_state);

                let footer = footer_line(*is_loading_more, *has_more, self.last_error);
                frame.render_widget(Paragraph::new(footer), footer_area);
            }
        }
    }
}

fn footer_line(is_loading_more: bool, has_more: bool, last_error: Option<&str>) -> Line<'static> {
    if is_loading_more {
        Line::from(" Loading more...").style(Style::default().fg(Color::Yellow))
    } else if let Some(error) = last_error {
        Line::from(format!(" {error} (r to retry)")).style(Style::default().fg(Color::Red))
    } else if !has_more {
        Line::from(" End of Pokédex").style(Style::default().add_modifier(Modifier::DIM))
    } else {
        Line::from("")
    }
}
