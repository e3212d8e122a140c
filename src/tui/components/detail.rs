//! # Detail Component
//!
//! Read-only view of a single entry, fetched on demand when the user
//! opens it from the list.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::catalog::{Item, PokemonDetail};
use crate::tui::component::Component;

/// Width of the stat bars at a base stat of 255.
const STAT_BAR_WIDTH: u32 = 30;

pub enum DetailState {
    Loading,
    Loaded(PokemonDetail),
    Failed(String),
}

/// The detail screen: the list item that was opened plus whatever the fetch returned.
pub struct DetailView {
    pub item: Item,
    pub state: DetailState,
}

impl DetailView {
    pub fn new(item: Item) -> Self {
        Self {
            item,
            state: DetailState::Loading,
        }
    }
}

impl Component for DetailView {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = format!("#{:03} {}", self.item.id, self.item.name);
        let lines = match &self.state {
            DetailState::Loading => vec![Line::from("Loading...")],
            DetailState::Failed(message) => vec![
                Line::from(message.as_str()).style(Style::default().fg(Color::Red)),
                Line::from(""),
                Line::from("Press r to retry, Esc to go back")
                    .style(Style::default().add_modifier(Modifier::DIM)),
            ],
            DetailState::Loaded(detail) => detail_lines(detail),
        };
        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::bordered().title(title));
        frame.render_widget(paragraph, area);
    }
}

fn detail_lines(detail: &PokemonDetail) -> Vec<Line<'static>> {
    let label = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Types:  ", label),
            Span::raw(detail.types.join(" / ")),
        ]),
        Line::from(vec![
            Span::styled("Height: ", label),
            Span::raw(format!("{:.1} m", detail.height as f32 / 10.0)),
        ]),
        Line::from(vec![
            Span::styled("Weight: ", label),
            Span::raw(format!("{:.1} kg", detail.weight as f32 / 10.0)),
        ]),
        Line::from(""),
        Line::from(Span::styled("Base stats", label)),
    ];
    for (name, value) in &detail.stats {
        let bar_len = stat_bar_len(*value);
        lines.push(Line::from(vec![
            Span::raw(format!("  {name:<16}{value:>4} ")),
            Span::styled("█".repeat(bar_len), Style::default().fg(Color::Green)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(
        Line::from(format!("Artwork: {}", detail.image_url))
            .style(Style::default().add_modifier(Modifier::DIM)),
    );
    lines
}

/// Base stats top out at 255; anything above draws a full bar.
fn stat_bar_len(value: u32) -> usize {
    (value.min(255) * STAT_BAR_WIDTH / 255).max(1) as usize
}
