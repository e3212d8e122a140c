use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use crate::core::UiState;
use crate::tui::component::Component;
use crate::tui::components::PokemonList;
use crate::tui::{Screen, TuiState};

pub fn draw_ui(frame: &mut Frame, ui: &UiState, last_error: Option<&str>, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let [title_area, main_area, help_area] =
        Layout::vertical([Length(1), Min(0), Length(1)]).areas(frame.area());

    frame.render_widget(Span::raw(title_text(ui)), title_area);

    let help = match tui.screen {
        Screen::List => " ↑/↓ move  Enter open  r retry  R reload  q quit",
        Screen::Detail(_) => " Esc back  r retry  q quit",
    };
    frame.render_widget(
        Span::styled(help, Style::default().add_modifier(Modifier::DIM)),
        help_area,
    );

    match &mut tui.screen {
        Screen::List => {
            PokemonList {
                state: &mut tui.list,
                ui,
                last_error,
            }
            .render(frame, main_area);
        }
        Screen::Detail(view) => view.render(frame, main_area),
    }
}

fn title_text(ui: &UiState) -> String {
    match ui {
        UiState::Loading => "Pokédex | loading".to_string(),
        UiState::Error(_) => "Pokédex | offline".to_string(),
        UiState::Content {
            items, has_more, ..
        } => {
            let more = if *has_more { " | more available" } else { "" };
            format!("Pokédex | {} loaded{}", items.len(), more)
        }
    }
}
