//! # TUI Components
//!
//! - `PokemonList`: stateful list screen (selection, viewport, footer)
//! - `DetailView`: single-entry screen, filled by an on-demand fetch
//!
//! Stateful components keep their persistent state in `TuiState` and are
//! wrapped by a transient struct each frame (see `component::Component`).

pub mod detail;
pub mod pokemon_list;

pub use detail::{DetailState, DetailView};
pub use pokemon_list::{ListEvent, PokemonList, PokemonListState};
