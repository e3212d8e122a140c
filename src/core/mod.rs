//! # Core Application Logic
//!
//! List pagination, persistence, and configuration.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • UiState (observable) │
//!                    │  • ListController       │
//!                    │  • SnapshotStore        │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │    Web     │      │  Mobile    │
//!     │  Adapter   │      │  (future)  │      │  (future)  │
//!     │ (ratatui)  │      │            │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `UiState` enum the renderer observes
//! - [`controller`]: `ListController`, the pagination state machine
//! - [`snapshot`]: The persisted snapshot and its stores
//! - [`config`]: Layered settings

pub mod config;
pub mod controller;
pub mod snapshot;
pub mod state;

pub use controller::{Lifecycle, ListController};
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotRecord, SnapshotStore};
pub use state::UiState;
