//! # List UI State
//!
//! The single observable value the renderer draws from.
//!
//! ```text
//! Loading ──ok──▶ Content { items, is_loading_more, has_more }
//!    │                 ▲  │
//!   err                │  └─ later-page err: stays Content
//!    ▼                 │
//! Error(message) ──retry
//! ```

use crate::catalog::{Item, RepoError};
use crate::core::snapshot::SnapshotRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum UiState {
    /// Nothing to show yet.
    Loading,
    /// The first page failed and there is no prior content.
    Error(String),
    /// At least one page has landed.
    Content {
        items: Vec<Item>,
        is_loading_more: bool,
        has_more: bool,
    },
}

impl UiState {
    /// Cold-start state computed from a restored snapshot.
    pub fn from_snapshot(snapshot: &SnapshotRecord) -> Self {
        if !snapshot.items.is_empty() {
            UiState::Content {
                items: snapshot.items.clone(),
                is_loading_more: false,
                has_more: snapshot.has_more,
            }
        } else if let Some(message) = &snapshot.last_error {
            UiState::Error(message.clone())
        } else {
            UiState::Loading
        }
    }

    pub fn is_content(&self) -> bool {
        matches!(self, UiState::Content { .. })
    }

    /// True when a next-page fetch may start.
    pub fn can_load_more(&self) -> bool {
        matches!(
            self,
            UiState::Content {
                is_loading_more: false,
                has_more: true,
                ..
            }
        )
    }

    pub fn items(&self) -> &[Item] {
        match self {
            UiState::Content { items, .. } => items.as_slice(),
            _ => &[],
        }
    }
}

/// User-facing text for a failed fetch. Opaque to everything but the renderer.
pub fn error_message(err: &RepoError) -> String {
    match err {
        RepoError::Network => {
            "network error: check your connection and try again".to_string()
        }
        RepoError::Http {
            code,
            message: Some(message),
        } => format!("server error (HTTP {code}): {message}"),
        RepoError::Http {
            code,
            message: None,
        } => format!("server error (HTTP {code})"),
        RepoError::Unknown(_) => "something went wrong loading the Pokédex".to_string(),
    }
}
