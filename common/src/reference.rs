//! Inline expansion of quoted post references.

use crate::error::ForumError;

/// Marker appended to a reference whose target could not be fetched.
pub const ERROR_MARKER: &str = " (错误)";

/// State of one reference link.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RefState {
    #[default]
    Collapsed,
    Loading,
    /// Rendered fragment shown right after the link.
    Expanded(String),
    /// Terminal: the fetch failed and the link no longer reacts.
    Errored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefAction {
    /// Fetch the raw fragment, then call [`RefState::settle`].
    Fetch,
    /// The inserted fragment was removed.
    Collapse,
    Ignore,
}

impl RefState {
    /// Handle a click and return what the caller must do.
    pub fn toggle(&mut self) -> RefAction {
        match self {
            RefState::Collapsed => {
                *self = RefState::Loading;
                RefAction::Fetch
            }
            RefState::Expanded(_) => {
                *self = RefState::Collapsed;
                RefAction::Collapse
            }
            RefState::Loading | RefState::Errored => RefAction::Ignore,
        }
    }

    /// Apply the outcome of the fetch started by [`RefAction::Fetch`].
    pub fn settle(&mut self, result: Result<String, ForumError>) {
        if *self != RefState::Loading {
            return;
        }
        *self = match result {
            Ok(html) => RefState::Expanded(html),
            Err(e) => {
                tracing::warn!("Reference fetch failed: {e}");
                RefState::Errored
            }
        };
    }

    pub fn fragment(&self) -> Option<&str> {
        match self {
            RefState::Expanded(html) => Some(html),
            _ => None,
        }
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, RefState::Errored)
    }
}
