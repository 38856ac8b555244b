use std::time::Duration;

use thiserror::Error;

use crate::MAX_PAGE_SIZE;

/// Contract violations caught when constructing core values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    #[error("Invalid page size {0}: must be between 1 and {MAX_PAGE_SIZE}")]
    InvalidPageSize(u32),
}

/// Failure reported by a fetch collaborator.
///
/// Stays local to the list view that issued the fetch; the coordinator records
/// it as `FetchState::Failed` and never propagates it further.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Fetch rejected: {0}")]
    Rejected(String),
}

impl FetchError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { status, .. } => matches!(status, 408 | 429 | 500 | 502 | 503 | 504),
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Decode(_) | Self::Rejected(_) => false,
        }
    }
}
