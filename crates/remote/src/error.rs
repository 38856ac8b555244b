//! Typed error enum for the remote crate.

use thiserror::Error;

/// Errors building an [`crate::HttpPageFetcher`].
///
/// Per-request failures are not here; they surface as
/// [`incr_list_core::FetchError`] through the list state.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}
