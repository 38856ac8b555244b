//! Typed error enum for the engine layer.

use incr_list_core::CoreError;
use thiserror::Error;

/// Engine-layer error.
///
/// Fetch failures are deliberately absent: they are list state
/// (`FetchState::Failed`), not errors returned to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid viewport or page size.
    #[error("core: {0}")]
    Core(#[from] CoreError),

    /// The query input channel is gone (engine shut down).
    #[error("query input closed")]
    InputClosed,

    /// Configuration file could not be read.
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON for [`crate::EngineConfig`].
    #[error("config parse: {0}")]
    Serialization(#[from] serde_json::Error),
}
