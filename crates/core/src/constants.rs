//! Shared constants for the incremental list engine.
//!
//! Centralizes defaults that both the engine config and the CLI fall back to.

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on page size (keeps a single response from defeating windowing).
pub const MAX_PAGE_SIZE: u32 = 500;

/// Default debounce interval for filter/search input, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Default fixed row height, in pixels.
pub const DEFAULT_ROW_HEIGHT: f64 = 72.0;

/// Default number of extra rows rendered above and below the viewport.
pub const DEFAULT_OVERSCAN: usize = 3;

/// Default maximum length (in chars) of a plain-text preview.
pub const DEFAULT_PREVIEW_LENGTH: usize = 150;

/// Suffix appended by [`crate::truncate_preview`].
pub const DEFAULT_TRUNCATION_SUFFIX: &str = "...";

/// Message shown in place of the list after a render fault.
pub const FALLBACK_MESSAGE: &str = "Something went wrong";

/// Label of the manual retry action shown with [`FALLBACK_MESSAGE`].
pub const RETRY_ACTION_LABEL: &str = "Try again";

/// Message shown when a generation finished loading with no items.
pub const EMPTY_STATE_MESSAGE: &str = "No results found";
