//! Engine configuration: defaults, environment overrides and JSON files.

use std::path::Path;
use std::time::Duration;

use incr_list_core::{
    parse_checked, PageSize, Viewport, DEFAULT_DEBOUNCE_MS, DEFAULT_OVERSCAN, DEFAULT_PAGE_SIZE,
    DEFAULT_PREVIEW_LENGTH, DEFAULT_ROW_HEIGHT, MAX_PAGE_SIZE,
};
use serde::{Deserialize, Serialize};

use crate::EngineError;

const PAGE_SIZE_ENV: &str = "INCR_LIST_PAGE_SIZE";
const DEBOUNCE_MS_ENV: &str = "INCR_LIST_DEBOUNCE_MS";
const FETCH_TIMEOUT_MS_ENV: &str = "INCR_LIST_FETCH_TIMEOUT_MS";
const ROW_HEIGHT_ENV: &str = "INCR_LIST_ROW_HEIGHT";
const OVERSCAN_ENV: &str = "INCR_LIST_OVERSCAN";
const PREVIEW_LENGTH_ENV: &str = "INCR_LIST_PREVIEW_LENGTH";

/// Tunables for one list view. Missing fields in a config file take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub page_size: u32,
    pub debounce_ms: u64,
    /// `None` waits on the fetch collaborator indefinitely.
    pub fetch_timeout_ms: Option<u64>,
    pub row_height: f64,
    pub overscan: usize,
    pub preview_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            fetch_timeout_ms: None,
            row_height: DEFAULT_ROW_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
            preview_length: DEFAULT_PREVIEW_LENGTH,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `INCR_LIST_*` environment variables.
    ///
    /// Unparseable or out-of-range values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let page_size = parse_checked(
            PAGE_SIZE_ENV,
            lookup(PAGE_SIZE_ENV).as_deref(),
            defaults.page_size,
            |v| (1..=MAX_PAGE_SIZE).contains(v),
        );
        let debounce_ms =
            parse_checked(DEBOUNCE_MS_ENV, lookup(DEBOUNCE_MS_ENV).as_deref(), defaults.debounce_ms, |_| {
                true
            });
        // 0 disables the timeout.
        let fetch_timeout_ms =
            parse_checked(FETCH_TIMEOUT_MS_ENV, lookup(FETCH_TIMEOUT_MS_ENV).as_deref(), 0_u64, |_| true);
        let row_height = parse_checked(
            ROW_HEIGHT_ENV,
            lookup(ROW_HEIGHT_ENV).as_deref(),
            defaults.row_height,
            |v: &f64| v.is_finite() && *v > 0.0,
        );
        let overscan =
            parse_checked(OVERSCAN_ENV, lookup(OVERSCAN_ENV).as_deref(), defaults.overscan, |_| true);
        let preview_length = parse_checked(
            PREVIEW_LENGTH_ENV,
            lookup(PREVIEW_LENGTH_ENV).as_deref(),
            defaults.preview_length,
            |v| *v > 0,
        );

        Self {
            page_size,
            debounce_ms,
            fetch_timeout_ms: (fetch_timeout_ms > 0).then_some(fetch_timeout_ms),
            row_height,
            overscan,
            preview_length,
        }
    }

    /// Reads a JSON config file; fields it omits keep their defaults.
    ///
    /// `"fetch_timeout_ms": 0` disables the timeout, as the env var does.
    pub fn from_json_file(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&raw)?;
        config.page_size()?;
        config.fetch_timeout_ms = config.fetch_timeout_ms.filter(|ms| *ms > 0);
        Ok(config)
    }

    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    pub fn page_size(&self) -> Result<PageSize, EngineError> {
        Ok(PageSize::new(self.page_size)?)
    }

    /// Viewport with this config's row height and overscan.
    pub fn viewport(&self, scroll_offset: f64, viewport_height: f64) -> Result<Viewport, EngineError> {
        Ok(Viewport::new(scroll_offset, viewport_height, self.row_height, self.overscan)?)
    }
}
