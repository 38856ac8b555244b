use serde::{Deserialize, Serialize};

use crate::{CoreError, MAX_PAGE_SIZE};

/// What a fetch collaborator returns for one page request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(alias = "hasMore")]
    pub has_more: bool,
}

impl<T> PageResponse<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, has_more: bool) -> Self {
        Self { items, total, has_more }
    }
}

/// A fetched page tagged with the request that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub page_number: u32,
    pub page_size: u32,
    pub items: Vec<T>,
    pub total: u64,
    pub has_more: bool,
}

impl<T> Page<T> {
    #[must_use]
    pub fn from_response(page_number: u32, page_size: u32, response: PageResponse<T>) -> Self {
        Self {
            page_number,
            page_size,
            items: response.items,
            total: response.total,
            has_more: response.has_more,
        }
    }

    /// Whether this page replaces accumulated items instead of extending them.
    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.page_number == 1
    }
}

/// Validated number of items per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PageSize(u32);

impl PageSize {
    /// # Errors
    /// Returns [`CoreError::InvalidPageSize`] for zero or sizes above [`MAX_PAGE_SIZE`].
    pub fn new(size: u32) -> Result<Self, CoreError> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(CoreError::InvalidPageSize(size));
        }
        Ok(Self(size))
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Fetch lifecycle of the current generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl FetchState {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}
