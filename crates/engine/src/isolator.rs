//! Render fault isolation.
//!
//! The boundary is coarse: one failing row replaces the whole list with a
//! fallback until the user asks to try again.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use incr_list_core::{VisibleRange, EMPTY_STATE_MESSAGE, FALLBACK_MESSAGE, RETRY_ACTION_LABEL};
use serde::Serialize;
use thiserror::Error;

/// Error a render collaborator returns for a row it cannot build.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct RenderError(String);

impl RenderError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A caught row failure, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderFault {
    pub index: usize,
    pub message: String,
    /// The render function panicked rather than returning an error.
    pub panicked: bool,
}

/// What the host shows instead of the rows after a fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fallback {
    pub message: &'static str,
    pub action: &'static str,
    pub fault: RenderFault,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum RenderOutcome<R> {
    /// Rendered rows with their absolute indices, in order.
    Rows(Vec<(usize, R)>),
    /// Nothing in range; the host shows `message`.
    Empty { message: &'static str },
    Fallback(Fallback),
}

impl<R> RenderOutcome<R> {
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Guards a render pass over the windowed rows.
#[derive(Debug, Default)]
pub struct ListErrorIsolator {
    fault: Option<RenderFault>,
}

impl ListErrorIsolator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn fault(&self) -> Option<&RenderFault> {
        self.fault.as_ref()
    }

    #[must_use]
    pub const fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    /// Renders `items[range]` with `render_row`, or the fallback.
    ///
    /// Only indices inside `range` are handed to `render_row`. An `Err` or a
    /// panic from any row trips the isolator; it stays tripped, returning the
    /// fallback without calling `render_row`, until [`Self::try_again`].
    pub fn render<T, R, F>(&mut self, items: &[T], range: VisibleRange, render_row: F) -> RenderOutcome<R>
    where
        F: Fn(&T, usize) -> Result<R, RenderError>,
    {
        let rows = range.indices().map_while(|index| items.get(index).map(|item| (index, item)));
        self.render_indexed(rows, render_row)
    }

    /// Same as [`Self::render`] over rows already cut out of the list, each
    /// paired with its absolute index.
    pub fn render_rows<T, R, F>(&mut self, rows: &[(usize, T)], render_row: F) -> RenderOutcome<R>
    where
        F: Fn(&T, usize) -> Result<R, RenderError>,
    {
        self.render_indexed(rows.iter().map(|(index, item)| (*index, item)), render_row)
    }

    fn render_indexed<'a, T: 'a, R, F>(
        &mut self,
        indexed: impl Iterator<Item = (usize, &'a T)>,
        render_row: F,
    ) -> RenderOutcome<R>
    where
        F: Fn(&T, usize) -> Result<R, RenderError>,
    {
        if let Some(fault) = &self.fault {
            return RenderOutcome::Fallback(fallback(fault.clone()));
        }

        let mut rows = Vec::new();
        for (index, item) in indexed {
            let fault = match catch_unwind(AssertUnwindSafe(|| render_row(item, index))) {
                Ok(Ok(row)) => {
                    rows.push((index, row));
                    continue;
                },
                Ok(Err(err)) => RenderFault { index, message: err.to_string(), panicked: false },
                Err(payload) => {
                    RenderFault { index, message: panic_message(payload.as_ref()), panicked: true }
                },
            };
            return self.trip(fault);
        }
        if rows.is_empty() {
            return RenderOutcome::Empty { message: EMPTY_STATE_MESSAGE };
        }
        RenderOutcome::Rows(rows)
    }

    /// Clears the fault so the next render re-attempts with current state.
    ///
    /// Does not re-fetch anything.
    pub fn try_again(&mut self) {
        if let Some(fault) = self.fault.take() {
            tracing::info!(index = fault.index, "retrying list render after fault");
        }
    }

    fn trip<R>(&mut self, fault: RenderFault) -> RenderOutcome<R> {
        tracing::error!(
            index = fault.index,
            panicked = fault.panicked,
            error = %fault.message,
            "row render failed, showing list fallback"
        );
        self.fault = Some(fault.clone());
        RenderOutcome::Fallback(fallback(fault))
    }
}

const fn fallback(fault: RenderFault) -> Fallback {
    Fallback { message: FALLBACK_MESSAGE, action: RETRY_ACTION_LABEL, fault }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return (*s).to_owned();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "row render panicked".to_owned()
}
