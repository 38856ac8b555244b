//! Async half of the incremental list engine.
//!
//! Raw filter input is debounced into stable [`Query`] values, each of which
//! starts a new generation in the [`PageFetchCoordinator`]. Late responses from
//! superseded generations are dropped on arrival. Rendering goes through a
//! [`ListErrorIsolator`] so one bad row degrades to a fallback instead of
//! taking the view down.
//!
//! [`Query`]: incr_list_core::Query

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]

mod config;
mod coordinator;
mod debounce;
mod error;
mod fetcher;
mod isolator;
mod list_engine;

#[cfg(test)]
mod test_support;

pub use config::EngineConfig;
pub use coordinator::{FetchOutcome, FetchTicket, ListState, ListStatus, PageFetchCoordinator, VisibleRows};
pub use debounce::{debounced, DebouncedReceiver, DebouncedSender, Debouncer};
pub use error::EngineError;
pub use fetcher::{InMemoryFetcher, PageFetcher};
pub use isolator::{Fallback, ListErrorIsolator, RenderError, RenderFault, RenderOutcome};
pub use list_engine::ListEngine;
