//! Remote page source for the incremental list engine
//!
//! [`HttpPageFetcher`] implements the engine's `PageFetcher` over a JSON
//! endpoint answering `GET {base}?page=N&page_size=K&search=..` with
//! `{ "items": [...], "total": T, "has_more": B }`.

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]

mod client;
mod error;

#[cfg(test)]
mod client_tests;

pub use client::{HttpPageFetcher, RetryPolicy, DEFAULT_HTTP_TIMEOUT_SECS};
pub use error::RemoteError;
