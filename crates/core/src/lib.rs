//! Core types for the incremental list engine
//!
//! This crate holds everything that is synchronous and I/O free: the list data
//! model, fixed-row windowing, markup sanitization and truncation. The async
//! pieces (debouncing, fetch coordination) live in `incr-list-engine`.

mod constants;
mod content;
mod env_config;
mod error;
mod item;
mod page;
mod query;
mod viewport;

pub use constants::*;
pub use content::*;
pub use env_config::*;
pub use error::*;
pub use item::*;
pub use page::*;
pub use query::*;
pub use viewport::*;
