//! Content filtering for server-supplied text.
//!
//! [`DenylistSanitizer`] strips a fixed set of dangerous elements and
//! event-handler attributes. It is NOT a complete XSS defense: `javascript:`
//! URLs, `style` attribute expressions and any element or attribute outside
//! the denylist pass through untouched. Markup from an untrusted source must
//! also go through [`AllowlistSanitizer`] at the trust boundary.

mod allowlist;
mod denylist;
mod truncate;

pub use allowlist::AllowlistSanitizer;
pub use denylist::{strip_tags, DenylistSanitizer, DENIED_ATTRIBUTES, DENIED_ELEMENTS};
pub use truncate::{truncate, truncate_preview};

/// Pluggable markup sanitization capability.
pub trait MarkupSanitizer: Send + Sync {
    /// Returns `markup` with the implementation's unsafe constructs removed.
    fn sanitize(&self, markup: &str) -> String;
}
