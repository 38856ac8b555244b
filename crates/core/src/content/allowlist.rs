use std::collections::HashSet;

use ammonia::Builder;

use super::MarkupSanitizer;

/// Tags kept by [`AllowlistSanitizer::for_rich_text`]; enough for job and agent descriptions.
const RICH_TEXT_TAGS: [&str; 19] = [
    "a", "b", "blockquote", "br", "code", "em", "h3", "h4", "i", "li", "ol", "p", "pre", "s",
    "span", "strong", "u", "ul", "hr",
];

/// Allowlist sanitizer backed by `ammonia`.
///
/// Everything not explicitly allowed is removed, which is what makes it safe at
/// a trust boundary, unlike [`super::DenylistSanitizer`].
pub struct AllowlistSanitizer {
    builder: Builder<'static>,
}

impl AllowlistSanitizer {
    /// Uses ammonia's default allowlist.
    #[must_use]
    pub fn new() -> Self {
        Self { builder: Builder::default() }
    }

    /// A narrower allowlist for user-authored rich text.
    #[must_use]
    pub fn for_rich_text() -> Self {
        let mut builder = Builder::default();
        builder.tags(RICH_TEXT_TAGS.into_iter().collect::<HashSet<&'static str>>());
        Self { builder }
    }
}

impl Default for AllowlistSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AllowlistSanitizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllowlistSanitizer").finish_non_exhaustive()
    }
}

impl MarkupSanitizer for AllowlistSanitizer {
    fn sanitize(&self, markup: &str) -> String {
        self.builder.clean(markup).to_string()
    }
}
