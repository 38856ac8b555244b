use std::borrow::Cow;

use crate::DEFAULT_TRUNCATION_SUFFIX;

/// Limits `text` to `max_length` chars, marking the cut with `suffix`.
///
/// Text that already fits is returned unchanged. Otherwise the result is the
/// first `max_length - len(suffix)` chars followed by `suffix`, so it is never
/// longer than `max_length`. Lengths count `char`s, so multi-byte text is never
/// split inside a code point.
///
/// `max_length` shorter than `suffix` has no valid cut point; it is clamped to
/// the first `max_length` chars of the suffix and logged.
#[must_use]
pub fn truncate<'a>(text: &'a str, max_length: usize, suffix: &str) -> Cow<'a, str> {
    if text.chars().count() <= max_length {
        return Cow::Borrowed(text);
    }

    let suffix_length = suffix.chars().count();
    let Some(keep) = max_length.checked_sub(suffix_length) else {
        tracing::warn!(max_length, suffix_length, "truncation length shorter than suffix, clamping");
        return Cow::Owned(suffix.chars().take(max_length).collect());
    };

    let cut = text.char_indices().nth(keep).map_or(text.len(), |(idx, _)| idx);
    let mut truncated = String::with_capacity(cut.saturating_add(suffix.len()));
    truncated.push_str(text.get(..cut).unwrap_or(text));
    truncated.push_str(suffix);
    Cow::Owned(truncated)
}

/// [`truncate`] with the default `"..."` suffix.
#[must_use]
pub fn truncate_preview(text: &str, max_length: usize) -> Cow<'_, str> {
    truncate(text, max_length, DEFAULT_TRUNCATION_SUFFIX)
}
