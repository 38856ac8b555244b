//! Denylist markup sanitizer and plain-text extraction.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use super::MarkupSanitizer;

/// Elements removed together with their content.
pub const DENIED_ELEMENTS: [&str; 5] = ["script", "style", "iframe", "object", "embed"];

/// Event-handler attributes removed from every remaining tag.
pub const DENIED_ATTRIBUTES: [&str; 4] = ["onload", "onerror", "onclick", "onmouseover"];

/// Denied elements that never take a closing tag.
const VOID_ELEMENTS: [&str; 1] = ["embed"];

/// Strips [`DENIED_ELEMENTS`] and [`DENIED_ATTRIBUTES`] from markup.
///
/// Denylist-based: anything not named above survives, including
/// `javascript:` URLs and `style` attribute expressions. Pair with
/// [`super::AllowlistSanitizer`] when the markup is untrusted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenylistSanitizer;

impl MarkupSanitizer for DenylistSanitizer {
    fn sanitize(&self, markup: &str) -> String {
        let without_elements = DENIED_ELEMENTS
            .iter()
            .fold(markup.to_owned(), |text, tag| strip_element(&text, tag));
        strip_denied_attributes(&without_elements)
    }
}

/// Removes every `<tag>...</tag>` block, handling nesting of the same element.
///
/// An element still open at end of input swallows the rest of the input, the
/// way a browser parser treats an unterminated `<script>`. Orphaned closing
/// tags are dropped.
fn strip_element(text: &str, tag: &str) -> String {
    // ASCII lowercasing leaves byte offsets aligned with `text`.
    let lower = text.to_ascii_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}");
    let is_void = VOID_ELEMENTS.contains(&tag);

    let mut result = String::with_capacity(text.len());
    let mut depth: usize = 0;
    let mut keep_from = 0;
    let mut pos = 0;

    while let Some(found) = lower.get(pos..).and_then(|rest| rest.find('<')) {
        let at = pos.saturating_add(found);

        if let Some(end) = tag_end(&lower, at, &open) {
            if depth == 0 {
                result.push_str(text.get(keep_from..at).unwrap_or_default());
            }
            let self_closing = is_void || lower.get(at..end).is_some_and(|t| t.ends_with("/>"));
            if !self_closing {
                depth = depth.saturating_add(1);
            }
            pos = end;
            if depth == 0 {
                keep_from = end;
            }
            continue;
        }

        if let Some(end) = tag_end(&lower, at, &close) {
            if depth == 0 {
                result.push_str(text.get(keep_from..at).unwrap_or_default());
            } else {
                depth = depth.saturating_sub(1);
            }
            pos = end;
            if depth == 0 {
                keep_from = end;
            }
            continue;
        }

        pos = at.saturating_add(1);
    }

    if depth == 0 {
        result.push_str(text.get(keep_from..).unwrap_or_default());
    }
    result
}

/// If a tag named exactly `prefix` (e.g. `<script`, `</script`) starts at `at`,
/// returns the offset just past its `>`; a tag cut off by end of input runs to
/// the end.
fn tag_end(lower: &str, at: usize, prefix: &str) -> Option<usize> {
    let after_name = lower.get(at..)?.strip_prefix(prefix)?;
    let whole_name = after_name
        .chars()
        .next()
        .is_none_or(|c| c.is_ascii_whitespace() || c == '>' || c == '/');
    if !whole_name {
        return None;
    }
    Some(scan_tag(lower, at.saturating_add(prefix.len())).1)
}

/// One attribute inside a tag, as byte offsets into the markup.
struct Attribute {
    /// Leading separators through the end of the value.
    span: Range<usize>,
    name: Range<usize>,
}

const fn is_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'/' | b'>' | b'=')
}

fn skip_while(bytes: &[u8], mut pos: usize, pred: impl Fn(u8) -> bool) -> usize {
    while bytes.get(pos).copied().is_some_and(&pred) {
        pos = pos.saturating_add(1);
    }
    pos
}

/// Tokenizes the attributes of a tag whose name ends at `from`.
///
/// Follows the browser tokenizer: whitespace and `/` both separate
/// attributes, and a `>` inside a quoted value does not close the tag.
/// Returns the attributes and the offset just past the closing `>`, or the
/// end of input for an unterminated tag.
fn scan_tag(text: &str, from: usize) -> (Vec<Attribute>, usize) {
    let bytes = text.as_bytes();
    let mut attributes = Vec::new();
    let mut pos = from;
    loop {
        let separator = pos;
        pos = skip_while(bytes, pos, |b| b.is_ascii_whitespace() || b == b'/');
        match bytes.get(pos).copied() {
            None => return (attributes, text.len()),
            Some(b'>') => return (attributes, pos.saturating_add(1)),
            Some(_) => {},
        }

        // The first name character may be `=`.
        let name_start = pos;
        pos = skip_while(bytes, pos.saturating_add(1), |b| !is_name_end(b));
        let name = name_start..pos;

        let equals = skip_while(bytes, pos, |b| b.is_ascii_whitespace());
        if bytes.get(equals) == Some(&b'=') {
            pos = skip_while(bytes, equals.saturating_add(1), |b| b.is_ascii_whitespace());
            match bytes.get(pos).copied() {
                Some(quote @ (b'"' | b'\'')) => {
                    let value_start = pos.saturating_add(1);
                    pos = text
                        .get(value_start..)
                        .and_then(|rest| rest.find(char::from(quote)))
                        .map_or(text.len(), |close| value_start.saturating_add(close).saturating_add(1));
                },
                _ => pos = skip_while(bytes, pos, |b| !b.is_ascii_whitespace() && b != b'>'),
            }
        }
        attributes.push(Attribute { span: separator..pos, name });
    }
}

fn is_denied(text: &str, attribute: &Attribute) -> bool {
    text.get(attribute.name.clone())
        .is_some_and(|name| DENIED_ATTRIBUTES.iter().any(|denied| denied.eq_ignore_ascii_case(name)))
}

fn strip_denied_attributes(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut result = String::with_capacity(text.len());
    let mut keep_from = 0;
    let mut pos = 0;

    while let Some(found) = text.get(pos..).and_then(|rest| rest.find('<')) {
        let name_start = pos.saturating_add(found).saturating_add(1);
        if !bytes.get(name_start).is_some_and(u8::is_ascii_alphabetic) {
            pos = name_start;
            continue;
        }
        let name_end = skip_while(bytes, name_start, |b| !is_name_end(b));
        let (attributes, end) = scan_tag(text, name_end);
        for attribute in attributes.iter().filter(|attribute| is_denied(text, attribute)) {
            result.push_str(text.get(keep_from..attribute.span.start).unwrap_or_default());
            keep_from = attribute.span.end;
        }
        pos = end;
    }

    result.push_str(text.get(keep_from..).unwrap_or_default());
    result
}

/// Tags that separate words when rendered.
#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static BLOCK_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(?:p|div|br|li|ul|ol|tr|td|th|h[1-6]|blockquote|pre|hr)\b[^<>]*>").unwrap()
});

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static ANY_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|</?[A-Za-z][^<>]*>").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Plain-text rendition of markup, for previews and truncation.
///
/// Denied elements are dropped with their content, remaining tags removed,
/// common entities decoded and whitespace collapsed.
#[must_use]
pub fn strip_tags(markup: &str) -> String {
    let sanitized = DenylistSanitizer.sanitize(markup);
    let spaced = BLOCK_TAG_REGEX.replace_all(&sanitized, " ");
    let text = ANY_TAG_REGEX.replace_all(&spaced, "");
    let decoded = decode_entities(&text);
    WHITESPACE_REGEX.replace_all(decoded.trim(), " ").into_owned()
}

fn decode_entities(text: &str) -> String {
    // `&amp;` last so `&amp;lt;` decodes to the literal `&lt;`.
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
