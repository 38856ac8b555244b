use std::fmt;
use std::hash::Hash;

use crate::MarkupSanitizer;

/// A displayable unit of list data.
///
/// The engine treats items as opaque: it never reorders or dedupes them and
/// only looks at [`ListItem::key`] to flag duplicate keys.
pub trait ListItem: Clone + Send + Sync + 'static {
    /// Stable unique identifier of the item.
    type Key: Eq + Hash + Clone + fmt::Debug + Send + Sync;

    fn key(&self) -> Self::Key;

    /// Sanitizes any rich-text fields in place before the item is stored.
    ///
    /// Items without server-supplied markup keep the default no-op.
    fn sanitize_content(&mut self, _sanitizer: &dyn MarkupSanitizer) {}
}
