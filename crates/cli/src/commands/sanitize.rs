use std::io::Read;

use anyhow::Result;
use incr_list_core::{
    strip_tags, truncate_preview, AllowlistSanitizer, DenylistSanitizer, MarkupSanitizer,
};

pub(crate) fn sanitizer(allowlist: bool) -> Box<dyn MarkupSanitizer> {
    if allowlist {
        Box::new(AllowlistSanitizer::for_rich_text())
    } else {
        Box::new(DenylistSanitizer)
    }
}

pub(crate) fn run_sanitize(allowlist: bool, truncate: Option<usize>) -> Result<()> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    let sanitized = sanitizer(allowlist).sanitize(&input);
    match truncate {
        Some(max_length) => println!("{}", truncate_preview(&strip_tags(&sanitized), max_length)),
        None => println!("{sanitized}"),
    }
    Ok(())
}
