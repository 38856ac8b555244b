use anyhow::Result;
use incr_list_core::{window, Viewport};

pub(crate) fn run_window(
    count: usize,
    scroll: f64,
    height: f64,
    row_height: f64,
    overscan: usize,
) -> Result<()> {
    let viewport = Viewport::new(scroll, height, row_height, overscan)?;
    println!("{}", serde_json::to_string_pretty(&window(&viewport, count))?);
    Ok(())
}
