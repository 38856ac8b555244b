use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use incr_list_core::{window, Generation, Query, Window};
use incr_list_engine::{
    EngineConfig, FetchOutcome, InMemoryFetcher, ListEngine, ListStatus, PageFetchCoordinator,
    PageFetcher, RenderOutcome,
};
use incr_list_remote::HttpPageFetcher;
use serde::Serialize;

use super::sanitize::sanitizer;
use crate::job::{JobPost, RowView};

const API_TOKEN_ENV: &str = "INCR_LIST_API_TOKEN";

#[derive(Args)]
pub(crate) struct SimulateArgs {
    /// Local JSON array of job postings
    #[arg(long, conflicts_with = "url", required_unless_present = "url")]
    data: Option<PathBuf>,
    /// Listing endpoint answering `?page=&page_size=&search=` requests
    #[arg(long)]
    url: Option<String>,
    #[arg(short, long, default_value = "")]
    search: String,
    /// Exact-match filter as key=value; repeatable
    #[arg(short, long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,
    /// Pages to load: the first page plus up to N-1 load-more calls
    #[arg(short, long, default_value = "1")]
    pages: u32,
    #[arg(long, default_value = "0")]
    scroll: f64,
    #[arg(short = 'H', long, default_value = "600")]
    height: f64,
    /// Sanitize descriptions with the allowlist sanitizer
    #[arg(long)]
    allowlist: bool,
}

impl SimulateArgs {
    fn query(&self) -> Query {
        self.filters
            .iter()
            .fold(Query::new().with_search(self.search.clone()), |query, (key, value)| {
                query.with_filter(key.clone(), value.clone())
            })
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (key, value) =
        raw.split_once('=').ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty filter name in '{raw}'"));
    }
    Ok((key.to_owned(), value.trim().to_owned()))
}

#[derive(Serialize)]
struct SimulationReport {
    query: Query,
    generation: Generation,
    outcomes: Vec<FetchOutcome>,
    total: u64,
    loaded: usize,
    page_number: u32,
    has_more: bool,
    duplicate_keys: usize,
    status: ListStatus,
    window: Window,
    render: RenderOutcome<RowView>,
}

pub(crate) async fn run_simulate(args: SimulateArgs, config: &EngineConfig) -> Result<()> {
    let report = if let Some(url) = &args.url {
        let mut fetcher = HttpPageFetcher::<JobPost>::new(url)?;
        if let Ok(token) = std::env::var(API_TOKEN_ENV) {
            fetcher = fetcher.with_bearer_token(token);
        }
        simulate(fetcher, &args, config).await?
    } else {
        let path = args.data.as_ref().context("either --data or --url is required")?;
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let jobs: Vec<JobPost> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {} as a JSON array of jobs", path.display()))?;
        simulate(InMemoryFetcher::new(jobs, JobPost::matches), &args, config).await?
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    if let ListStatus::InitialError { reason } = &report.status {
        anyhow::bail!("first page failed: {reason}");
    }
    Ok(())
}

async fn simulate<F>(fetcher: F, args: &SimulateArgs, config: &EngineConfig) -> Result<SimulationReport>
where
    F: PageFetcher<Item = JobPost> + 'static,
{
    let coordinator = Arc::new(
        PageFetchCoordinator::new(fetcher, config.page_size()?)
            .with_sanitizer(Arc::from(sanitizer(args.allowlist)))
            .with_fetch_timeout(config.fetch_timeout()),
    );
    let engine = ListEngine::from_coordinator(coordinator, config);

    let query = args.query();
    let mut outcomes = vec![engine.refresh(query.clone()).await];
    for _ in 1..args.pages {
        match engine.load_more().await {
            Some(outcome) => outcomes.push(outcome),
            None => break,
        }
    }

    let viewport = config.viewport(args.scroll, args.height)?;
    let preview_length = config.preview_length;
    let render =
        engine.render_visible(&viewport, |job, index| Ok(RowView::render(job, index, preview_length)));

    let report = engine.coordinator().with_state(|state| SimulationReport {
        query,
        generation: state.generation,
        outcomes,
        total: state.total,
        loaded: state.items.len(),
        page_number: state.page_number,
        has_more: state.has_more,
        duplicate_keys: state.duplicate_keys,
        status: state.status(),
        window: window(&viewport, state.items.len()),
        render,
    });
    tracing::info!(loaded = report.loaded, total = report.total, "simulation finished");
    engine.shutdown();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter("location=Remote"), Ok(("location".to_owned(), "Remote".to_owned())));
        assert_eq!(parse_filter(" company = Acme "), Ok(("company".to_owned(), "Acme".to_owned())));
        assert!(parse_filter("location").is_err());
        assert!(parse_filter("=Remote").is_err());
    }
}
