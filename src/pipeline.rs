//! The clipping run: fetch and extract every source, then aggregate.
//!
//! Each source is an independent future (fetch, then extract); at most
//! `concurrency` of them are in flight. Completion order does not matter,
//! outcomes are tagged with their registry index and reordered by
//! [`aggregate`].

use crate::aggregate::{SourceOutcome, aggregate, harvest};
use crate::extract::LinkResolution;
use crate::fetch::{DEFAULT_TIMEOUT, Fetch};
use crate::models::{Report, Source};
use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Knobs for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum number of sources fetched at once. `1` is fully sequential.
    pub concurrency: usize,
    pub links: LinkResolution,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            concurrency: 4,
            links: LinkResolution::Concat,
        }
    }
}

/// Fetch and extract every source and return the aggregated report.
///
/// # Arguments
///
/// * `sources` - The registry, in report order
/// * `fetcher` - Retrieves each listing page
/// * `options` - Timeout, concurrency and link mode
///
/// # Returns
///
/// The [`Report`] in registry order. This never fails: unreachable sources
/// become placeholders, and a slow source only delays its own slot.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn run<F: Fetch>(sources: &[Source], fetcher: &F, options: RunOptions) -> Report {
    let t0 = Instant::now();
    let concurrency = options.concurrency.max(1);

    let outcomes: Vec<(usize, SourceOutcome)> = stream::iter(sources.iter().enumerate())
        .map(|(index, source)| async move {
            let result = fetcher.fetch(source, options.timeout).await;
            let outcome = harvest(source, result, options.links);
            match &outcome {
                SourceOutcome::Extracted(items) => {
                    info!(source = %source.name, count = items.len(), "Extracted headlines");
                }
                SourceOutcome::Failed { reason } => {
                    warn!(source = %source.name, %reason, "Failed to fetch news");
                }
            }
            (index, outcome)
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let report = aggregate(sources, outcomes);
    info!(
        items = report.items.len(),
        failed_sources = report.failed_sources(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Clipping run complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchResult;
    use crate::outputs::text;
    use std::collections::HashMap;

    /// Canned fetcher keyed by URL, with an optional per-URL delay.
    #[derive(Default)]
    struct FakeFetcher {
        pages: HashMap<String, (FetchResult, Duration)>,
    }

    impl FakeFetcher {
        fn page(mut self, url: &str, html: &str, delay: Duration) -> Self {
            let result = FetchResult::Success {
                body: html.as_bytes().to_vec(),
                charset: Some("utf-8".to_string()),
            };
            self.pages.insert(url.to_string(), (result, delay));
            self
        }

        fn fail(mut self, url: &str, reason: &str) -> Self {
            self.pages
                .insert(url.to_string(), (FetchResult::failure(reason), Duration::ZERO));
            self
        }
    }

    impl Fetch for FakeFetcher {
        async fn fetch(&self, source: &Source, _timeout: Duration) -> FetchResult {
            match self.pages.get(&source.url) {
                Some((result, delay)) => {
                    tokio::time::sleep(*delay).await;
                    result.clone()
                }
                None => FetchResult::failure("connection error: unknown host"),
            }
        }
    }

    fn anchors(prefix: &str, n: usize) -> String {
        let links: String = (1..=n)
            .map(|i| format!("<a href=\"/{prefix}/{i}\">{prefix} {i}</a>"))
            .collect();
        format!("<ul class=\"asset-list\">{links}</ul>")
    }

    #[tokio::test]
    async fn test_run_preserves_registry_order_despite_completion_order() {
        let sources = vec![
            Source::new("A", "https://a.example/noticias"),
            Source::new("B", "https://b.example/noticias"),
            Source::new("C", "https://c.example/noticias"),
            Source::new("D", "https://d.example/noticias"),
        ];
        let fetcher = FakeFetcher::default()
            .page("https://a.example/noticias", &anchors("a", 2), Duration::from_millis(80))
            .fail("https://b.example/noticias", "timeout")
            .page("https://c.example/noticias", &anchors("c", 1), Duration::ZERO);

        let report = run(&sources, &fetcher, RunOptions::default()).await;

        let sources: Vec<&str> = report.items.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, vec!["A", "A", "B", "C", "D"]);
        assert!(report.items[2].is_placeholder());
        assert!(report.items[4].is_placeholder());
        assert_eq!(report.items[0].link, "https://a.example/a/1");
    }

    #[tokio::test]
    async fn test_run_sequential_matches_concurrent() {
        let sources = vec![
            Source::new("A", "https://a.example/noticias"),
            Source::new("B", "https://b.example/noticias"),
        ];
        let fetcher = FakeFetcher::default()
            .page("https://a.example/noticias", &anchors("a", 7), Duration::from_millis(20))
            .page("https://b.example/noticias", &anchors("b", 3), Duration::ZERO);

        let sequential = RunOptions {
            concurrency: 1,
            ..RunOptions::default()
        };
        let a = run(&sources, &fetcher, sequential).await;
        let b = run(&sources, &fetcher, RunOptions::default()).await;
        assert_eq!(a, b);
        assert_eq!(a.items.len(), 8);
    }

    #[tokio::test]
    async fn test_run_zero_concurrency_still_runs() {
        let sources = vec![Source::new("A", "https://a.example/noticias")];
        let fetcher = FakeFetcher::default().page("https://a.example/noticias", &anchors("a", 1), Duration::ZERO);
        let options = RunOptions {
            concurrency: 0,
            ..RunOptions::default()
        };
        assert_eq!(run(&sources, &fetcher, options).await.items.len(), 1);
    }

    #[tokio::test]
    async fn test_run_empty_registry() {
        let report = run(&[], &FakeFetcher::default(), RunOptions::default()).await;
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_run_and_render_single_source() {
        let sources = vec![Source::new("SEMAD", "https://semad.example/noticias")];
        let links: String = (1..=7)
            .map(|i| format!("<a href=\"/n/{i}\">Manchete {i}</a>"))
            .collect();
        let html = format!("<div class=\"asset-full-content\">{links}</div>");
        let fetcher = FakeFetcher::default().page("https://semad.example/noticias", &html, Duration::ZERO);

        let report = run(&sources, &fetcher, RunOptions::default()).await;
        let clipping = text::render(&report);
        let lines: Vec<&str> = clipping.lines().collect();

        assert_eq!(lines.len(), 10);
        for (i, pair) in lines.chunks(2).enumerate() {
            assert_eq!(pair[0], format!("[SEMAD] Manchete {}", i + 1));
            assert!(pair[1].starts_with("https://semad.example/n/"));
        }
    }

    #[tokio::test]
    async fn test_run_and_render_failed_source() {
        let sources = vec![Source::new("SEMAD", "https://semad.example/noticias")];
        let fetcher = FakeFetcher::default().fail("https://semad.example/noticias", "timeout: operation timed out");

        let report = run(&sources, &fetcher, RunOptions::default()).await;
        let clipping = text::render(&report);

        assert_eq!(clipping.lines().count(), 1);
        assert!(clipping.contains("SEMAD"));
        assert!(!clipping.contains("[SEMAD]"));
    }
}
