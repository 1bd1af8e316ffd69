//! Merging per-source outcomes into a single ordered [`Report`].
//!
//! Outcomes may arrive in any order (sources are fetched concurrently); they
//! are keyed by registry index and reassembled here so the report always
//! follows the registry.

use crate::extract::{LinkResolution, extract};
use crate::fetch::FetchResult;
use crate::models::{NewsItem, Report, Source};
use std::collections::HashMap;
use tracing::warn;

/// What one source contributed to the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// The page was fetched; possibly no headlines were found.
    Extracted(Vec<NewsItem>),
    /// The page could not be fetched.
    Failed { reason: String },
}

/// Turn one source's fetch result into an outcome, extracting on success.
pub fn harvest(source: &Source, result: FetchResult, links: LinkResolution) -> SourceOutcome {
    match result {
        FetchResult::Success { body, charset } => {
            SourceOutcome::Extracted(extract(source, &body, charset.as_deref(), links))
        }
        FetchResult::Failure { reason } => SourceOutcome::Failed { reason },
    }
}

/// Build the report from outcomes keyed by registry index.
///
/// Items of successful sources are appended as-is; each failed source gets
/// exactly one placeholder. A source with no outcome counts as failed. If an
/// index appears more than once the last outcome wins.
pub fn aggregate(sources: &[Source], outcomes: Vec<(usize, SourceOutcome)>) -> Report {
    let mut by_index: HashMap<usize, SourceOutcome> = outcomes.into_iter().collect();
    let mut items = Vec::new();

    for (index, source) in sources.iter().enumerate() {
        match by_index.remove(&index) {
            Some(SourceOutcome::Extracted(extracted)) => items.extend(extracted),
            Some(SourceOutcome::Failed { reason }) => {
                items.push(NewsItem::placeholder(&source.name, reason));
            }
            None => {
                warn!(source = %source.name, index, "No outcome recorded for source");
                items.push(NewsItem::placeholder(&source.name, "no outcome recorded"));
            }
        }
    }

    if !by_index.is_empty() {
        warn!(extra = by_index.len(), "Ignoring outcomes without a matching source");
    }

    Report { items }
}

/// A report in which every source failed for the same `reason`.
///
/// Used when no fetch can be attempted at all.
pub fn fail_all(sources: &[Source], reason: &str) -> Report {
    let outcomes = sources
        .iter()
        .enumerate()
        .map(|(index, _)| {
            let outcome = SourceOutcome::Failed {
                reason: reason.to_string(),
            };
            (index, outcome)
        })
        .collect();
    aggregate(sources, outcomes)
}
