//! Structured JSON output of the clipping report.
//!
//! # Output Structure
//!
//! ```json
//! {
//!   "generated_at": "2025-05-06T08:00:00-03:00",
//!   "item_count": 3,
//!   "failed_sources": 1,
//!   "items": [
//!     { "source": "SEMAD", "title": "...", "link": "https://..." },
//!     { "source": "IEF", "title": "*-- Falha na IEF. ... --*", "link": "", "failure": "timeout: ..." }
//!   ]
//! }
//! ```

use crate::models::{NewsItem, Report};
use crate::utils::ensure_parent_dir;
use chrono::Local;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    generated_at: String,
    item_count: usize,
    failed_sources: usize,
    items: &'a [NewsItem],
}

impl<'a> ReportDocument<'a> {
    fn new(report: &'a Report) -> Self {
        Self {
            generated_at: Local::now().to_rfc3339(),
            item_count: report.items.len(),
            failed_sources: report.failed_sources(),
            items: &report.items,
        }
    }
}

/// Serialize `report` to pretty JSON.
pub fn to_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ReportDocument::new(report))
}

/// Write `report` as JSON to `path`, replacing any previous file.
///
/// # Arguments
///
/// * `report` - The aggregated run output
/// * `path` - Target file; missing parent directories are created
///
/// # Returns
///
/// `Ok(())` on success, or an error if serialization, directory creation or
/// the write fails.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_report(report: &Report, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = to_json(report)?;

    if let Err(e) = ensure_parent_dir(path).await {
        error!(error = %e, "Failed to create JSON output dir");
        return Err(e);
    }

    fs::write(path, json).await?;
    info!(items = report.items.len(), "Wrote JSON report");
    Ok(())
}
