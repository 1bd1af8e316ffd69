//! # Sisema Clipping
//!
//! Collects the latest headlines published on the news pages of the Minas
//! Gerais environmental agencies (SEMAD, IEF, FEAM and IGAM) into a flat text
//! clipping meant for a scheduled reporting job.
//!
//! ## Usage
//!
//! ```sh
//! sisema_clipping -o clipping_raw_output.txt
//! ```
//!
//! ## Architecture
//!
//! 1. **Registry**: Load the ordered list of sources
//! 2. **Fetching**: One GET per source, bounded by a timeout, failures captured
//! 3. **Extraction**: Up to 5 headline/link pairs per page via a fixed selector
//! 4. **Aggregation**: Outcomes reassembled in registry order, placeholders for failures
//! 5. **Output**: Text clipping (and optionally JSON) written to disk
//!
//! A run always produces a clipping, even when every source fails.

use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod cli;
mod decode;
mod extract;
mod fetch;
mod models;
mod outputs;
mod pipeline;
mod sources;
mod utils;

use cli::Cli;
use fetch::HttpFetcher;
use models::Report;
use outputs::{json, text};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("sisema_clipping starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let sources = match sources::load_sources(args.sources.as_deref()).await {
        Ok(sources) => sources,
        Err(e) => {
            error!(error = %e, "Could not load sources");
            return Err(e);
        }
    };
    info!(
        count = sources.len(),
        names = %sources.iter().map(|s| s.name.as_str()).join(", "),
        "Source registry ready"
    );

    let report = match HttpFetcher::new() {
        Ok(fetcher) => pipeline::run(&sources, &fetcher, args.run_options()).await,
        Err(e) => {
            error!(error = %e, "Could not build HTTP client; every source is marked as failed");
            aggregate::fail_all(&sources, &format!("http client error: {e}"))
        }
    };

    let per_source = report.items.iter().counts_by(|item| item.source.as_str());
    for source in &sources {
        debug!(source = %source.name, entries = per_source.get(source.name.as_str()).copied().unwrap_or(0), "Report entries");
    }

    if report.is_empty() {
        warn!("No headlines found on any source");
    }

    let clipping = write_outputs(&report, &args.output, args.json_output.as_deref()).await?;

    if args.print {
        println!("{clipping}");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        items = report.items.len(),
        failed_sources = report.failed_sources(),
        "Execution complete"
    );

    Ok(())
}

/// Render `report` and write the text clipping, plus the JSON report if asked.
///
/// # Arguments
///
/// * `report` - The aggregated run output
/// * `output` - Path of the plain-text clipping
/// * `json_output` - Optional path of the JSON report
///
/// # Returns
///
/// The rendered clipping, or the first write error.
async fn write_outputs(
    report: &Report,
    output: &Path,
    json_output: Option<&Path>,
) -> Result<String, Box<dyn Error>> {
    let clipping = text::render(report);
    if let Err(e) = text::write_clipping(output, &clipping).await {
        error!(path = %output.display(), error = %e, "Failed writing clipping");
        return Err(e);
    }
    info!(path = %output.display(), "Clipping saved");

    if let Some(json_path) = json_output {
        if let Err(e) = json::write_report(report, json_path).await {
            error!(path = %json_path.display(), error = %e, "Failed writing JSON report");
            return Err(e);
        }
    }

    Ok(clipping)
}
