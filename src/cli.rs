//! Command-line interface definitions for Sisema Clipping.
//!
//! Every option can also be supplied through an environment variable, which
//! is how scheduled jobs usually configure the run.

use crate::extract::LinkResolution;
use crate::fetch::DEFAULT_TIMEOUT;
use crate::outputs::text::DEFAULT_OUTPUT_PATH;
use crate::pipeline::RunOptions;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for the clipping run.
///
/// # Examples
///
/// ```sh
/// # Built-in sources, writes ./clipping_raw_output.txt
/// sisema_clipping
///
/// # Custom sources and an extra JSON report
/// sisema_clipping -s sources.yaml -j out/clipping.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the plain-text clipping (overwritten on each run)
    #[arg(short, long, env = "CLIPPING_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// YAML file listing the sources to poll (defaults to the built-in Sisema agencies)
    #[arg(short, long, env = "CLIPPING_SOURCES")]
    pub sources: Option<PathBuf>,

    /// Also write the report as JSON to this path
    #[arg(short, long, env = "CLIPPING_JSON_OUTPUT")]
    pub json_output: Option<PathBuf>,

    /// Per-source request timeout in seconds
    #[arg(long, env = "CLIPPING_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs(),
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// How many sources to fetch at the same time (1 = sequential)
    #[arg(short, long, env = "CLIPPING_CONCURRENCY", default_value_t = 4,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub concurrency: u64,

    /// Resolve relative links against the full source URL instead of prefixing the site origin
    #[arg(long)]
    pub resolve_links: bool,

    /// Print the clipping to stdout after writing it
    #[arg(long)]
    pub print: bool,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            concurrency: usize::try_from(self.concurrency).unwrap_or(usize::MAX),
            links: if self.resolve_links {
                LinkResolution::Join
            } else {
                LinkResolution::Concat
            },
        }
    }
}
