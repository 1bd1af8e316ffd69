//! Single-attempt HTTP retrieval of a source's listing page.
//!
//! Every outcome, including transport errors, is folded into a [`FetchResult`]
//! so nothing propagates past this module. The [`Fetch`] trait is the seam
//! used by the pipeline; [`HttpFetcher`] is the `reqwest` implementation and
//! tests substitute canned fetchers.

use crate::decode::charset_from_content_type;
use crate::models::Source;
use crate::utils::truncate_for_log;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Reference per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Outcome of fetching one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// The server answered with a 2xx status.
    ///
    /// `charset` is the label from the `Content-Type` header, if any.
    Success { body: Vec<u8>, charset: Option<String> },
    /// Transport error, timeout or non-2xx status.
    Failure { reason: String },
}

impl FetchResult {
    pub fn failure(reason: impl Into<String>) -> Self {
        FetchResult::Failure {
            reason: reason.into(),
        }
    }
}

/// Something that can retrieve a source's listing page.
pub trait Fetch {
    /// Perform one GET of `source.url`, bounded by `timeout`.
    ///
    /// Implementations must not panic or return early with an error: every
    /// problem becomes [`FetchResult::Failure`].
    async fn fetch(&self, source: &Source, timeout: Duration) -> FetchResult;
}

/// [`Fetch`] implementation backed by a shared `reqwest` client.
///
/// Redirects are followed with reqwest's default policy; no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(source = %source.name, url = %source.url))]
    async fn fetch(&self, source: &Source, timeout: Duration) -> FetchResult {
        if timeout.is_zero() {
            debug!("Refusing to fetch with a zero timeout");
            return FetchResult::failure("invalid timeout: must be positive");
        }

        let t0 = Instant::now();
        let result = match self.client.get(&source.url).timeout(timeout).send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    FetchResult::failure(format!("HTTP status {status}"))
                } else {
                    let charset = response
                        .headers()
                        .get(CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .and_then(charset_from_content_type);
                    match response.bytes().await {
                        Ok(body) => FetchResult::Success {
                            body: body.to_vec(),
                            charset,
                        },
                        Err(e) => FetchResult::failure(describe_error("body error", &e)),
                    }
                }
            }
            Err(e) => FetchResult::failure(describe_error("request error", &e)),
        };

        let elapsed_ms = t0.elapsed().as_millis();
        match &result {
            FetchResult::Success { body, charset } => {
                debug!(elapsed_ms, bytes = body.len(), ?charset, "Fetched source page");
            }
            FetchResult::Failure { reason } => {
                debug!(elapsed_ms, reason = %truncate_for_log(reason, 300), "Source fetch failed");
            }
        }
        result
    }
}

/// Classify a reqwest error into a short reason string.
///
/// `fallback` names the class used when no more specific one applies.
fn describe_error(fallback: &str, e: &reqwest::Error) -> String {
    let class = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connection error"
    } else if e.is_redirect() {
        "redirect error"
    } else if e.is_builder() {
        "invalid request"
    } else if let Some(status) = e.status() {
        return format!("HTTP status {status}");
    } else {
        fallback
    };
    format!("{class}: {e}")
}
