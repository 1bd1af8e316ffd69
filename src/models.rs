//! Data models for sources, extracted headlines and the clipping report.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Source`]: One agency listing page that is polled each run
//! - [`NewsItem`]: A headline/link pair extracted from a source, or a failure placeholder
//! - [`Report`]: The ordered collection of items produced by a single run

use serde::{Deserialize, Serialize};

/// One agency news page polled by the clipping run.
///
/// Sources are defined once at startup (see [`crate::sources`]) and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Source {
    /// Short agency name used to tag report lines (e.g. `"SEMAD"`).
    pub name: String,
    /// Absolute URL of the agency's news listing.
    pub url: String,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A single report entry.
///
/// Regular entries always carry a non-empty title and an absolute link.
/// Failure placeholders carry an empty link, a marker title naming the
/// source, and the failure reason in [`NewsItem::failure`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsItem {
    /// Name of the [`Source`] this entry came from.
    pub source: String,
    /// Trimmed headline text, or the marker text for placeholders.
    pub title: String,
    /// Absolute URL of the news item; empty for placeholders.
    pub link: String,
    /// Why the source could not be read. Only set on placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl NewsItem {
    pub fn new(source: impl Into<String>, title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            link: link.into(),
            failure: None,
        }
    }

    /// Build the synthetic entry that stands in for a source whose fetch failed.
    ///
    /// The marker title already names the source, so the text reporter prints
    /// it without the usual `[SOURCE]` prefix.
    pub fn placeholder(source: &str, reason: impl Into<String>) -> Self {
        Self {
            source: source.to_string(),
            title: format!("*-- Falha na {source}. Erro de conexão/estrutura. --*"),
            link: String::new(),
            failure: Some(reason.into()),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.link.is_empty()
    }
}

/// The ordered output of one clipping run.
///
/// Items appear in source-registry order and, within a source, in document
/// order. A successful source contributes at most
/// [`crate::extract::MAX_ITEMS_PER_SOURCE`] items; a failed source contributes
/// exactly one placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Report {
    pub items: Vec<NewsItem>,
}

impl Report {
    /// Number of sources represented by a failure placeholder.
    pub fn failed_sources(&self) -> usize {
        self.items.iter().filter(|i| i.is_placeholder()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_names_source() {
        let item = NewsItem::placeholder("IEF", "timeout");
        assert_eq!(item.title, "*-- Falha na IEF. Erro de conexão/estrutura. --*");
        assert_eq!(item.link, "");
        assert_eq!(item.failure.as_deref(), Some("timeout"));
        assert!(item.is_placeholder());
    }

    #[test]
    fn test_news_item_serialization_skips_missing_failure() {
        let item = NewsItem::new("SEMAD", "Título", "https://semad.mg.gov.br/n/1");
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("failure"));

        let back: NewsItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_report_failed_sources() {
        let report = Report {
            items: vec![
                NewsItem::new("SEMAD", "A", "https://a/1"),
                NewsItem::placeholder("IEF", "HTTP status 500"),
                NewsItem::new("FEAM", "B", "https://b/1"),
                NewsItem::placeholder("IGAM", "timeout"),
            ],
        };
        assert_eq!(report.failed_sources(), 2);
        assert!(!report.is_empty());
    }

    #[test]
    fn test_source_deserialization() {
        let yaml = "name: FEAM\nurl: https://feam.br/noticias\n";
        let source: Source = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(source, Source::new("FEAM", "https://feam.br/noticias"));
    }
}
