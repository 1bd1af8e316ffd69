//! The source registry: which agency pages are polled, and in what order.
//!
//! The built-in registry lists the four Sisema agencies. A YAML file can
//! replace it at startup:
//!
//! ```yaml
//! sources:
//!   - name: SEMAD
//!     url: https://semad.mg.gov.br/noticias
//!   - name: IEF
//!     url: https://ief.mg.gov.br/noticias
//! ```
//!
//! Registry order is report order.

use crate::models::Source;
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};
use url::Url;

const DEFAULT_SOURCES: [(&str, &str); 4] = [
    ("SEMAD", "https://semad.mg.gov.br/noticias"),
    ("IEF", "https://ief.mg.gov.br/noticias"),
    ("FEAM", "https://feam.br/noticias"),
    ("IGAM", "https://igam.mg.gov.br/noticias"),
];

/// Shape of a sources YAML file.
#[derive(Debug, Deserialize)]
struct SourcesFile {
    sources: Vec<Source>,
}

/// A registry entry that cannot be polled.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid source '{name}': {reason}")]
pub struct InvalidSource {
    pub name: String,
    pub reason: String,
}

/// The built-in Sisema registry.
pub fn default_sources() -> Vec<Source> {
    DEFAULT_SOURCES
        .iter()
        .map(|(name, url)| Source::new(*name, *url))
        .collect()
}

/// Load the registry from `path`, or fall back to [`default_sources`].
///
/// # Arguments
///
/// * `path` - Optional YAML sources file; `None` selects the built-in agencies
///
/// # Returns
///
/// The validated sources in file order.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The YAML does not have a `sources` list of `{name, url}` entries
/// - Any entry fails [`validate_sources`]
#[instrument(level = "info")]
pub async fn load_sources(path: Option<&Path>) -> Result<Vec<Source>, Box<dyn Error>> {
    let sources = match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await?;
            let sources = parse_sources(&raw)?;
            info!(path = %path.display(), count = sources.len(), "Loaded sources file");
            sources
        }
        None => default_sources(),
    };

    validate_sources(&sources)?;
    Ok(sources)
}

/// Parse a sources YAML document.
pub fn parse_sources(raw: &str) -> Result<Vec<Source>, Box<dyn Error>> {
    let file: SourcesFile = serde_yaml::from_str(raw)?;
    Ok(file.sources)
}

/// Check that every source has a name and an absolute http(s) URL with a host.
pub fn validate_sources(sources: &[Source]) -> Result<(), InvalidSource> {
    for source in sources {
        let invalid = |reason: String| InvalidSource {
            name: source.name.clone(),
            reason,
        };

        if source.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }

        let url = Url::parse(&source.url).map_err(|e| invalid(format!("url '{}': {e}", source.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().is_none() {
            return Err(invalid(format!("url '{}' has no host", source.url)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sources_order() {
        let names: Vec<String> = default_sources().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["SEMAD", "IEF", "FEAM", "IGAM"]);
        assert!(validate_sources(&default_sources()).is_ok());
    }

    #[test]
    fn test_parse_sources_yaml() {
        let yaml = r#"
sources:
  - name: SEMAD
    url: https://semad.example/noticias
  - name: IGAM
    url: http://igam.example:8080/noticias
"#;
        let sources = parse_sources(yaml).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0], Source::new("SEMAD", "https://semad.example/noticias"));
        assert_eq!(sources[1].name, "IGAM");
        assert!(validate_sources(&sources).is_ok());
    }

    #[test]
    fn test_parse_sources_rejects_missing_key() {
        assert!(parse_sources("- name: SEMAD\n").is_err());
    }

    #[test]
    fn test_validate_rejects_relative_url() {
        let err = validate_sources(&[Source::new("IEF", "/noticias")]).unwrap_err();
        assert_eq!(err.name, "IEF");
    }

    #[test]
    fn test_validate_rejects_non_http_scheme() {
        let err = validate_sources(&[Source::new("FEAM", "ftp://feam.br/noticias")]).unwrap_err();
        assert!(err.reason.contains("ftp"));
    }

    #[test]
    fn test_invalid_source_message() {
        let err = validate_sources(&[Source::new("IEF", "/noticias")]).unwrap_err();
        assert!(err.to_string().starts_with("invalid source 'IEF': url '/noticias'"));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        assert!(validate_sources(&[Source::new(" ", "https://feam.br/noticias")]).is_err());
    }

    #[tokio::test]
    async fn test_load_sources_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.yaml");
        std::fs::write(&path, "sources:\n  - name: IEF\n    url: https://ief.example/noticias\n").unwrap();

        let sources = load_sources(Some(path.as_path())).await.unwrap();
        assert_eq!(sources, vec![Source::new("IEF", "https://ief.example/noticias")]);
    }

    #[tokio::test]
    async fn test_load_sources_defaults_without_path() {
        let sources = load_sources(None).await.unwrap();
        assert_eq!(sources, default_sources());
    }

    #[tokio::test]
    async fn test_load_sources_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_sources(Some(dir.path().join("nope.yaml").as_path())).await.is_err());
    }
}
