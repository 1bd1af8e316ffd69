//! Plain-text clipping output.
//!
//! # Format
//!
//! ```text
//! [SEMAD] Governo publica nova deliberação
//! https://semad.mg.gov.br/noticias/123
//! *-- Falha na IEF. Erro de conexão/estrutura. --*
//! [FEAM] Inventário de resíduos
//! https://feam.br/noticias/456
//! ```
//!
//! Placeholders have no link, so they render as a single line without the
//! `[SOURCE]` prefix.

use crate::models::Report;
use crate::utils::ensure_parent_dir;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Reference output filename.
pub const DEFAULT_OUTPUT_PATH: &str = "clipping_raw_output.txt";

/// Render `report` as newline-separated lines, trimmed at both ends.
pub fn render(report: &Report) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(report.items.len() * 2);
    for item in &report.items {
        if item.link.is_empty() {
            lines.push(item.title.clone());
        } else {
            lines.push(format!("[{}] {}", item.source, item.title));
            lines.push(item.link.clone());
        }
    }
    lines.join("\n").trim().to_string()
}

/// Write the rendered clipping to `path`, replacing any previous content.
///
/// Missing parent directories are created.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_clipping(path: &Path, content: &str) -> Result<(), Box<dyn Error>> {
    ensure_parent_dir(path).await?;
    fs::write(path, content).await?;
    info!(bytes = content.len(), "Wrote clipping");
    Ok(())
}
