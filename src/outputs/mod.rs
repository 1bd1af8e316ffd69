//! Output generation for the clipping report.
//!
//! # Submodules
//!
//! - [`text`]: Renders the report as `[SOURCE] title` / link line pairs and
//!   writes `clipping_raw_output.txt`
//! - [`json`]: Writes the same report as structured JSON for downstream tools
//!
//! Both writers overwrite their target on every run.

pub mod json;
pub mod text;
