//! Report rendering and persistence.

pub mod json;
pub mod text;

use std::fs;
use std::io::Write;

use tracing::info;

pub use json::to_pretty_json;
pub use text::TextRenderer;

use crate::config::{ReportConfig, ReportFormat, ReportTarget};
use crate::error::{DriverError, DriverResult};
use crate::workload::QueryReport;

/// Render `reports` in the configured format.
pub fn render(reports: &[QueryReport], format: ReportFormat, color: bool) -> DriverResult<String> {
    match format {
        ReportFormat::Json => to_pretty_json(reports),
        ReportFormat::Txt => Ok(TextRenderer::new(color).render(reports)),
    }
}

/// Render and deliver `reports` to the configured target.
///
/// Stdout output is written to `out`; file output goes to the configured
/// path, uncolored.
pub fn emit<W: Write>(reports: &[QueryReport], config: &ReportConfig, out: &mut W) -> DriverResult<()> {
    match config.target {
        ReportTarget::Stdout => {
            let rendered = render(reports, config.format, true)?;
            writeln!(out, "{}", rendered).map_err(|e| DriverError::io("<stdout>", e))
        }
        ReportTarget::File => {
            let path = config.path.as_ref().ok_or(DriverError::MissingOutputPath)?;
            let rendered = render(reports, config.format, false)?;
            fs::write(path, rendered).map_err(|e| DriverError::io(path, e))?;
            info!(path = %path.display(), "report written");
            Ok(())
        }
    }
}
