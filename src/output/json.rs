//! JSON export of analysis reports

use crate::analysis::AnalysisReport;
use crate::output::OutputResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `reports` to `output_path` as a pretty-printed JSON array
///
/// An empty slice still produces a valid (empty) array.
pub fn write_json_reports(reports: &[AnalysisReport], output_path: &Path) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, reports)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
