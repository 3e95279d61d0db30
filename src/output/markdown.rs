//! Markdown master document generation
//!
//! The master document collects every report in one human-readable file,
//! newest first, so the latest findings are always at the top.

use crate::analysis::{AnalysisReport, CategoryScore};
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Title of the master document
pub const DOCUMENT_TITLE: &str = "ESG Master Report";

/// Writes the master document for `reports` (already ordered newest first)
///
/// # Arguments
///
/// * `reports` - The reports to include, newest first
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the document
/// * `Err(OutputError)` - Failed to write the document
pub fn write_report_document(reports: &[AnalysisReport], output_path: &Path) -> OutputResult<()> {
    let markdown = format_report_document(reports);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats reports as the master document
pub fn format_report_document(reports: &[AnalysisReport]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", DOCUMENT_TITLE));

    if reports.is_empty() {
        md.push_str("_No reports yet._\n");
        return md;
    }

    md.push_str(&format!("{} report(s), newest first.\n\n", reports.len()));

    for report in reports {
        md.push_str("---\n\n");
        format_report_section(report, &mut md);
    }

    md
}

fn format_report_section(report: &AnalysisReport, md: &mut String) {
    md.push_str(&format!("## {}\n\n", report.company_name));
    md.push_str(&format!("- **Report Date**: {}\n", report.timestamp));
    md.push_str(&format!("- **Target URL**: {}\n", report.url));
    md.push_str(&format!("- **Company**: {}\n", report.company_name));
    md.push_str(&format!(
        "- **Average Score**: {:.1}\n\n",
        report.average_score()
    ));

    md.push_str("### Summary\n\n");
    md.push_str(&format!("{}\n\n", report.summary));

    for (title, category) in report.pillars() {
        format_category(title, category, md);
    }
}

fn format_category(title: &str, category: &CategoryScore, md: &mut String) {
    md.push_str(&format!("### {} (Score: {})\n\n", title, category.score));
    md.push_str(&format!("**Assessment**: {}\n\n", category.assessment));
    md.push_str(&format!(
        "**Gaps**: {}\n\n",
        category.gaps.as_deref().unwrap_or("None")
    ));
}
