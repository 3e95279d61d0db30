//! Console reporting of runs and archive statistics

use crate::pipeline::RunSummary;
use crate::storage::ArchiveStatistics;

/// Widest URL shown in the results table before it is shortened
const URL_COLUMN_WIDTH: usize = 50;

/// Prints the outcome of one pipeline run to stdout
///
/// # Arguments
///
/// * `summary` - The run summary to display
pub fn print_run_summary(summary: &RunSummary) {
    println!("=== Run Summary ===\n");

    println!("Crawl:");
    println!("  Seed: {}", summary.seed_url);
    println!("  Pages crawled: {}", summary.pages_crawled);
    println!("  Render failures: {}", summary.crawl.render_failures);
    println!(
        "  Links found: {} ({} in scope, {} new)",
        summary.crawl.links_found, summary.crawl.links_offered, summary.crawl.links_accepted
    );
    println!("  Crawl time: {:.1}s", summary.crawl.elapsed.as_secs_f64());
    println!();

    println!("Analysis:");
    println!("  Pages analyzed: {}", summary.pages_analyzed);
    println!("  Skipped (thin content): {}", summary.pages_skipped);
    println!("  Failed: {}", summary.analysis_failures);
    println!();

    if summary.reports.is_empty() {
        println!("No reports produced.");
        return;
    }

    println!("{}", format_results_table(summary));
}

/// Formats the URL / company / average score table
pub fn format_results_table(summary: &RunSummary) -> String {
    let mut table = String::new();
    table.push_str(&format!(
        "{:<width$}  {:<30}  {:>15}\n",
        "URL",
        "Company",
        "ESG Score (Avg)",
        width = URL_COLUMN_WIDTH + 3
    ));
    table.push_str(&format!("{}\n", "-".repeat(URL_COLUMN_WIDTH + 3 + 2 + 30 + 2 + 15)));

    for report in &summary.reports {
        table.push_str(&format!(
            "{:<width$}  {:<30}  {:>15.1}\n",
            shorten(&report.url, URL_COLUMN_WIDTH),
            shorten(&report.company_name, 30),
            report.average_score(),
            width = URL_COLUMN_WIDTH + 3
        ));
    }

    table
}

/// Prints archive statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_archive_statistics(stats: &ArchiveStatistics) {
    println!("=== Archive Statistics ===\n");

    println!("Overview:");
    println!(
        "  Runs: {} ({} completed)",
        stats.total_runs, stats.completed_runs
    );
    println!("  Reports: {}", stats.total_reports);
    println!("  Distinct URLs: {}", stats.distinct_urls);
    println!();

    println!("Average Scores:");
    println!("  Environmental: {}", format_average(stats.average_environmental));
    println!("  Social: {}", format_average(stats.average_social));
    println!("  Governance: {}", format_average(stats.average_governance));
    println!();

    if let Some(run) = &stats.latest_run {
        println!("Latest Run:");
        println!("  ID: {}", run.id);
        println!("  Seed: {}", run.seed_url);
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        println!("  Status: {}", run.status.to_db_string());
        println!("  Config hash: {}", run.config_hash);
    }
}

fn format_average(average: Option<f64>) -> String {
    average.map_or_else(|| "n/a".to_string(), |value| format!("{:.1}", value))
}

/// Cuts `value` to `width` characters, marking the cut with "..."
fn shorten(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        format!("{}...", value.chars().take(width).collect::<String>())
    }
}
