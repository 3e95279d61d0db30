//! ESG Scout main entry point
//!
//! This is the command-line interface for crawling a company site and
//! assessing its ESG disclosures.

use anyhow::{bail, Context};
use clap::Parser;
use esg_scout::analysis::GeminiAnalyzer;
use esg_scout::config::{hash_config_text, load_config_with_hash, validate, Config};
use esg_scout::crawler::HttpRenderer;
use esg_scout::output::{export_document_from_archive, print_archive_statistics, print_run_summary};
use esg_scout::pipeline::Pipeline;
use esg_scout::storage::{open_archive, ReportStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// ESG Scout: crawl a site and assess its ESG disclosures
///
/// ESG Scout crawls a single site breadth-first from a seed URL, sends every
/// substantial page to a language model for Environmental, Social and
/// Governance analysis against EU regulations, and exports the reports as
/// JSON and an optional Markdown master document.
#[derive(Parser, Debug)]
#[command(name = "esg-scout")]
#[command(version)]
#[command(about = "Crawl a site and assess its ESG disclosures", long_about = None)]
struct Cli {
    /// Seed URL to crawl
    #[arg(
        value_name = "URL",
        required_unless_present_any = ["dry_run", "stats", "export_document"]
    )]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum link hops from the seed (overrides the config file)
    #[arg(short, long)]
    depth: Option<u32>,

    /// JSON output path (overrides the config file)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Markdown master document path (overrides the config file)
    #[arg(long, value_name = "FILE")]
    document: Option<PathBuf>,

    /// SQLite report archive path (overrides the config file)
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "export_document"])]
    dry_run: bool,

    /// Show statistics from the report archive and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_document"])]
    stats: bool,

    /// Regenerate the Markdown master document from the archive and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_document: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            (Config::default(), hash_config_text(""))
        }
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration after command-line overrides")?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, cli.url.as_deref());
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_document {
        handle_export_document(&config)?;
    } else {
        let Some(url) = cli.url.as_deref() else {
            bail!("A seed URL is required to crawl");
        };
        handle_crawl(config, config_hash, url).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("esg_scout=info,warn"),
            1 => EnvFilter::new("esg_scout=debug,info"),
            2 => EnvFilter::new("esg_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line flags on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(output) = &cli.output {
        config.output.json_path = output.display().to_string();
    }
    if let Some(document) = &cli.document {
        config.output.document_path = Some(document.display().to_string());
    }
    if let Some(database) = &cli.database {
        config.output.database_path = Some(database.display().to_string());
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, url: Option<&str>) {
    println!("=== ESG Scout Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Render timeout: {}ms", config.crawler.request_timeout);
    println!(
        "  Politeness delay: {}-{}ms",
        config.crawler.politeness_min, config.crawler.politeness_max
    );
    match config.crawler.session_timeout {
        Some(seconds) => println!("  Session timeout: {}s", seconds),
        None => println!("  Session timeout: none"),
    }
    if config.crawler.proxy_url.is_some() {
        println!("  Proxy: configured");
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nAnalyzer:");
    println!("  Model: {}", config.analyzer.model);
    println!("  Endpoint: {}", config.analyzer.endpoint);
    let key_state = match std::env::var(&config.analyzer.api_key_env) {
        Ok(key) if !key.trim().is_empty() => "set",
        _ => "NOT SET (pages will be crawled but not analyzed)",
    };
    println!("  API key ({}): {}", config.analyzer.api_key_env, key_state);
    println!("  Max attempts: {}", config.analyzer.max_attempts);
    println!(
        "  Backoff: {}ms base, up to {}ms jitter",
        config.analyzer.base_delay, config.analyzer.max_jitter
    );
    println!("  Input limit: {} chars", config.analyzer.max_input_chars);
    println!(
        "  Minimum content length: {} chars",
        config.analyzer.min_content_length
    );

    println!("\nOutput:");
    println!("  JSON: {}", config.output.json_path);
    println!(
        "  Document: {}",
        config.output.document_path.as_deref().unwrap_or("none")
    );
    println!(
        "  Database: {}",
        config.output.database_path.as_deref().unwrap_or("none")
    );

    println!("\n✓ Configuration is valid");
    if let Some(url) = url {
        match esg_scout::normalize_url(url) {
            Ok(seed) => println!(
                "✓ Would crawl {} to depth {}",
                seed, config.crawler.max_depth
            ),
            Err(e) => println!("✗ Seed URL is not crawlable: {}", e),
        }
    }
}

fn require_database(config: &Config) -> anyhow::Result<&Path> {
    match config.output.database_path.as_deref() {
        Some(path) => Ok(Path::new(path)),
        None => bail!("No report archive configured (set output.database-path or pass --database)"),
    }
}

/// Handles the --stats mode: shows statistics from the archive
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let database = require_database(config)?;
    println!("Database: {}\n", database.display());

    let archive = open_archive(database)
        .with_context(|| format!("Failed to open archive {}", database.display()))?;
    let stats = archive.statistics()?;

    print_archive_statistics(&stats);

    Ok(())
}

/// Handles the --export-document mode: regenerates the master document
fn handle_export_document(config: &Config) -> anyhow::Result<()> {
    let database = require_database(config)?;
    let Some(document) = config.output.document_path.as_deref() else {
        bail!("No document path configured (set output.document-path or pass --document)");
    };

    println!("=== Exporting ESG Master Report ===\n");
    println!("Database: {}", database.display());
    println!("Output: {}", document);
    println!();

    let archive = open_archive(database)
        .with_context(|| format!("Failed to open archive {}", database.display()))?;
    let count = export_document_from_archive(&archive, Path::new(document))?;

    println!("✓ {} report(s) exported to: {}", count, document);

    Ok(())
}

/// Handles the main crawl-and-analyze operation
async fn handle_crawl(config: Config, config_hash: String, url: &str) -> anyhow::Result<()> {
    tracing::info!("Target: {} (depth {})", url, config.crawler.max_depth);

    let renderer = HttpRenderer::from_config(&config.crawler, &config.user_agent)
        .context("Failed to build HTTP client")?;

    let api_key = std::env::var(&config.analyzer.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty());
    let database = config.output.database_path.clone();
    let analyzer_config = config.analyzer.clone();

    let mut pipeline = Pipeline::new(config, Arc::new(renderer));

    match api_key {
        Some(key) => {
            let analyzer = GeminiAnalyzer::from_config(&analyzer_config, key)
                .context("Failed to build analyzer client")?;
            pipeline = pipeline.with_analyzer(Arc::new(analyzer));
        }
        None => tracing::warn!(
            "{} not set. Extraction will be skipped.",
            analyzer_config.api_key_env
        ),
    }

    if let Some(database) = database {
        let archive = open_archive(Path::new(&database))
            .with_context(|| format!("Failed to open archive {}", database))?;
        pipeline = pipeline.with_archive(Box::new(archive), config_hash);
    }

    let summary = pipeline
        .run(url)
        .await
        .with_context(|| format!("Run for {} failed", url))?;

    print_run_summary(&summary);

    Ok(())
}
