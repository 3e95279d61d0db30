//! Crawl driver - main crawl orchestration logic
//!
//! This module contains the session loop that coordinates:
//! - Pulling entries from the frontier in breadth-first order
//! - Pacing renders with the politeness delay
//! - Rendering pages and recording them
//! - Extracting, validating and offering discovered links
//!
//! A single page's failure never ends the session; only an unavailable
//! renderer does.

use crate::config::CrawlerConfig;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::extract_links;
use crate::crawler::politeness::Politeness;
use crate::crawler::renderer::{RenderError, Renderer};
use crate::url::{is_eligible_url, normalize_url};
use crate::ScoutError;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// A successfully rendered page, in visit order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    pub url: String,
    pub rendered_content: String,
    pub depth: u32,
}

/// Counters collected over one crawl session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Pages rendered and recorded
    pub pages_rendered: u64,

    /// Renders that failed and were skipped
    pub render_failures: u64,

    /// Dequeued entries discarded for exceeding the depth limit
    pub skipped_depth: u64,

    /// Links found on expanded pages
    pub links_found: u64,

    /// Links that passed the link validator and were offered to the frontier
    pub links_offered: u64,

    /// Links newly accepted by the frontier
    pub links_accepted: u64,

    /// Wall-clock duration of the session
    pub elapsed: Duration,
}

/// Result of a completed crawl session
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub pages: Vec<PageRecord>,
    pub stats: SessionStats,
}

/// Main crawler coordinator structure
///
/// The coordinator holds configuration and the injected renderer; each call
/// to [`Coordinator::crawl`] or [`Coordinator::run_session`] builds a fresh
/// frontier, so sessions never share visited state.
pub struct Coordinator {
    config: CrawlerConfig,
    renderer: Arc<dyn Renderer>,
    politeness: Politeness,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration (depth, timeouts, politeness)
    /// * `renderer` - The page rendering capability
    pub fn new(config: CrawlerConfig, renderer: Arc<dyn Renderer>) -> Self {
        let politeness = Politeness::from_config(&config);
        Self {
            config,
            renderer,
            politeness,
        }
    }

    /// Replaces the politeness delay derived from configuration
    pub fn with_politeness(mut self, politeness: Politeness) -> Self {
        self.politeness = politeness;
        self
    }

    /// Crawls from `seed_url` down to `max_depth` hops and returns the pages in visit order
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PageRecord>)` - Every page rendered, breadth-first
    /// * `Err(ScoutError)` - The seed was invalid or the renderer became unavailable
    pub async fn run_session(
        &self,
        seed_url: &str,
        max_depth: u32,
    ) -> Result<Vec<PageRecord>, ScoutError> {
        Ok(self.crawl_to_depth(seed_url, max_depth).await?.pages)
    }

    /// Crawls from `seed_url` using the configured depth, returning pages and statistics
    pub async fn crawl(&self, seed_url: &str) -> Result<CrawlOutcome, ScoutError> {
        self.crawl_to_depth(seed_url, self.config.max_depth).await
    }

    async fn crawl_to_depth(
        &self,
        seed_url: &str,
        max_depth: u32,
    ) -> Result<CrawlOutcome, ScoutError> {
        let origin = normalize_url(seed_url)?;
        let mut frontier = Frontier::new(max_depth);
        frontier.seed(&origin);

        let render_timeout = self.config.request_timeout();
        let start_time = Instant::now();
        let mut pages = Vec::new();
        let mut stats = SessionStats::default();

        tracing::info!("Starting crawl for {} (max depth {})", origin, max_depth);

        while let Some(entry) = frontier.next() {
            if entry.depth > max_depth {
                tracing::debug!("Skipping {} at depth {}", entry.url, entry.depth);
                stats.skipped_depth += 1;
                continue;
            }

            tracing::info!("Visiting: {} (depth {})", entry.url, entry.depth);
            self.politeness.wait().await;

            let page = match self.renderer.render(&entry.url, render_timeout).await {
                Ok(page) => page,
                Err(RenderError::Unavailable(reason)) => {
                    tracing::error!("Renderer unavailable while visiting {}: {}", entry.url, reason);
                    return Err(ScoutError::RendererUnavailable(reason));
                }
                Err(e) => {
                    tracing::warn!("Failed to render {}: {}", entry.url, e);
                    stats.render_failures += 1;
                    continue;
                }
            };

            // Relative links resolve against where the page actually lives
            if entry.depth < max_depth {
                expand_links(&mut frontier, &origin, &page.final_url, entry.depth, &page.html, &mut stats);
            }

            pages.push(PageRecord {
                url: entry.url.to_string(),
                rendered_content: page.html,
                depth: entry.depth,
            });
            stats.pages_rendered += 1;

            if stats.pages_rendered % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages rendered, {} in frontier",
                    stats.pages_rendered,
                    frontier.len()
                );
            }
        }

        stats.elapsed = start_time.elapsed();
        tracing::info!(
            "Crawl complete: {} pages rendered, {} failed, {} URLs seen in {:?}",
            stats.pages_rendered,
            stats.render_failures,
            frontier.visited_count(),
            stats.elapsed
        );

        Ok(CrawlOutcome { pages, stats })
    }
}

/// Offers every in-scope link on a page to the frontier at the next depth
fn expand_links(
    frontier: &mut Frontier,
    origin: &Url,
    base: &Url,
    depth: u32,
    html: &str,
    stats: &mut SessionStats,
) {
    let links = extract_links(html, base);
    stats.links_found += links.len() as u64;

    for link in links {
        if !is_eligible_url(&link, origin) {
            tracing::trace!("Out of scope: {}", link);
            continue;
        }
        stats.links_offered += 1;

        if frontier.offer(&link, depth + 1) {
            tracing::debug!("Queued {} at depth {}", link, depth + 1);
            stats.links_accepted += 1;
        }
    }
}
