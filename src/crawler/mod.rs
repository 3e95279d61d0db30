//! Crawler module for page rendering and traversal
//!
//! This module contains the core crawling logic, including:
//! - The breadth-first frontier with its visited set
//! - The renderer boundary and its HTTP implementation
//! - HTML parsing for links and analyzable text
//! - Politeness delays between renders
//! - Overall crawl session coordination

mod coordinator;
mod frontier;
mod parser;
mod politeness;
mod renderer;

pub use coordinator::{Coordinator, CrawlOutcome, PageRecord, SessionStats};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{extract_links, extract_text, extract_title};
pub use politeness::Politeness;
pub use renderer::{build_http_client, HttpRenderer, RenderError, RenderedPage, Renderer};
