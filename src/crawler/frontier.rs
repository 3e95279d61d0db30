//! Frontier for breadth-first, depth-bounded traversal
//!
//! The frontier owns the FIFO queue of URLs waiting to be rendered and the
//! set of every URL ever accepted. A URL is marked visited when it is offered,
//! not when it is dequeued, so a page linked from several parents before it is
//! processed is still enqueued only once.

use crate::url::strip_fragment;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL queued for rendering, with its hop count from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Fragment-free URL to render
    pub url: Url,

    /// Number of link hops from the seed (the seed has depth 0)
    pub depth: u32,
}

/// Visited set plus FIFO queue for one crawl session
#[derive(Debug)]
pub struct Frontier {
    /// Entries waiting to be rendered, in discovery order
    queue: VecDeque<FrontierEntry>,

    /// Every URL ever accepted, keyed by its fragment-free form
    visited: HashSet<String>,

    /// Offers deeper than this are refused
    max_depth: u32,
}

impl Frontier {
    /// Creates an empty frontier that never accepts entries deeper than `max_depth`
    pub fn new(max_depth: u32) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            max_depth,
        }
    }

    /// Inserts the session origin at depth 0 and marks it visited
    ///
    /// A frontier is seeded once per session; later calls are ignored.
    pub fn seed(&mut self, origin: &Url) {
        if !self.visited.is_empty() {
            tracing::warn!("Frontier already seeded, ignoring seed {}", origin);
            return;
        }

        self.accept(strip_fragment(origin), 0);
    }

    /// Offers a discovered URL at the given depth
    ///
    /// The fragment is stripped before the visited check. Returns true when
    /// the URL was newly enqueued; a URL already seen, or one deeper than the
    /// frontier's depth limit, is left untouched.
    pub fn offer(&mut self, url: &Url, depth: u32) -> bool {
        if depth > self.max_depth {
            tracing::trace!("Refusing {} at depth {} (limit {})", url, depth, self.max_depth);
            return false;
        }

        let normalized = strip_fragment(url);
        if self.visited.contains(normalized.as_str()) {
            return false;
        }

        self.accept(normalized, depth);
        true
    }

    /// Pops the oldest entry; `None` means the crawl is drained
    pub fn next(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    /// Returns the number of entries waiting to be rendered
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether no entries are waiting
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of URLs ever accepted, including the seed
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Returns whether the URL (ignoring its fragment) was ever accepted
    pub fn has_visited(&self, url: &Url) -> bool {
        self.visited.contains(strip_fragment(url).as_str())
    }

    // Marking and enqueueing happen together so the two never disagree.
    fn accept(&mut self, url: Url, depth: u32) {
        self.visited.insert(url.as_str().to_string());
        self.queue.push_back(FrontierEntry { url, depth });
    }
}
