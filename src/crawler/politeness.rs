//! Randomized delay issued before every render

use crate::config::CrawlerConfig;
use rand::Rng;
use std::time::Duration;

/// Uniformly random pause bounded by `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Politeness {
    min: Duration,
    max: Duration,
}

impl Politeness {
    /// Creates a delay range; bounds given in the wrong order are swapped
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// No delay at all
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            Duration::from_millis(config.politeness_min),
            Duration::from_millis(config.politeness_max),
        )
    }

    /// Draws one delay from the range
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    /// Sleeps for one sampled delay
    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tracing::trace!("Politeness delay {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }
}
