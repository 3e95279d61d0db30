//! URL handling module for ESG Scout
//!
//! This module provides fragment normalization, domain extraction and the
//! link validator that decides which discovered URLs stay in scope.

mod domain;
mod normalize;
mod validator;

// Re-export main functions
pub use domain::{extract_domain, same_origin_host};
pub use normalize::{normalize_url, strip_fragment};
pub use validator::{is_eligible, is_eligible_url};
