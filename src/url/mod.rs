//! URL handling module for Topic-Harvester
//!
//! This module provides URL normalization (the identity used by the visited
//! set) and the keyword/domain admission filter applied to discovered links.

mod filter;
mod normalize;

pub use filter::AdmissionFilter;
pub use normalize::{normalize_url, upgrade_to_https};
