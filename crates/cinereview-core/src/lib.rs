//! CineReview Core
//!
//! Core types and utilities shared across CineReview components.
//!
//! This crate provides:
//! - The three-class probability triple produced by sentiment models
//! - Sentiment labels and the frozen result stored with each review
//! - Star rendering for the `[0, 5]` score scale
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    render_stars, round_to, star_count, ProbabilityTriple, SentimentLabel, SentimentResult,
    FALLBACK_CONFIDENCE, SCORE_MAX, SCORE_MIDPOINT, SCORE_MIN,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{ProbabilityTriple, SentimentLabel, SentimentResult};
}
