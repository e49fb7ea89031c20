//! CineReview Sentiment Policy
//!
//! Deterministic post-processing of sentiment model output.
//!
//! A policy takes the three class probabilities produced by a sentiment
//! model together with the review text and turns them into a label, a
//! confidence and a star score:
//! - Keyword-based correction softens confident scores on mixed-sentiment text
//! - An ordered set of decision rules picks the label and maps the winning
//!   probability onto the `[0, 5]` star scale
//!
//! Evaluation is pure: no shared mutable state, safe to call from any number
//! of tasks at once.

pub mod correction;
pub mod engine;
pub mod keywords;

pub use correction::{Correction, MixedSentimentCorrection, MixedSignal};
pub use engine::{
    derive_sentiment, DecisionRule, Derivation, Evaluation, PolicyVersion, SentimentPolicy,
};
pub use keywords::{KeywordCounts, KeywordMatcher, KeywordSets};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::engine::{DecisionRule, Evaluation, PolicyVersion, SentimentPolicy};
    pub use crate::keywords::{KeywordMatcher, KeywordSets};
}
