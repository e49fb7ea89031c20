//! CineReview Classifiers
//!
//! Sentiment models and the analyzer that turns review text into a stored
//! sentiment result.
//!
//! - [`SentimentModel`] is the single-method capability every model offers:
//!   text in, negative/neutral/positive probabilities out
//! - [`BertSentimentModel`] runs a BERT sequence classifier with Candle
//! - [`LexiconSentimentModel`] is a keyword-count model that needs no download
//! - [`LazyModel`] loads a model once, on first use, for the process lifetime
//! - [`SentimentAnalyzer`] bounds concurrency and latency, applies the
//!   sentiment policy, and substitutes a neutral result when the model fails

pub mod analyzer;
pub mod bert;
pub mod config;
pub mod lazy;
pub mod lexicon;
pub mod model;

pub use analyzer::{
    truncate_chars, Analysis, AnalyzerSettings, FallbackReason, SentimentAnalyzer,
};
pub use bert::{BertModelLoader, BertSentimentModel};
pub use config::{ModelSource, ModelSpec, SentimentConfig};
pub use lazy::LazyModel;
pub use lexicon::{LexiconModelLoader, LexiconSentimentModel};
pub use model::{ModelLoader, SentimentModel};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analyzer::{Analysis, SentimentAnalyzer};
    pub use crate::model::{ModelLoader, SentimentModel};
}
