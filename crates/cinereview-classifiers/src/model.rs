//! Sentiment model capability and loader traits

use async_trait::async_trait;
use cinereview_core::{ProbabilityTriple, Result};
use std::sync::Arc;

/// A text classifier producing negative/neutral/positive probabilities
#[async_trait]
pub trait SentimentModel: Send + Sync {
    /// Predict class probabilities for the given text
    async fn predict(&self, text: &str) -> Result<ProbabilityTriple>;

    /// Get the model name
    fn name(&self) -> &str;
}

/// Produces a ready-to-use sentiment model.
///
/// Loading may download weights or read large files, so it is deferred
/// until the first prediction through [`crate::LazyModel`].
#[async_trait]
pub trait ModelLoader: Send + Sync {
    /// Load the model
    async fn load(&self) -> Result<Arc<dyn SentimentModel>>;

    /// Human-readable description of what will be loaded
    fn describe(&self) -> String;
}
