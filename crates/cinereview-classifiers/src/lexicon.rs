//! Keyword-count sentiment model
//!
//! Turns keyword hits into a probability triple. Useful in development and
//! tests where downloading a transformer is not an option, and as a
//! baseline to compare trained models against.

use async_trait::async_trait;
use cinereview_core::{ProbabilityTriple, Result};
use cinereview_policy::{KeywordMatcher, KeywordSets};
use std::sync::Arc;

use crate::model::{ModelLoader, SentimentModel};

/// Pseudo-count given to the neutral class
const NEUTRAL_PRIOR: f64 = 0.5;

/// Weight of a strong-negative hit relative to a general-negative one
const STRONG_NEGATIVE_WEIGHT: f64 = 2.0;

/// Sentiment model that scores text by counting keywords
#[derive(Debug, Clone)]
pub struct LexiconSentimentModel {
    matcher: Arc<KeywordMatcher>,
}

impl LexiconSentimentModel {
    pub fn new(sets: &KeywordSets) -> Result<Self> {
        Ok(Self {
            matcher: Arc::new(KeywordMatcher::new(sets)?),
        })
    }

    /// Compute the triple synchronously
    pub fn triple(&self, text: &str) -> ProbabilityTriple {
        let counts = self.matcher.count(text);
        let positive = counts.positive as f64;
        let negative =
            counts.negative as f64 + STRONG_NEGATIVE_WEIGHT * counts.strong_negative as f64;
        let total = positive + negative + NEUTRAL_PRIOR;

        ProbabilityTriple::new(negative / total, NEUTRAL_PRIOR / total, positive / total)
    }
}

#[async_trait]
impl SentimentModel for LexiconSentimentModel {
    async fn predict(&self, text: &str) -> Result<ProbabilityTriple> {
        Ok(self.triple(text))
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

/// Loader for [`LexiconSentimentModel`]
#[derive(Debug, Clone, Default)]
pub struct LexiconModelLoader {
    sets: KeywordSets,
}

impl LexiconModelLoader {
    pub fn new(sets: KeywordSets) -> Self {
        Self { sets }
    }
}

#[async_trait]
impl ModelLoader for LexiconModelLoader {
    async fn load(&self) -> Result<Arc<dyn SentimentModel>> {
        Ok(Arc::new(LexiconSentimentModel::new(&self.sets)?))
    }

    fn describe(&self) -> String {
        "lexicon".to_string()
    }
}
