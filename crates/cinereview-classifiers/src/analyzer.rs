//! Fail-safe sentiment analyzer
//!
//! [`SentimentAnalyzer`] is the only path from review text to a stored
//! [`SentimentResult`]. It never fails: a model that cannot be loaded, an
//! inference error, or an inference that overruns its time budget all
//! produce [`SentimentResult::fallback`].

use cinereview_core::{Result, SentimentResult};
use cinereview_policy::{Evaluation, KeywordSets, PolicyVersion, SentimentPolicy};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::bert::BertModelLoader;
use crate::config::{ModelSpec, SentimentConfig};
use crate::lazy::LazyModel;
use crate::lexicon::LexiconModelLoader;
use crate::model::ModelLoader;

/// Limits applied to every analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerSettings {
    /// Characters of input passed to the model and the policy
    pub max_input_chars: usize,

    /// Inferences allowed to run at the same time
    pub max_concurrent_inferences: usize,

    /// Time budget for one inference
    pub inference_timeout: Duration,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self::from(&SentimentConfig::default())
    }
}

impl From<&SentimentConfig> for AnalyzerSettings {
    fn from(config: &SentimentConfig) -> Self {
        Self {
            max_input_chars: config.max_input_chars,
            max_concurrent_inferences: config.max_concurrent_inferences.max(1),
            inference_timeout: Duration::from_millis(config.inference_timeout_ms),
        }
    }
}

/// Why an analysis fell back to the neutral result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The model could not be loaded
    ModelUnavailable,
    /// The model returned an error
    InferenceFailed,
    /// The model did not answer within the time budget
    Timeout,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModelUnavailable => "model_unavailable",
            Self::InferenceFailed => "inference_failed",
            Self::Timeout => "timeout",
        }
    }
}

/// Outcome of analysing one text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analysis {
    /// Result to store with the review
    pub result: SentimentResult,

    /// Policy trace, absent when the fallback was used
    pub evaluation: Option<Evaluation>,

    /// Set when the fallback was used
    pub fallback: Option<FallbackReason>,
}

impl Analysis {
    fn fallback(reason: FallbackReason) -> Self {
        Self {
            result: SentimentResult::fallback(),
            evaluation: None,
            fallback: Some(reason),
        }
    }

    /// Whether the result is the neutral fallback
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Scores review text with a lazily-loaded model and the sentiment policy.
///
/// Cheap to clone; clones share the model, the policy and the concurrency
/// limit.
#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    model: Arc<LazyModel>,
    policy: SentimentPolicy,
    settings: AnalyzerSettings,
    permits: Arc<Semaphore>,
}

impl SentimentAnalyzer {
    pub fn new(
        loader: Arc<dyn ModelLoader>,
        policy: SentimentPolicy,
        settings: AnalyzerSettings,
    ) -> Self {
        Self {
            model: Arc::new(LazyModel::new(loader)),
            policy,
            permits: Arc::new(Semaphore::new(settings.max_concurrent_inferences.max(1))),
            settings,
        }
    }

    /// Build the analyzer described by a configuration.
    ///
    /// Fails only on configuration problems such as an unreadable keyword
    /// file; the model itself is not loaded here.
    pub fn from_config(config: &SentimentConfig) -> Result<Self> {
        let keywords = match &config.keywords_path {
            Some(path) => KeywordSets::from_file(path)?,
            None => KeywordSets::default(),
        };
        let policy = SentimentPolicy::with_keywords(&keywords)?;

        let loader: Arc<dyn ModelLoader> = match &config.model {
            ModelSpec::Lexicon => Arc::new(LexiconModelLoader::new(keywords)),
            ModelSpec::Bert {
                source,
                device,
                max_length,
                labels,
                cache_dir,
            } => {
                let mut loader = BertModelLoader::new(source.clone())
                    .with_device(device.clone())
                    .with_max_length(*max_length)
                    .with_labels(labels.clone());
                if let Some(dir) = cache_dir {
                    loader = loader.with_cache_dir(dir.clone());
                }
                Arc::new(loader)
            }
        };

        Ok(Self::new(loader, policy, AnalyzerSettings::from(config)))
    }

    /// Score a review text
    pub async fn analyze(&self, text: &str) -> Analysis {
        let text = truncate_chars(text, self.settings.max_input_chars);

        let model = match self.model.get().await {
            Ok(model) => model,
            Err(e) => return self.fall_back(FallbackReason::ModelUnavailable, &e.to_string()),
        };

        let Ok(permit) = self.permits.clone().acquire_owned().await else {
            return self.fall_back(FallbackReason::InferenceFailed, "inference limiter closed");
        };

        // The permit lives in the task, so an inference that outlasts the
        // timeout keeps its slot until the work itself finishes.
        let inference = tokio::spawn({
            let model = Arc::clone(&model);
            let text = text.to_string();
            async move {
                let _permit = permit;
                model.predict(&text).await
            }
        });

        let start = Instant::now();
        let outcome = tokio::time::timeout(self.settings.inference_timeout, inference).await;
        metrics::histogram!("cinereview_inference_latency_us")
            .record(start.elapsed().as_micros() as f64);

        let raw = match outcome {
            Ok(Ok(Ok(raw))) => raw,
            Ok(Ok(Err(e))) => {
                return self.fall_back(FallbackReason::InferenceFailed, &e.to_string())
            }
            Ok(Err(e)) => {
                let detail = format!("inference task failed: {e}");
                return self.fall_back(FallbackReason::InferenceFailed, &detail);
            }
            Err(_) => {
                let detail = format!(
                    "no answer within {}ms",
                    self.settings.inference_timeout.as_millis()
                );
                return self.fall_back(FallbackReason::Timeout, &detail);
            }
        };

        let evaluation = self.policy.evaluate(raw, text);
        let result = evaluation.result;

        info!(
            model = model.name(),
            neg = raw.negative,
            neu = raw.neutral,
            pos = raw.positive,
            rule = evaluation.rule.as_str(),
            correction = ?evaluation.correction,
            label = %result.label,
            confidence = result.confidence,
            score = result.score,
            "Review scored"
        );
        metrics::counter!("cinereview_reviews_scored_total", "label" => result.label.as_str())
            .increment(1);

        Analysis {
            result,
            evaluation: Some(evaluation),
            fallback: None,
        }
    }

    fn fall_back(&self, reason: FallbackReason, detail: &str) -> Analysis {
        warn!(
            reason = reason.as_str(),
            detail, "Sentiment analysis failed, using neutral fallback"
        );
        metrics::counter!("cinereview_sentiment_fallback_total", "reason" => reason.as_str())
            .increment(1);
        metrics::counter!("cinereview_reviews_scored_total", "label" => "neutral").increment(1);
        Analysis::fallback(reason)
    }

    /// Load the model ahead of the first request.
    ///
    /// Returns whether the model is ready. A failure is logged and the next
    /// analysis retries the load.
    pub async fn warm_up(&self) -> bool {
        match self.model.get().await {
            Ok(model) => {
                debug!(model = model.name(), "Sentiment model warmed up");
                true
            }
            Err(_) => false,
        }
    }

    /// Whether the model has been loaded
    pub fn model_loaded(&self) -> bool {
        self.model.is_loaded()
    }

    /// Description of the configured model
    pub fn model_description(&self) -> String {
        self.model.describe()
    }

    /// Version of the sentiment policy in use
    pub fn policy_version(&self) -> PolicyVersion {
        self.policy.version()
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }
}

/// Longest prefix of `text` with at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("가나다라", 2), "가나");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_settings_from_config() {
        let config = SentimentConfig {
            max_concurrent_inferences: 0,
            inference_timeout_ms: 250,
            ..Default::default()
        };
        let settings = AnalyzerSettings::from(&config);
        assert_eq!(settings.max_concurrent_inferences, 1);
        assert_eq!(settings.inference_timeout, Duration::from_millis(250));
        assert_eq!(settings.max_input_chars, 256);
    }

    #[test]
    fn test_fallback_reason_names() {
        assert_eq!(FallbackReason::Timeout.as_str(), "timeout");
        assert_eq!(
            FallbackReason::ModelUnavailable.as_str(),
            "model_unavailable"
        );
    }

    #[tokio::test]
    async fn test_from_config_uses_lexicon_by_default() {
        let analyzer = SentimentAnalyzer::from_config(&SentimentConfig::default()).unwrap();
        assert_eq!(analyzer.model_description(), "lexicon");
        assert!(!analyzer.model_loaded());

        let analysis = analyzer.analyze("최고의 명작").await;
        assert!(!analysis.is_fallback());
        assert_eq!(analysis.result.label, cinereview_core::SentimentLabel::Positive);
        assert!(analyzer.model_loaded());
    }

    #[test]
    fn test_from_config_reports_bad_keyword_file() {
        let config = SentimentConfig {
            keywords_path: Some("/nonexistent/keywords.yaml".into()),
            ..Default::default()
        };
        assert!(SentimentAnalyzer::from_config(&config).is_err());
    }
}
