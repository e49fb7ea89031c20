//! Configuration for the sentiment analyzer and its model

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sentiment scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    /// Which model to load
    #[serde(default)]
    pub model: ModelSpec,

    /// Characters of review text passed to the model
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// Inferences allowed to run at the same time
    #[serde(default = "default_max_concurrent_inferences")]
    pub max_concurrent_inferences: usize,

    /// Per-inference time budget in milliseconds
    #[serde(default = "default_inference_timeout_ms")]
    pub inference_timeout_ms: u64,

    /// Optional YAML file replacing the built-in keyword tables
    #[serde(default)]
    pub keywords_path: Option<PathBuf>,

    /// Load the model in the background at startup
    #[serde(default = "default_true")]
    pub preload: bool,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            model: ModelSpec::default(),
            max_input_chars: default_max_input_chars(),
            max_concurrent_inferences: default_max_concurrent_inferences(),
            inference_timeout_ms: default_inference_timeout_ms(),
            keywords_path: None,
            preload: true,
        }
    }
}

/// Model selection
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelSpec {
    /// BERT sequence classifier run with Candle
    Bert {
        /// Where weights, config and tokenizer come from
        source: ModelSource,

        /// Device to run on (cpu, cuda, metal)
        #[serde(default = "default_device")]
        device: String,

        /// Maximum sequence length in tokens
        #[serde(default = "default_max_length")]
        max_length: usize,

        /// Output labels in logit order
        #[serde(default = "default_labels")]
        labels: Vec<String>,

        /// Download cache directory for Hugging Face models
        #[serde(default)]
        cache_dir: Option<PathBuf>,
    },

    /// Keyword-count model, no download required
    #[default]
    Lexicon,
}

impl ModelSpec {
    /// BERT model from a local directory with default settings
    pub fn local_bert(path: impl Into<PathBuf>) -> Self {
        Self::Bert {
            source: ModelSource::Local { path: path.into() },
            device: default_device(),
            max_length: default_max_length(),
            labels: default_labels(),
            cache_dir: None,
        }
    }
}

/// Model source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSource {
    /// Load from a local directory
    Local { path: PathBuf },

    /// Download from Hugging Face Hub
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
    },
}

fn default_max_input_chars() -> usize {
    256
}

fn default_max_concurrent_inferences() -> usize {
    num_cpus::get().max(1)
}

fn default_inference_timeout_ms() -> u64 {
    10_000
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_max_length() -> usize {
    256
}

pub(crate) fn default_labels() -> Vec<String> {
    vec![
        "negative".to_string(),
        "neutral".to_string(),
        "positive".to_string(),
    ]
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_true() -> bool {
    true
}
