//! BERT sequence classifier run with Candle
//!
//! Expects a Hugging Face style model directory: `config.json`,
//! `model.safetensors`, and either `tokenizer.json` or `vocab.txt`. The
//! checkpoint must carry a trained `classifier` head; a missing head is a
//! load error rather than a randomly initialised layer.

use async_trait::async_trait;
use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use cinereview_core::{Error, ProbabilityTriple, Result, SentimentLabel};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use crate::config::ModelSource;
use crate::model::{ModelLoader, SentimentModel};

/// Positions of the three sentiment classes in the model output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LabelLayout {
    negative: usize,
    neutral: usize,
    positive: usize,
    len: usize,
}

impl LabelLayout {
    /// Build from the configured label names, in logit order
    pub(crate) fn from_labels(labels: &[String]) -> Result<Self> {
        let mut negative = None;
        let mut neutral = None;
        let mut positive = None;

        for (idx, name) in labels.iter().enumerate() {
            let slot = match name.to_lowercase().parse::<SentimentLabel>()? {
                SentimentLabel::Negative => &mut negative,
                SentimentLabel::Neutral => &mut neutral,
                SentimentLabel::Positive => &mut positive,
            };
            if slot.replace(idx).is_some() {
                return Err(Error::config(format!("label '{name}' listed twice")));
            }
        }

        match (negative, neutral, positive) {
            (Some(negative), Some(neutral), Some(positive)) => Ok(Self {
                negative,
                neutral,
                positive,
                len: labels.len(),
            }),
            _ => Err(Error::config(
                "labels must name negative, neutral and positive exactly once",
            )),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Pick the three class probabilities out of a softmax vector
    pub(crate) fn triple(&self, probs: &[f32]) -> Result<ProbabilityTriple> {
        if probs.len() != self.len {
            return Err(Error::classifier(format!(
                "expected {} probabilities, model produced {}",
                self.len,
                probs.len()
            )));
        }

        Ok(ProbabilityTriple::new(
            probs[self.negative] as f64,
            probs[self.neutral] as f64,
            probs[self.positive] as f64,
        ))
    }
}

/// Loads a [`BertSentimentModel`] from a local directory or the Hugging Face Hub
#[derive(Debug, Clone)]
pub struct BertModelLoader {
    source: ModelSource,
    device: String,
    max_length: usize,
    labels: Vec<String>,
    cache_dir: PathBuf,
}

impl BertModelLoader {
    pub fn new(source: ModelSource) -> Self {
        let cache_dir = dirs::cache_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cinereview/models");

        Self {
            source,
            device: "cpu".to_string(),
            max_length: 256,
            labels: crate::config::default_labels(),
            cache_dir,
        }
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    fn model_name(&self) -> String {
        match &self.source {
            ModelSource::Local { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "bert".to_string()),
            ModelSource::HuggingFace { repo, .. } => repo.clone(),
        }
    }

    fn resolve_model_path(&self) -> Result<PathBuf> {
        match &self.source {
            ModelSource::Local { path } => {
                if !path.exists() {
                    return Err(Error::classifier(format!(
                        "Model path does not exist: {}",
                        path.display()
                    )));
                }
                Ok(path.clone())
            }
            ModelSource::HuggingFace { repo, revision } => {
                download_from_huggingface(repo, revision, &self.cache_dir)
            }
        }
    }

    fn load_blocking(&self) -> Result<BertSentimentModel> {
        let layout = LabelLayout::from_labels(&self.labels)?;
        let model_path = self.resolve_model_path()?;

        let tokenizer = load_tokenizer(&model_path, self.max_length)?;
        let bert_config: BertConfig = parse_json_config(&model_path.join("config.json"))?;
        let hidden_size = bert_config.hidden_size;

        let device = get_device(&self.device)?;
        let vb = load_var_builder(&model_path, &device)?;

        let (model, prefix) = load_bert_backbone(&vb, &bert_config, &["bert", ""])?;
        let pooler = load_pooler(&vb, prefix, hidden_size);
        let classifier = candle_nn::linear(hidden_size, layout.len(), vb.pp("classifier"))
            .map_err(|e| {
                Error::classifier(format!(
                    "No trained classification head with {} labels: {}",
                    layout.len(),
                    e
                ))
            })?;

        info!(
            model = %self.model_name(),
            labels = ?self.labels,
            pooler = pooler.is_some(),
            "Loaded BERT sentiment classifier"
        );

        Ok(BertSentimentModel {
            name: self.model_name(),
            inner: Arc::new(BertInner {
                tokenizer,
                model,
                pooler,
                classifier,
                device,
                layout,
                max_length: self.max_length,
            }),
        })
    }
}

#[async_trait]
impl ModelLoader for BertModelLoader {
    async fn load(&self) -> Result<Arc<dyn SentimentModel>> {
        let loader = self.clone();
        let model = tokio::task::spawn_blocking(move || loader.load_blocking())
            .await
            .map_err(|e| Error::classifier(format!("Model load task failed: {}", e)))??;
        Ok(Arc::new(model))
    }

    fn describe(&self) -> String {
        match &self.source {
            ModelSource::Local { path } => format!("bert (local {})", path.display()),
            ModelSource::HuggingFace { repo, revision } => {
                format!("bert (huggingface {repo}@{revision})")
            }
        }
    }
}

struct BertInner {
    tokenizer: Tokenizer,
    model: BertModel,
    pooler: Option<Linear>,
    classifier: Linear,
    device: Device,
    layout: LabelLayout,
    max_length: usize,
}

impl BertInner {
    fn predict_blocking(&self, text: &str) -> Result<ProbabilityTriple> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::classifier(format!("Tokenization failed: {}", e)))?;

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| Error::classifier(format!("Failed to create input tensor: {}", e)))?;

        let token_type_ids = Tensor::new(encoding.get_type_ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| {
                Error::classifier(format!("Failed to create token type tensor: {}", e))
            })?;

        let hidden_states = self
            .model
            .forward(&input_ids, &token_type_ids, None)
            .map_err(|e| Error::classifier(format!("Model forward pass failed: {}", e)))?;

        let mut cls_embedding = hidden_states
            .i((0, 0, ..))
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| Error::classifier(format!("Failed to get CLS token: {}", e)))?;

        if let Some(pooler) = &self.pooler {
            cls_embedding = pooler
                .forward(&cls_embedding)
                .and_then(|t| t.tanh())
                .map_err(|e| Error::classifier(format!("Pooler failed: {}", e)))?;
        }

        let logits = self
            .classifier
            .forward(&cls_embedding)
            .map_err(|e| Error::classifier(format!("Classification head failed: {}", e)))?;

        let probs: Vec<f32> = candle_nn::ops::softmax(&logits, D::Minus1)
            .and_then(|t| t.squeeze(0))
            .and_then(|t| t.to_vec1())
            .map_err(|e| Error::classifier(format!("Softmax failed: {}", e)))?;

        self.layout.triple(&probs)
    }
}

/// BERT model with a sequence classification head
#[derive(Clone)]
pub struct BertSentimentModel {
    name: String,
    inner: Arc<BertInner>,
}

impl std::fmt::Debug for BertSentimentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertSentimentModel")
            .field("name", &self.name)
            .field("device", &self.inner.device)
            .field("max_length", &self.inner.max_length)
            .finish()
    }
}

#[async_trait]
impl SentimentModel for BertSentimentModel {
    async fn predict(&self, text: &str) -> Result<ProbabilityTriple> {
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        tokio::task::spawn_blocking(move || inner.predict_blocking(&text))
            .await
            .map_err(|e| Error::classifier(format!("Inference task failed: {}", e)))?
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn download_from_huggingface(repo: &str, revision: &str, cache_dir: &Path) -> Result<PathBuf> {
    info!(repo, revision, "Downloading model from HuggingFace");

    let api = hf_hub::api::sync::ApiBuilder::new()
        .with_cache_dir(cache_dir.to_path_buf())
        .build()
        .map_err(|e| Error::classifier(format!("Failed to initialize HuggingFace API: {}", e)))?;

    let repo_obj = api.repo(hf_hub::Repo::with_revision(
        repo.to_string(),
        hf_hub::RepoType::Model,
        revision.to_string(),
    ));

    repo_obj
        .get("model.safetensors")
        .map_err(|e| Error::classifier(format!("Failed to download model.safetensors: {}", e)))?;

    let found_tokenizer = ["tokenizer.json", "vocab.txt"].iter().any(|file| {
        match repo_obj.get(file) {
            Ok(_) => {
                debug!("Found tokenizer file: {}", file);
                true
            }
            Err(_) => false,
        }
    });

    if !found_tokenizer {
        return Err(Error::classifier(
            "No tokenizer found (tried tokenizer.json, vocab.txt)",
        ));
    }

    let config_path = repo_obj
        .get("config.json")
        .map_err(|e| Error::classifier(format!("Failed to download config.json: {}", e)))?;

    let model_dir = config_path
        .parent()
        .ok_or_else(|| Error::classifier("Invalid cache path"))?;

    info!("Model available at: {}", model_dir.display());
    Ok(model_dir.to_path_buf())
}

fn get_device(device: &str) -> Result<Device> {
    match device.to_lowercase().as_str() {
        "cuda" | "cuda:0" => Device::new_cuda(0)
            .map_err(|e| Error::classifier(format!("Failed to initialize CUDA: {}", e))),
        "mps" | "metal" => Device::new_metal(0)
            .map_err(|e| Error::classifier(format!("Failed to initialize Metal: {}", e))),
        _ => Ok(Device::Cpu),
    }
}

fn parse_json_config<T: DeserializeOwned>(config_path: &Path) -> Result<T> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        Error::classifier(format!(
            "Failed to read config {}: {}",
            config_path.display(),
            e
        ))
    })?;

    serde_json::from_str(&config_str).map_err(|e| {
        Error::classifier(format!(
            "Failed to parse config {}: {}",
            config_path.display(),
            e
        ))
    })
}

fn load_var_builder(model_path: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let weights_path = model_path.join("model.safetensors");
    if !weights_path.exists() {
        return Err(Error::classifier(format!(
            "model.safetensors not found in {}",
            model_path.display()
        )));
    }

    // SAFETY: the weights file is memory-mapped read-only and not modified while loaded.
    let vb = unsafe {
        VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)
            .map_err(|e| Error::classifier(format!("Failed to load weights: {}", e)))?
    };

    Ok(vb)
}

fn load_bert_backbone<'a>(
    vb: &VarBuilder,
    config: &BertConfig,
    prefixes: &[&'a str],
) -> Result<(BertModel, &'a str)> {
    let mut errors = Vec::new();

    for &prefix in prefixes {
        let vb_prefix = if prefix.is_empty() {
            vb.clone()
        } else {
            vb.pp(prefix)
        };

        match BertModel::load(vb_prefix, config) {
            Ok(model) => {
                debug!("Loaded BERT backbone from '{}'", display_prefix(prefix));
                return Ok((model, prefix));
            }
            Err(e) => errors.push(format!("{}: {}", display_prefix(prefix), e)),
        }
    }

    Err(Error::classifier(format!(
        "Failed to load BERT backbone with tried prefixes [{}]",
        errors.join(" | ")
    )))
}

fn load_pooler(vb: &VarBuilder, prefix: &str, hidden_size: usize) -> Option<Linear> {
    let vb = if prefix.is_empty() {
        vb.clone()
    } else {
        vb.pp(prefix)
    };
    candle_nn::linear(hidden_size, hidden_size, vb.pp("pooler").pp("dense")).ok()
}

fn display_prefix(prefix: &str) -> &str {
    if prefix.is_empty() {
        "<root>"
    } else {
        prefix
    }
}

/// Load the tokenizer, truncating to `max_length` tokens with the special
/// tokens included
fn load_tokenizer(model_path: &Path, max_length: usize) -> Result<Tokenizer> {
    let mut tokenizer = read_tokenizer(model_path)?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| Error::classifier(format!("Invalid truncation length {max_length}: {e}")))?;
    Ok(tokenizer)
}

fn read_tokenizer(model_path: &Path) -> Result<Tokenizer> {
    let tokenizer_json_path = model_path.join("tokenizer.json");
    if tokenizer_json_path.exists() {
        debug!("Loading tokenizer from tokenizer.json");
        return Tokenizer::from_file(&tokenizer_json_path)
            .map_err(|e| Error::classifier(format!("Failed to load tokenizer.json: {}", e)));
    }

    let vocab_path = model_path.join("vocab.txt");
    if vocab_path.exists() {
        debug!("Building tokenizer from vocab.txt");

        use tokenizers::models::wordpiece::WordPiece;
        use tokenizers::normalizers::BertNormalizer;
        use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
        use tokenizers::processors::bert::BertProcessing;

        let wordpiece = WordPiece::from_file(vocab_path.to_string_lossy().as_ref())
            .unk_token("[UNK]".to_string())
            .build()
            .map_err(|e| Error::classifier(format!("Failed to build WordPiece model: {}", e)))?;

        let mut tokenizer = Tokenizer::new(wordpiece);
        let sep = tokenizer.token_to_id("[SEP]").unwrap_or(102);
        let cls = tokenizer.token_to_id("[CLS]").unwrap_or(101);
        tokenizer.with_normalizer(Some(BertNormalizer::default()));
        tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
        tokenizer.with_post_processor(Some(BertProcessing::new(
            ("[SEP]".to_string(), sep),
            ("[CLS]".to_string(), cls),
        )));

        return Ok(tokenizer);
    }

    Err(Error::classifier(format!(
        "No tokenizer found in {} (tried tokenizer.json, vocab.txt)",
        model_path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_label_layout_reorders_output() {
        let layout = LabelLayout::from_labels(&labels(&["positive", "negative", "neutral"])).unwrap();
        let triple = layout.triple(&[0.7, 0.1, 0.2]).unwrap();
        assert!((triple.positive - 0.7).abs() < 1e-6);
        assert!((triple.negative - 0.1).abs() < 1e-6);
        assert!((triple.neutral - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_label_layout_accepts_uppercase() {
        assert!(LabelLayout::from_labels(&labels(&["NEGATIVE", "Neutral", "positive"])).is_ok());
    }

    #[test]
    fn test_label_layout_rejects_incomplete_labels() {
        assert!(LabelLayout::from_labels(&labels(&["negative", "positive"])).is_err());
        assert!(LabelLayout::from_labels(&labels(&["negative", "negative", "positive"])).is_err());
        assert!(LabelLayout::from_labels(&labels(&["negative", "neutral", "happy"])).is_err());
    }

    #[test]
    fn test_label_layout_rejects_wrong_width() {
        let layout = LabelLayout::from_labels(&labels(&["negative", "neutral", "positive"])).unwrap();
        assert!(layout.triple(&[0.5, 0.5]).is_err());
    }

    #[test]
    fn test_long_input_keeps_closing_separator() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("vocab.txt"),
            "[PAD]\n[UNK]\n[CLS]\n[SEP]\ngreat\nmovie\n",
        )
        .unwrap();

        let tokenizer = load_tokenizer(dir.path(), 8).unwrap();
        let encoding = tokenizer
            .encode("great movie ".repeat(40).as_str(), true)
            .unwrap();
        let ids = encoding.get_ids();

        assert_eq!(ids.len(), 8);
        assert_eq!(ids.first(), Some(&2));
        assert_eq!(ids.last(), Some(&3));
        assert_eq!(&ids[1..7], &[4, 5, 4, 5, 4, 5]);
    }

    #[test]
    fn test_short_input_is_not_padded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("vocab.txt"),
            "[PAD]\n[UNK]\n[CLS]\n[SEP]\ngreat\n",
        )
        .unwrap();

        let tokenizer = load_tokenizer(dir.path(), 256).unwrap();
        let encoding = tokenizer.encode("great", true).unwrap();
        assert_eq!(encoding.get_ids(), &[2, 4, 3]);
    }

    #[tokio::test]
    async fn test_missing_local_path_fails_to_load() {
        let loader = BertModelLoader::new(ModelSource::Local {
            path: PathBuf::from("/nonexistent/cinereview-model"),
        });
        let err = loader.load().await.err().unwrap();
        assert!(err.to_string().contains("does not exist"));
        assert!(loader.describe().starts_with("bert (local"));
    }
}
