//! Lazily-loaded model handle

use cinereview_core::Result;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::model::{ModelLoader, SentimentModel};

/// A sentiment model loaded on first use and kept for the handle's lifetime.
///
/// The first caller runs the loader; callers arriving during the load wait
/// for it and share the same model. A failed load leaves the handle empty,
/// so the next caller tries again.
pub struct LazyModel {
    loader: Arc<dyn ModelLoader>,
    cell: OnceCell<Arc<dyn SentimentModel>>,
}

impl LazyModel {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            cell: OnceCell::new(),
        }
    }

    /// Get the model, loading it if necessary
    pub async fn get(&self) -> Result<Arc<dyn SentimentModel>> {
        let model = self
            .cell
            .get_or_try_init(|| async {
                info!(model = %self.loader.describe(), "Loading sentiment model");
                let start = std::time::Instant::now();

                match self.loader.load().await {
                    Ok(model) => {
                        info!(
                            model = model.name(),
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            "Sentiment model ready"
                        );
                        Ok(model)
                    }
                    Err(e) => {
                        warn!(
                            model = %self.loader.describe(),
                            error = %e,
                            "Sentiment model failed to load"
                        );
                        Err(e)
                    }
                }
            })
            .await?;

        Ok(Arc::clone(model))
    }

    /// Whether a model has been loaded
    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// Description of the underlying loader
    pub fn describe(&self) -> String {
        self.loader.describe()
    }
}

impl std::fmt::Debug for LazyModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyModel")
            .field("loader", &self.loader.describe())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
