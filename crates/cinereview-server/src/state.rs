//! Shared application state

use cinereview_classifiers::SentimentAnalyzer;
use cinereview_store::Store;
use metrics_exporter_prometheus::PrometheusHandle;

/// State handed to every handler; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub analyzer: SentimentAnalyzer,

    /// Renders `/metrics`; absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(store: Store, analyzer: SentimentAnalyzer) -> Self {
        Self {
            store,
            analyzer,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
