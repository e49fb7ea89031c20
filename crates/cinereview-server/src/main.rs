//! CineReview server
//!
//! Serves the movie and review API, scoring each new review with the
//! configured sentiment model.

use anyhow::Result;
use cinereview_classifiers::SentimentAnalyzer;
use cinereview_server::{config::LoggingConfig, create_router, AppConfig, AppState, Overrides};
use cinereview_store::Store;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "cinereview-server")]
#[command(about = "CineReview movie review API", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "cinereview.yaml")]
    config: String,

    /// Listen address
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// SQLite database path, or `:memory:`
    #[arg(short, long)]
    database: Option<String>,

    /// Sentiment model: `lexicon` or a local BERT model directory
    #[arg(short, long)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            listen: self.listen.clone(),
            port: self.port,
            database: self.database.clone(),
            model: self.model.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config, &cli.overrides())?;

    init_tracing(cli.verbose, &config.logging);

    info!("Starting CineReview server");
    info!("Database: {}", config.database.path);
    info!("Sentiment model: {:?}", config.sentiment.model);

    let metrics_handle = init_metrics()?;

    let store = Store::connect(&config.database).await?;
    let analyzer = SentimentAnalyzer::from_config(&config.sentiment)?;
    info!(
        policy = %analyzer.policy_version(),
        model = %analyzer.model_description(),
        "Sentiment analyzer ready"
    );

    if config.sentiment.preload {
        let analyzer = analyzer.clone();
        tokio::spawn(async move {
            if !analyzer.warm_up().await {
                warn!("Model preload failed; reviews fall back until a load succeeds");
            }
        });
    }

    let state = AppState::new(store.clone(), analyzer).with_metrics(metrics_handle);
    let app = create_router(state, &config.server.cors_origins);

    let addr: SocketAddr = format!("{}:{}", config.server.listen, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    store.close().await;
    served?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn init_tracing(verbose: bool, logging: &LoggingConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("cinereview=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cinereview=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Install the Prometheus recorder and return the handle that renders `/metrics`
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "cinereview_requests_total",
        "Total number of HTTP requests received"
    );
    metrics::describe_counter!(
        "cinereview_reviews_scored_total",
        "Reviews scored by the sentiment policy, by label"
    );
    metrics::describe_counter!(
        "cinereview_sentiment_fallback_total",
        "Reviews given the neutral fallback, by reason"
    );
    metrics::describe_counter!(
        "cinereview_policy_exhausted_total",
        "Evaluations where no decision rule matched"
    );
    metrics::describe_histogram!(
        "cinereview_inference_latency_us",
        metrics::Unit::Microseconds,
        "Model inference latency in microseconds"
    );
    metrics::describe_counter!("cinereview_errors_total", "Total number of errors by type");

    info!("Metrics exporter initialized");
    Ok(handle)
}
