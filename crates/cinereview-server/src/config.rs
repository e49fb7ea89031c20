//! Server configuration
//!
//! Layered from lowest to highest precedence: built-in defaults, an optional
//! YAML file, `CINEREVIEW_*` environment variables (`__` separates nested
//! keys, e.g. `CINEREVIEW_SERVER__PORT=9000`), then command-line flags.

use cinereview_classifiers::{ModelSpec, SentimentConfig};
use cinereview_store::DatabaseConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CINEREVIEW";

/// Full application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub sentiment: SentimentConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS; `*` allows any
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable logs
    #[serde(default)]
    pub json: bool,
}

/// Values given on the command line, applied last
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub listen: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub model: Option<String>,
}

impl AppConfig {
    /// Load configuration from defaults, file, environment and overrides.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: impl AsRef<Path>, overrides: &Overrides) -> anyhow::Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            )
            .build()?;

        let mut config: AppConfig = settings.try_deserialize()?;
        config.apply(overrides);
        Ok(config)
    }

    /// Apply command-line overrides
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(listen) = &overrides.listen {
            self.server.listen = listen.clone();
        }

        if let Some(port) = overrides.port {
            self.server.port = port;
        }

        if let Some(database) = &overrides.database {
            self.database.path = database.clone();
        }

        if let Some(model) = &overrides.model {
            self.sentiment.model = model_from_flag(model);
        }
    }
}

/// `lexicon` selects the keyword model, anything else a local BERT directory
fn model_from_flag(value: &str) -> ModelSpec {
    if value.eq_ignore_ascii_case("lexicon") {
        ModelSpec::Lexicon
    } else {
        ModelSpec::local_bert(value)
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinereview_classifiers::ModelSource;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config =
            AppConfig::load("/nonexistent/cinereview.yaml", &Overrides::default()).unwrap();
        assert_eq!(config.server.listen, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.path, "cinereview.db");
        assert!(matches!(config.sentiment.model, ModelSpec::Lexicon));
        assert_eq!(config.sentiment.max_input_chars, 256);
    }

    #[test]
    fn test_file_values_merge_with_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"
server:
  port: 9100
sentiment:
  inference_timeout_ms: 2500
  model:
    kind: bert
    source:
      type: local
      path: /models/ko-sentiment
logging:
  json: true
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path(), &Overrides::default()).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.listen, "0.0.0.0");
        assert_eq!(config.sentiment.inference_timeout_ms, 2500);
        assert_eq!(config.sentiment.max_input_chars, 256);
        assert!(config.logging.json);

        match config.sentiment.model {
            ModelSpec::Bert {
                source: ModelSource::Local { path },
                device,
                ..
            } => {
                assert_eq!(path, std::path::PathBuf::from("/models/ko-sentiment"));
                assert_eq!(device, "cpu");
            }
            other => panic!("Wrong model spec: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "server: [not, a, map").unwrap();
        assert!(AppConfig::load(file.path(), &Overrides::default()).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let overrides = Overrides {
            listen: Some("127.0.0.1".to_string()),
            port: Some(3000),
            database: Some(":memory:".to_string()),
            model: Some("/srv/models/bert".to_string()),
        };
        let config = AppConfig::load("/nonexistent/cinereview.yaml", &overrides).unwrap();

        assert_eq!(config.server.listen, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, ":memory:");
        assert!(matches!(config.sentiment.model, ModelSpec::Bert { .. }));
    }

    #[test]
    fn test_lexicon_flag() {
        assert!(matches!(model_from_flag("LEXICON"), ModelSpec::Lexicon));
    }
}
