use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::shared::gbdt::BoostingParams;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub training: TrainingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Orders spreadsheet behind the dashboard
    pub dashboard_path: String,
    /// How long the loaded dashboard dataset stays cached
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub model_path: String,
    pub encoder_path: String,
    pub report_path: String,
    pub threshold: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrainingConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(flatten)]
    pub boosting: BoostingParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            boosting: BoostingParams::default(),
        }
    }
}

fn default_seed() -> u64 {
    42
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000

[data]
dashboard_path = "data.csv"
cache_ttl_secs = 300

[model]
model_path = "fraud_model.json"
encoder_path = "ordinal_encoder.json"
report_path = "training_report.json"
threshold = 0.5

[training]
seed = 42
n_estimators = 1000
learning_rate = 0.05
num_leaves = 31
min_child_samples = 20
early_stopping_rounds = 50
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::debug!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    default_config()
}

pub fn default_config() -> anyhow::Result<Config> {
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Artifacts and datasets live in the working directory;
/// relative paths resolve against it.
pub fn resolve_path(base_dir: &Path, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
