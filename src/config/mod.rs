//! Environment-backed configuration.
//!
//! Every setting has a default except the embeddings file. Override with `ASAG_*`
//! environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::DEFAULT_EMBEDDING_DIM;
use crate::embedding::DevicePreference;
use crate::training::{EarlyStoppingConfig, OptimizerKind, TrainingConfig};

/// Experiment configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `ASAG_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// GloVe-format embeddings file. Required by the binary.
    pub embeddings_path: Option<PathBuf>,

    /// Directory holding `{item}_train.tsv`, `{item}_dev.tsv` and `{item}_test.tsv`.
    /// Default: `./data`.
    pub data_dir: PathBuf,

    /// Items to run, in order.
    pub item_ids: Vec<String>,

    /// Report destination. Default: `./result/results.txt`.
    pub result_path: PathBuf,

    /// When set, each trained model is saved under `model_dir/<item_id>`.
    pub model_dir: Option<PathBuf>,

    /// Word-vector width. Default: `300`.
    pub embedding_dim: usize,

    /// Keep only the first N tokens of every sentence. `None` keeps all.
    pub token_limit: Option<usize>,

    /// `auto` tries Metal/CUDA before CPU. Default: `auto`.
    pub device: DevicePreference,

    pub training: TrainingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embeddings_path: None,
            data_dir: PathBuf::from("./data"),
            item_ids: Vec::new(),
            result_path: PathBuf::from("./result/results.txt"),
            model_dir: None,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            token_limit: None,
            device: DevicePreference::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl Config {
    pub const ENV_EMBEDDINGS_PATH: &'static str = "ASAG_EMBEDDINGS_PATH";
    const ENV_DATA_DIR: &'static str = "ASAG_DATA_DIR";
    const ENV_ITEM_IDS: &'static str = "ASAG_ITEM_IDS";
    const ENV_RESULT_PATH: &'static str = "ASAG_RESULT_PATH";
    const ENV_MODEL_DIR: &'static str = "ASAG_MODEL_DIR";
    const ENV_EMBEDDING_DIM: &'static str = "ASAG_EMBEDDING_DIM";
    const ENV_TOKEN_LIMIT: &'static str = "ASAG_TOKEN_LIMIT";
    const ENV_DEVICE: &'static str = "ASAG_DEVICE";
    const ENV_EPOCHS: &'static str = "ASAG_EPOCHS";
    const ENV_BATCH_SIZE: &'static str = "ASAG_BATCH_SIZE";
    const ENV_EVAL_BATCH_SIZE: &'static str = "ASAG_EVAL_BATCH_SIZE";
    const ENV_OPTIMIZER: &'static str = "ASAG_OPTIMIZER";
    const ENV_LEARNING_RATE: &'static str = "ASAG_LEARNING_RATE";
    const ENV_LOSS: &'static str = "ASAG_LOSS";
    const ENV_EARLY_STOPPING: &'static str = "ASAG_EARLY_STOPPING";
    const ENV_PATIENCE: &'static str = "ASAG_PATIENCE";
    const ENV_SEED: &'static str = "ASAG_SEED";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// Unparseable numeric values are errors rather than silent defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let embeddings_path = Self::parse_optional_path_from_env(Self::ENV_EMBEDDINGS_PATH);
        let data_dir = Self::parse_path_from_env(Self::ENV_DATA_DIR, defaults.data_dir);
        let item_ids = Self::parse_list_from_env(Self::ENV_ITEM_IDS);
        let result_path = Self::parse_path_from_env(Self::ENV_RESULT_PATH, defaults.result_path);
        let model_dir = Self::parse_optional_path_from_env(Self::ENV_MODEL_DIR);
        let embedding_dim =
            Self::parse_positive_from_env(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim)?;
        let token_limit = Self::parse_token_limit_from_env()?;
        let device = Self::parse_value_from_env(Self::ENV_DEVICE, defaults.device)?;
        let training = Self::parse_training_from_env(defaults.training)?;

        Ok(Self {
            embeddings_path,
            data_dir,
            item_ids,
            result_path,
            model_dir,
            embedding_dim,
            token_limit,
            device,
            training,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref path) = self.embeddings_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        if !self.data_dir.exists() {
            return Err(ConfigError::PathNotFound {
                path: self.data_dir.clone(),
            });
        }
        if !self.data_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.data_dir.clone(),
            });
        }

        if self.result_path.is_dir() {
            return Err(ConfigError::NotAFile {
                path: self.result_path.clone(),
            });
        }

        if let Some(ref dir) = self.model_dir
            && dir.exists()
            && !dir.is_dir()
        {
            return Err(ConfigError::NotADirectory { path: dir.clone() });
        }

        self.training
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                name: "training",
                value: String::new(),
                reason: e.to_string(),
            })
    }

    /// The embeddings path, or [`ConfigError::MissingEnvVar`] when unset.
    pub fn require_embeddings_path(&self) -> Result<&Path, ConfigError> {
        self.embeddings_path
            .as_deref()
            .ok_or(ConfigError::MissingEnvVar {
                name: Self::ENV_EMBEDDINGS_PATH,
            })
    }

    /// `{data_dir}/{item_id}_{split}.tsv`.
    pub fn split_path(&self, item_id: &str, split: &str) -> PathBuf {
        self.data_dir.join(format!("{item_id}_{split}.tsv"))
    }

    fn parse_training_from_env(defaults: TrainingConfig) -> Result<TrainingConfig, ConfigError> {
        let epochs = Self::parse_positive_from_env(Self::ENV_EPOCHS, defaults.epochs)?;
        let batch_size = Self::parse_positive_from_env(Self::ENV_BATCH_SIZE, defaults.batch_size)?;
        let eval_batch_size =
            Self::parse_positive_from_env(Self::ENV_EVAL_BATCH_SIZE, defaults.eval_batch_size)?;
        let optimizer = Self::parse_optimizer_from_env(defaults.optimizer)?;
        let learning_rate =
            Self::parse_value_from_env(Self::ENV_LEARNING_RATE, defaults.learning_rate)?;
        let loss = Self::parse_value_from_env(Self::ENV_LOSS, defaults.loss)?;
        let seed = Self::parse_value_from_env(Self::ENV_SEED, defaults.seed)?;

        let early_stopping = if Self::parse_bool_from_env(Self::ENV_EARLY_STOPPING, false)? {
            let base = defaults.early_stopping.unwrap_or_default();
            Some(EarlyStoppingConfig {
                patience: Self::parse_value_from_env(Self::ENV_PATIENCE, base.patience)?,
                ..base
            })
        } else {
            defaults.early_stopping
        };

        Ok(TrainingConfig {
            epochs,
            batch_size,
            eval_batch_size,
            optimizer,
            learning_rate,
            loss,
            early_stopping,
            seed,
            ..defaults
        })
    }

    fn parse_optimizer_from_env(default: OptimizerKind) -> Result<OptimizerKind, ConfigError> {
        match env::var(Self::ENV_OPTIMIZER) {
            Ok(value) => value.parse().map_err(|e: crate::training::TrainingError| {
                ConfigError::InvalidValue {
                    name: Self::ENV_OPTIMIZER,
                    value,
                    reason: e.to_string(),
                }
            }),
            Err(_) => Ok(default),
        }
    }

    /// A negative or zero limit means "no limit".
    fn parse_token_limit_from_env() -> Result<Option<usize>, ConfigError> {
        match env::var(Self::ENV_TOKEN_LIMIT) {
            Ok(value) => {
                let limit: i64 = value.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidValue {
                        name: Self::ENV_TOKEN_LIMIT,
                        value: value.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(usize::try_from(limit).ok().filter(|&n| n > 0))
            }
            Err(_) => Ok(None),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(var_name) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" | "" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    name: var_name,
                    value,
                    reason: "expected a boolean".to_string(),
                }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_value_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name: var_name,
                    value: value.clone(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_positive_from_env(
        var_name: &'static str,
        default: usize,
    ) -> Result<usize, ConfigError> {
        let value = Self::parse_value_from_env(var_name, default)?;
        if value == 0 {
            return Err(ConfigError::InvalidValue {
                name: var_name,
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(value)
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_list_from_env(var_name: &str) -> Vec<String> {
        env::var(var_name)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
