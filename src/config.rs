// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{Result, SearchError};
use crate::models::DatasetType;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
    pub gpt: GptConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    pub dir: PathBuf,
    pub microarray_table: String,
    pub rnaseq_table: String,
    pub embedding_dim: usize,
}

impl IndexConfig {
    pub fn table_name(&self, dataset_type: DatasetType) -> &str {
        match dataset_type {
            DatasetType::Microarray => &self.microarray_table,
            DatasetType::RnaSeq => &self.rnaseq_table,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GptConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_workers: usize,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("GEO_SEARCH")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| SearchError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| SearchError::Config(e.to_string()))?;

        config.apply_env_fallbacks();
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        dotenv().ok();

        let mut config = Self {
            index: IndexConfig {
                dir: PathBuf::from("data/geo_index"),
                microarray_table: "microarray".to_string(),
                rnaseq_table: "rnaseq".to_string(),
                embedding_dim: 768,
            },
            embedding: EmbeddingConfig {
                api_url: "https://api.openai.com/v1".to_string(),
                model: "text-embedding-3-small".to_string(),
                api_key: None,
            },
            gpt: GptConfig {
                api_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
                api_key: None,
                temperature: 0.0,
                max_workers: 4,
                timeout_secs: 30,
                max_retries: 3,
            },
        };

        config.apply_env_fallbacks();
        config
    }

    /// Both API sections fall back to OPENAI_API_KEY when no key is set
    /// explicitly, matching the convention of OpenAI-compatible tooling.
    fn apply_env_fallbacks(&mut self) {
        if self.embedding.api_key.is_none() {
            self.embedding.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if self.gpt.api_key.is_none() {
            self.gpt.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
    }

    fn validate(&self) -> Result<()> {
        if self.index.embedding_dim == 0 {
            return Err(SearchError::Config(
                "embedding_dim must be greater than 0".to_string(),
            ));
        }

        if self.gpt.max_workers == 0 {
            return Err(SearchError::Config(
                "max_workers must be greater than 0".to_string(),
            ));
        }

        if self.gpt.timeout_secs == 0 {
            return Err(SearchError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
