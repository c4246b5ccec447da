//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Parametri di configurazione:
//! - `root_dir`: Directory radice da comprimere (default: `dist`)
//! - `workers`: Numero massimo di compressioni simultanee (default: numero di core)
//! - `json_output`: Emette eventi JSON invece delle righe colorate (default: false)
//!
//! ## Validazione:
//! - Controlla che workers sia > 0
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     workers: 8,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::CompressError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default root directory, relative to the working directory
pub const DEFAULT_ROOT_DIR: &str = "dist";

/// Configuration for a compression run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory tree to compress
    pub root_dir: PathBuf,
    /// Maximum number of codec processes running at once
    pub workers: usize,
    /// Output progress and results as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            workers: num_cpus::get().max(1),
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), CompressError> {
        if self.workers == 0 {
            return Err(CompressError::Validation(
                "Number of workers must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from file, falling back to defaults if it is absent
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
