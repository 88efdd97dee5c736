//! Configuration management for Educador IA
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{EducadorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Educador IA
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote generation endpoint settings
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Local history persistence settings
    #[serde(default)]
    pub history: HistoryConfig,
    /// Downloaded file settings
    #[serde(default)]
    pub export: ExportConfig,
    /// Template catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Gemini endpoint configuration
///
/// The text and image models are called through the same REST base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key (falls back to `GEMINI_API_KEY` / `API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,

    /// REST base URL; tests point this at a mock server
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model used for streamed lesson text
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model used for illustrations
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Sampling temperature for text generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Connect timeout, limit on the wait for streamed response headers and
    /// on the whole image request (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_temperature() -> f32 {
    crate::generation::instructions::TEXT_TEMPERATURE
}

fn default_timeout() -> u64 {
    120
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// History persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// SQLite file; `None` uses the platform data directory
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Name of the slot holding the serialized log
    #[serde(default = "default_slot")]
    pub slot: String,
}

fn default_slot() -> String {
    "educador_ia_history".to_string()
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            slot: default_slot(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory receiving `.txt` and `.png` downloads
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// Catalog source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog YAML file; `None` uses the bundled catalog
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EducadorError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| EducadorError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if self.gemini.api_key.is_none() {
            self.gemini.api_key = std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .ok()
                .filter(|key| !key.trim().is_empty());
        }

        if let Ok(api_base) = std::env::var("EDUCADOR_API_BASE") {
            self.gemini.api_base = api_base;
        }

        if let Ok(model) = std::env::var("EDUCADOR_TEXT_MODEL") {
            self.gemini.text_model = model;
        }

        if let Ok(model) = std::env::var("EDUCADOR_IMAGE_MODEL") {
            self.gemini.image_model = model;
        }

        if let Ok(temperature) = std::env::var("EDUCADOR_TEMPERATURE") {
            if let Ok(value) = temperature.parse() {
                self.gemini.temperature = value;
            } else {
                tracing::warn!("Invalid EDUCADOR_TEMPERATURE: {}", temperature);
            }
        }

        if let Ok(db_path) = std::env::var("EDUCADOR_HISTORY_DB") {
            self.history.db_path = Some(PathBuf::from(db_path));
        }

        if let Ok(dir) = std::env::var("EDUCADOR_EXPORT_DIR") {
            self.export.output_dir = PathBuf::from(dir);
        }

        if let Ok(path) = std::env::var("EDUCADOR_CATALOG") {
            self.catalog.path = Some(PathBuf::from(path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(path) = &cli.storage_path {
            tracing::info!("Using history DB override from CLI: {}", path.display());
            self.history.db_path = Some(path.clone());
        }

        if let Some(dir) = &cli.export_dir {
            self.export.output_dir = dir.clone();
        }
    }

    /// Validate the configuration
    ///
    /// The API key is not checked here; it is only required once the
    /// generation client is built.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if let Err(e) = url::Url::parse(&self.gemini.api_base) {
            return Err(EducadorError::Config(format!(
                "gemini.api_base is not a valid URL ({}): {}",
                self.gemini.api_base, e
            ))
            .into());
        }

        if self.gemini.text_model.trim().is_empty() {
            return Err(
                EducadorError::Config("gemini.text_model cannot be empty".to_string()).into(),
            );
        }

        if self.gemini.image_model.trim().is_empty() {
            return Err(
                EducadorError::Config("gemini.image_model cannot be empty".to_string()).into(),
            );
        }

        if !(0.0..=2.0).contains(&self.gemini.temperature) {
            return Err(EducadorError::Config(
                "gemini.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if self.gemini.timeout_seconds == 0 {
            return Err(EducadorError::Config(
                "gemini.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.history.slot.trim().is_empty() {
            return Err(EducadorError::Config("history.slot cannot be empty".to_string()).into());
        }

        Ok(())
    }
}
