//! Studio configuration module.
//!
//! Handles loading and validating `config.toml`. Config files are sparse —
//! every field has a sensible default and users override only what they
//! want. Unknown keys are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [api]
//! base_url = "http://localhost:3000"  # Task service root
//! # token = "..."                     # Bearer token, if the service requires one
//! task_name = "Remove Background"     # Display name for created tasks
//! template_name = "portrait"          # Processing template to run
//!
//! [polling]
//! interval_ms = 2000                  # Wait between status polls
//! max_attempts = 150                  # Poll budget before giving up
//!
//! [canvas]
//! width = 800                         # Composition canvas size
//! height = 600
//! max_display_size = 500              # Longer-side cap for the display fit
//! padding = 0                         # Margin kept around content bounds
//!
//! [templates]
//! dir = "templates"                   # Background template gallery
//!
//! [processing]
//! max_threads = 4                     # Max parallel workers (omit for auto = CPU cores)
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::imaging::CanvasSize;
use crate::pipeline::PipelineConfig;
use crate::task::PollConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Studio configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// Task service connection settings.
    pub api: ApiConfig,
    /// Status polling bounds.
    pub polling: PollingConfig,
    /// Composition canvas geometry.
    pub canvas: CanvasConfig,
    /// Background template gallery location.
    pub templates: TemplatesConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub task_name: String,
    pub template_name: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            token: None,
            task_name: "Remove Background".to_string(),
            template_name: "portrait".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            max_attempts: 150,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub max_display_size: u32,
    pub padding: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: crate::imaging::CONTAINER_WIDTH,
            height: crate::imaging::CONTAINER_HEIGHT,
            max_display_size: crate::imaging::MAX_DISPLAY_SIZE,
            padding: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatesConfig {
    pub dir: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: "templates".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum worker threads. Omit for auto (CPU cores).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_threads: Option<usize>,
}

impl StudioConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("api.base_url must be set".into()));
        }
        if self.polling.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "polling.interval_ms must be non-zero".into(),
            ));
        }
        if self.polling.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "polling.max_attempts must be non-zero".into(),
            ));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ConfigError::Validation(
                "canvas.width and canvas.height must be non-zero".into(),
            ));
        }
        if self.canvas.max_display_size == 0 {
            return Err(ConfigError::Validation(
                "canvas.max_display_size must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, fall back to `config.toml` in the working
    /// directory if present, else stock defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new("config.toml");
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn canvas_size(&self) -> CanvasSize {
        CanvasSize {
            width: self.canvas.width,
            height: self.canvas.height,
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.polling.interval_ms),
            max_attempts: self.polling.max_attempts,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            task_name: self.api.task_name.clone(),
            template_name: self.api.template_name.clone(),
            poll: self.poll_config(),
            padding: self.canvas.padding,
            max_display: self.canvas.max_display_size,
            canvas: self.canvas_size(),
        }
    }
}

/// Worker thread count: the configured cap, bounded by available cores.
/// Users can constrain down, not up.
pub fn effective_threads(processing: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    match processing.max_threads {
        Some(requested) => requested.clamp(1, cores),
        None => cores,
    }
}

/// The stock config file, with every option documented.
pub fn stock_config_toml() -> &'static str {
    r#"# cutout-studio configuration
# All options are optional - defaults shown below.

[api]
# Task service root. The studio calls:
#   POST {base_url}/api/file/upload
#   POST {base_url}/api/task/create
#   GET  {base_url}/api/task/{id}
base_url = "http://localhost:3000"
# Bearer token, if the service requires one
# token = ""
# Display name for created tasks
task_name = "Remove Background"
# Processing template the service runs
template_name = "portrait"

[polling]
# Wait between status polls, in milliseconds
interval_ms = 2000
# Poll budget before giving up with an error
max_attempts = 150

[canvas]
# Composition canvas size. Backgrounds stretch to exactly fill it.
width = 800
height = 600
# Longer-side cap when fitting the cutout for display
max_display_size = 500
# Extra margin kept around the content bounds when trimming
padding = 0

[templates]
# Directory scanned for selectable background images
dir = "templates"

[processing]
# Max parallel workers (omit for auto = CPU cores)
# max_threads = 4
"#
}
