//! Configuration loaded from `datapass.toml`.
//!
//! Values missing from the file use defaults. The `DATAPASS_PAGE_URL`
//! environment variable takes precedence over the file's `page_url`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::loader::DATA_FILE_PATH;
use crate::sequencer::{Step, default_steps};

/// Config file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "datapass.toml";

/// Environment variable overriding `page_url`.
pub const PAGE_URL_ENV: &str = "DATAPASS_PAGE_URL";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatapassConfig {
    /// Path of the dataset, relative to the page origin.
    #[serde(default = "default_data_file_path")]
    pub data_file_path: String,

    /// URL of the page; with `render_to` it enables the page context.
    #[serde(default)]
    pub page_url: Option<String>,

    /// Document file that rendered fragments are appended to.
    #[serde(default)]
    pub render_to: Option<PathBuf>,

    /// Mode used when there is no page to read a fragment from.
    #[serde(default = "default_mode")]
    pub default_mode: String,

    /// Accepted modes.
    #[serde(default = "default_valid_modes")]
    pub valid_modes: Vec<String>,

    /// Delay before the timed value resolves.
    #[serde(default = "default_promise_delay_ms")]
    pub promise_delay_ms: u64,

    #[serde(default = "default_steps")]
    pub steps: Vec<Step>,
}

fn default_data_file_path() -> String {
    DATA_FILE_PATH.to_string()
}

fn default_mode() -> String {
    "x".to_string()
}

fn default_valid_modes() -> Vec<String> {
    vec!["x".to_string(), "y".to_string(), "z".to_string()]
}

fn default_promise_delay_ms() -> u64 {
    5
}

impl Default for DatapassConfig {
    fn default() -> Self {
        Self {
            data_file_path: default_data_file_path(),
            page_url: None,
            render_to: None,
            default_mode: default_mode(),
            valid_modes: default_valid_modes(),
            promise_delay_ms: default_promise_delay_ms(),
            steps: default_steps(),
        }
    }
}

impl DatapassConfig {
    /// Loads `datapass.toml` from the current directory, or defaults if it
    /// does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Loads the given file, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str::<DatapassConfig>(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(PAGE_URL_ENV)
            && !url.is_empty()
        {
            config.page_url = Some(url);
        }

        Ok(config)
    }

    pub fn is_valid_mode(&self, mode: &str) -> bool {
        self.valid_modes.iter().any(|m| m == mode)
    }
}
