//! Configuration types for the typeahead host.
//!
//! Loaded from a TOML file (see [`TypeaheadConfig::default_config_path`]);
//! every field is optional and falls back to its default.
//!
//! ```toml
//! corpus_path = "corpus/sample.json"
//!
//! [session]
//! per_page = 10
//! fuzzy = false
//! debounce_ms = 350
//!
//! [endpoint]
//! min_delay_ms = 120
//! max_delay_ms = 650
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use typeahead_search::SessionConfig;

use crate::error::{HostError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeaheadConfig {
    /// JSON corpus to load. The bundled sample corpus is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_path: Option<PathBuf>,
    /// Interactive session behaviour.
    pub session: SessionConfig,
    /// One-shot request boundary behaviour.
    pub endpoint: EndpointConfig,
}

/// Request boundary configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Lower bound of the artificial latency, in milliseconds.
    pub min_delay_ms: u64,
    /// Upper bound of the artificial latency, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 120,
            max_delay_ms: 650,
        }
    }
}

impl EndpointConfig {
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl TypeaheadConfig {
    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Search`] for an invalid `[session]` and
    /// [`HostError::Config`] for an inverted delay range.
    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;
        if self.endpoint.min_delay_ms > self.endpoint.max_delay_ms {
            return Err(HostError::Config(format!(
                "endpoint.min_delay_ms ({}) exceeds endpoint.max_delay_ms ({})",
                self.endpoint.min_delay_ms, self.endpoint.max_delay_ms
            )));
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/typeahead/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("typeahead").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("typeahead")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/typeahead-config/config.toml")
        }
    }
}
