//! Configuration management for the spikebus CLI

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spikebus_core::NeuronParams;

use crate::error::{CliError, CliResult};

/// Global CLI configuration
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Neuron constants used when no `--params` file is given
    pub neuron: NeuronParams,

    /// Output preferences
    pub output: OutputPreferences,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPreferences {
    /// Pretty-print JSON files
    pub pretty_json: bool,

    /// Log every spike while running scenarios
    pub log_spikes: bool,
}

impl Default for OutputPreferences {
    fn default() -> Self {
        Self {
            pretty_json: true,
            log_spikes: true,
        }
    }
}

impl CliConfig {
    /// Load configuration from file; a missing file yields the defaults
    pub fn load_from_file(path: &Path) -> CliResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)
                .map_err(|e| CliError::config(format!("Invalid config file {}: {}", path.display(), e)))?;
            config.neuron.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit path, or from the default location
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => match Self::default_config_path() {
                Ok(path) => Self::load_from_file(&path),
                Err(_) => Ok(Self::default()),
            },
        }
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> CliResult<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::config("Could not determine config directory"))?;
        Ok(config_dir.join("spikebus").join("config.toml"))
    }

    /// Neuron parameters, overridden by a standalone params file if given
    pub fn neuron_params(&self, params_file: Option<&Path>) -> CliResult<NeuronParams> {
        match params_file {
            Some(path) => load_params(path),
            None => Ok(self.neuron.clone()),
        }
    }

    /// Serialize JSON honoring the pretty-print preference
    pub fn to_json<T: Serialize>(&self, value: &T) -> CliResult<String> {
        let text = if self.output.pretty_json {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }
}

/// Load and validate a standalone neuron parameter file
pub fn load_params(path: &Path) -> CliResult<NeuronParams> {
    let content = std::fs::read_to_string(path)?;
    let params: NeuronParams = toml::from_str(&content)
        .map_err(|e| CliError::config(format!("Invalid params file {}: {}", path.display(), e)))?;
    params.validate()?;
    Ok(params)
}
