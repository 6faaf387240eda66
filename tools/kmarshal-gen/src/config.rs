// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generator configuration.
//!
//! Supports both programmatic and file-based configuration.

use crate::layout::Resolution;
use crate::synth::SynthOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Cannot parse '{entry}': {message}")]
    Parse { entry: String, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Batch generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Path of the run-time crate in emitted code.
    #[serde(default = "default_crate_path")]
    pub crate_path: String,

    /// Emit type definitions next to the impls.
    #[serde(default = "default_true")]
    pub emit_definitions: bool,

    /// Derives attached to emitted definitions.
    #[serde(default = "default_derives")]
    pub derives: Vec<String>,

    /// How names outside the registry are treated.
    #[serde(default)]
    pub resolution: Resolution,

    /// Attach layout doc comments to emitted items.
    #[serde(default = "default_true")]
    pub emit_docs: bool,
}

fn default_crate_path() -> String {
    "::kmarshal".to_string()
}

fn default_true() -> bool {
    true
}

fn default_derives() -> Vec<String> {
    ["Clone", "Copy", "Debug", "PartialEq"]
        .iter()
        .map(|d| (*d).to_string())
        .collect()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            crate_path: default_crate_path(),
            emit_definitions: true,
            derives: default_derives(),
            resolution: Resolution::Strict,
            emit_docs: true,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crate_path.trim().is_empty() {
            return Err(ConfigError::Invalid("crate_path is empty".into()));
        }
        parse_path(&self.crate_path)?;
        for derive in &self.derives {
            parse_path(derive)?;
        }
        Ok(())
    }

    /// Options handed to the synthesizer.
    pub fn synth_options(&self) -> Result<SynthOptions, ConfigError> {
        Ok(SynthOptions {
            crate_path: parse_path(&self.crate_path)?,
            emit_docs: self.emit_docs,
        })
    }

    /// Derive paths for emitted definitions.
    pub fn derive_paths(&self) -> Result<Vec<syn::Path>, ConfigError> {
        self.derives.iter().map(|d| parse_path(d)).collect()
    }
}

fn parse_path(entry: &str) -> Result<syn::Path, ConfigError> {
    syn::parse_str(entry).map_err(|e| ConfigError::Parse {
        entry: entry.to_string(),
        message: e.to_string(),
    })
}
