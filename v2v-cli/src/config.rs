//! Configuration management for the v2v CLI.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use v2v_builder::{CredentialRefs, InventorySnapshot, PlanContext};
use v2v_common::LogFormat;

use crate::cli::Args;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Migration plan: namespace, provider URL and the mappings
    pub plan: PlanContext,
    /// Names of the import credential objects
    pub credentials: CredentialsConfig,
    /// Inventory snapshot path
    pub inventory: Option<String>,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config =
            serde_yaml::from_str(&content).with_context(|| "Failed to parse config file")?;

        Ok(config)
    }

    /// Apply CLI argument overrides to the configuration.
    pub fn with_cli_overrides(mut self, args: &Args) -> Self {
        if let Some(ref inventory) = args.inventory {
            self.inventory = Some(inventory.clone());
        }

        if let Some(ref namespace) = args.namespace {
            self.plan.namespace = namespace.clone();
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }

        if let Some(format) = args.log_format {
            self.logging.format = format;
        }

        self
    }

    /// Build a configuration from CLI arguments and defaults only.
    pub fn default_with_cli(args: &Args) -> Self {
        Self::default().with_cli_overrides(args)
    }

    pub fn credential_refs(&self) -> CredentialRefs {
        CredentialRefs {
            secret: self.credentials.secret.clone(),
            config_map: self.credentials.config_map.clone(),
        }
    }
}

/// Names of the secret and config map the caller created for the importer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub secret: String,
    pub config_map: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Load an inventory snapshot. `.json` files are read as JSON, anything else
/// as YAML.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<InventorySnapshot> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read inventory snapshot: {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let snapshot = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON snapshot: {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML snapshot: {}", path.display()))?
    };

    Ok(snapshot)
}
