//! # CLI Configuration
//!
//! Settings come from four layers, highest first:
//!
//! 1. Command-line flags (`--state`, `--as`).
//! 2. Environment (`ARV_STATE`, `ARV_CALLER`), bound by clap onto the same
//!    flags, so layers 1 and 2 arrive here already merged.
//! 3. A YAML config file named by `--config`.
//! 4. Built-in defaults.
//!
//! ```yaml
//! state_path: /var/lib/arv/state.json
//! default_caller: InstA
//! administrator: admin
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use arv_core::CallerIdentity;

/// Snapshot path used when nothing else names one.
pub const DEFAULT_STATE_PATH: &str = "arv-state.json";

/// Contents of the YAML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Registry snapshot location.
    pub state_path: Option<PathBuf>,
    /// Caller identity used when `--as` is absent.
    pub default_caller: Option<String>,
    /// Administrator identity for `init` when `--admin` is absent.
    pub administrator: Option<String>,
}

impl CliConfig {
    /// Load the config file, or defaults when no file is named.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    /// Parse YAML config text. Empty text yields defaults.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Fully resolved settings for one CLI invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Registry snapshot file.
    pub state_path: PathBuf,
    /// Acting identity, if any layer supplied one.
    pub caller: Option<CallerIdentity>,
    /// Administrator identity from the config file.
    pub administrator: Option<CallerIdentity>,
    /// Emit JSON instead of text.
    pub json: bool,
}

impl Settings {
    /// Merge flag/env values over the config file and defaults.
    pub fn resolve(
        state_flag: Option<PathBuf>,
        caller_flag: Option<String>,
        config: &CliConfig,
        json: bool,
    ) -> Result<Self> {
        let state_path = state_flag
            .or_else(|| config.state_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH));
        let caller = caller_flag
            .or_else(|| config.default_caller.clone())
            .map(CallerIdentity::new)
            .transpose()
            .context("invalid caller identity")?;
        let administrator = config
            .administrator
            .as_deref()
            .map(CallerIdentity::new)
            .transpose()
            .context("invalid administrator identity in config")?;
        Ok(Self {
            state_path,
            caller,
            administrator,
            json,
        })
    }

    /// The acting identity; mutating commands require one.
    pub fn caller(&self) -> Result<&CallerIdentity> {
        self.caller
            .as_ref()
            .context("no caller identity: pass --as, set ARV_CALLER, or set default_caller in the config file")
    }
}
