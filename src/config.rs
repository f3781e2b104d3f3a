//! Configuration for Turnstile.
//!
//! Loaded from an explicit path, ~/.config/turnstile/turnstile.yml or
//! ./turnstile.yml, falling back to defaults. Command-line flags are applied
//! on top as `ConfigOverrides`.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::coordination::Strategy;
use crate::error::TurnstileError;
use crate::runner::RunnerConfig;

/// Which coordinator to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Condvar,
    Polling,
}

impl FromStr for StrategyKind {
    type Err = TurnstileError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "condvar" => Ok(StrategyKind::Condvar),
            "polling" => Ok(StrategyKind::Polling),
            other => Err(TurnstileError::InvalidConfig(format!(
                "unknown strategy '{}', expected condvar or polling",
                other
            ))),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Condvar => write!(f, "condvar"),
            StrategyKind::Polling => write!(f, "polling"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Number of participants (N).
    pub participants: u32,

    /// Turns each participant takes before completing.
    pub target_turns: u32,

    /// Synchronization strategy.
    pub strategy: StrategyKind,

    /// Sleep between token checks when polling.
    pub poll_interval_ms: u64,

    /// Pause before each participant thread is spawned.
    pub start_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            participants: 3,
            target_turns: 3,
            strategy: StrategyKind::Condvar,
            poll_interval_ms: 1,
            start_delay_ms: 0,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.participants == 0 {
            eyre::bail!("participants must be > 0");
        }
        if self.target_turns == 0 {
            eyre::bail!("target-turns must be > 0");
        }
        Ok(())
    }

    /// Apply command-line overrides on top of file values.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(participants) = overrides.participants {
            self.participants = participants;
        }
        if let Some(target_turns) = overrides.target_turns {
            self.target_turns = target_turns;
        }
        if let Some(strategy) = overrides.strategy {
            self.strategy = strategy;
        }
        if let Some(ms) = overrides.poll_interval_ms {
            self.poll_interval_ms = ms;
        }
        if let Some(ms) = overrides.start_delay_ms {
            self.start_delay_ms = ms;
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self.strategy {
            StrategyKind::Condvar => Strategy::Condvar,
            StrategyKind::Polling => Strategy::Polling {
                interval: Duration::from_millis(self.poll_interval_ms),
            },
        }
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig::new(self.participants, self.target_turns)
            .with_strategy(self.strategy())
            .with_start_delay(Duration::from_millis(self.start_delay_ms))
    }

    /// Render as YAML, as it would appear in a config file.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}

/// Values given on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub participants: Option<u32>,
    pub target_turns: Option<u32>,
    pub strategy: Option<StrategyKind>,
    pub poll_interval_ms: Option<u64>,
    pub start_delay_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Check if any overrides are set.
    pub fn is_empty(&self) -> bool {
        self.participants.is_none()
            && self.target_turns.is_none()
            && self.strategy.is_none()
            && self.poll_interval_ms.is_none()
            && self.start_delay_ms.is_none()
    }
}
