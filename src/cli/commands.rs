//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: take turns with the configured participants (default)
//! - config: print the effective configuration

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use turnstile::config::{ConfigOverrides, StrategyKind};

/// Turnstile - round-robin turn taking among threads
#[derive(Parser, Debug)]
#[command(name = "turnstile")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the participants until each has taken its turns
    Run(RunArgs),

    /// Print the effective configuration as YAML
    Config(OverrideArgs),
}

/// Arguments for `run`
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Print the run report as JSON after the turn messages
    #[arg(long)]
    pub json: bool,
}

/// Flags that override config file values
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Number of participants
    #[arg(short = 'n', long)]
    pub participants: Option<u32>,

    /// Turns each participant takes
    #[arg(short = 't', long = "turns")]
    pub target_turns: Option<u32>,

    /// Synchronization strategy (condvar, polling)
    #[arg(short, long)]
    pub strategy: Option<StrategyKind>,

    /// Sleep between token checks when polling
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Pause before spawning each participant
    #[arg(long)]
    pub start_delay_ms: Option<u64>,
}

impl OverrideArgs {
    pub fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            participants: self.participants,
            target_turns: self.target_turns,
            strategy: self.strategy,
            poll_interval_ms: self.poll_interval_ms,
            start_delay_ms: self.start_delay_ms,
        }
    }
}
