//! CLI module for turnstile - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
