use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;

use cli::Cli;
use cli::commands::{Commands, OverrideArgs, RunArgs};
use turnstile::config::Config;
use turnstile::runner::TurnRunner;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("turnstile")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("turnstile.log");

    // Log to a file so stdout carries only the turn messages
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn effective_config(cli: &Cli, overrides: &OverrideArgs) -> Result<Config> {
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let overrides = overrides.to_overrides();
    if !overrides.is_empty() {
        info!("Applying command line overrides: {:?}", overrides);
        config.apply(&overrides);
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn run_application(cli: &Cli) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None => handle_run_command(cli, &RunArgs::default()),
        Some(Commands::Run(args)) => handle_run_command(cli, args),
        Some(Commands::Config(overrides)) => handle_config_command(cli, overrides),
    }
}

fn handle_run_command(cli: &Cli, args: &RunArgs) -> Result<()> {
    let config = effective_config(cli, &args.overrides)?;
    info!("Running with config: {:?}", config);

    let report = TurnRunner::new(config.runner_config())
        .run()
        .context("Turn taking failed")?;

    if args.json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    let summary = format!(
        "{} participants took {} turns in {}ms ({})",
        report.participants,
        report.total_turns(),
        report.elapsed_ms,
        report.strategy
    );
    if report.is_round_robin() && report.max_active <= 1 {
        println!("{} {}", "Done:".green(), summary);
    } else {
        println!("{} {}", "Out of order:".red(), summary);
        eyre::bail!("turns were not granted in round-robin order");
    }

    if cli.is_verbose() {
        let grants: Vec<String> = report.grants.iter().map(|id| id.to_string()).collect();
        println!("  Grant sequence: {}", grants.join(" "));
        println!("  Peak active participants: {}", report.max_active);
    }
    Ok(())
}

fn handle_config_command(cli: &Cli, overrides: &OverrideArgs) -> Result<()> {
    let config = effective_config(cli, overrides)?;
    print!("{}", config.to_yaml()?);
    Ok(())
}

fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli).context("Application failed")?;

    Ok(())
}
