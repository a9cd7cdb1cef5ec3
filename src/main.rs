use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use agent_confgen::cli::{Args, Commands};
use agent_confgen::compile;
use agent_confgen::config::create_default_config_file;
use agent_confgen::utils::output::write_artifacts;

fn main() -> Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    initialize_logging(args.verbose)?;

    // Handle subcommands
    if let Some(cmd) = &args.command {
        return handle_subcommand(cmd);
    }

    let input = args
        .input
        .as_deref()
        .ok_or_else(|| anyhow!("--input is required unless a subcommand is given"))?;
    compile_file(input, &args)
}

fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ).context("Failed to initialize logger")?;
    Ok(())
}

/// Handle subcommands (init-config)
fn handle_subcommand(cmd: &Commands) -> Result<()> {
    match cmd {
        Commands::InitConfig { path, platform } => {
            let platform = platform.unwrap_or_else(agent_confgen::Platform::host);
            info!("Creating default {} configuration file at {}", platform, path.display());
            create_default_config_file(path, platform)?;
            info!("Configuration created successfully");
            Ok(())
        }
    }
}

/// Compile `input` and write every artifact, or nothing on failure.
fn compile_file(input: &Path, args: &Args) -> Result<()> {
    let options = args.compile_options();
    info!(
        "Compiling {} for {} (logs: {}, state: {})",
        input.display(),
        options.platform,
        options.logs_dir,
        options.state_dir
    );

    let data = std::fs::read(input)
        .context(format!("Failed to read config file: {}", input.display()))?;
    let artifacts = compile(&data, &options)
        .context(format!("Failed to compile {}", input.display()))?;

    write_artifacts(&artifacts, &args.out_dir)?;
    info!("Generated {} files in {}", artifacts.files().len(), args.out_dir.display());
    Ok(())
}
