use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::compile::CompileOptions;
use crate::platform::Platform;

/// Command-line arguments for the agent-confgen tool.
///
/// Without a subcommand the tool compiles `--input` into the artifacts for
/// the selected platform and writes them to `--out-dir`.
#[derive(Parser, Debug)]
#[clap(name = "agent-confgen", about = "Compile a unified telemetry config into agent configs")]
pub struct Args {
    /// Path to the unified config YAML file
    #[clap(short, long)]
    pub input: Option<PathBuf>,

    /// Target platform (default: the host platform)
    #[clap(long, value_enum)]
    pub platform: Option<Platform>,

    /// Directory the agents write their own logs to (default: per platform)
    #[clap(long)]
    pub logs_dir: Option<String>,

    /// Directory for Fluent Bit buffers and offsets (default: per platform)
    #[clap(long)]
    pub state_dir: Option<String>,

    /// Directory the generated files are written to
    #[clap(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Verbose logging
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

impl Args {
    pub fn target_platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::host)
    }

    /// Compile options with the platform defaults overridden by any
    /// directories given on the command line.
    pub fn compile_options(&self) -> CompileOptions {
        let mut options = CompileOptions::for_platform(self.target_platform());
        if let Some(logs_dir) = &self.logs_dir {
            options.logs_dir = logs_dir.clone();
        }
        if let Some(state_dir) = &self.state_dir {
            options.state_dir = state_dir.clone();
        }
        options
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the built-in default config as an explicit unified config
    InitConfig {
        /// Path to output configuration file
        #[clap(default_value = "config.yaml")]
        path: PathBuf,

        /// Platform whose defaults are written (default: the host platform)
        #[clap(long, value_enum)]
        platform: Option<Platform>,
    },
}
