//! Helpers around the core compile that touch the filesystem.
//!
//! ## Writing Artifacts
//!
//! ```no_run
//! use agent_confgen::{compile, CompileOptions, Platform};
//! use agent_confgen::utils::output::write_artifacts;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let input = std::fs::read("config.yaml")?;
//! let artifacts = compile(&input, &CompileOptions::for_platform(Platform::Linux))?;
//! write_artifacts(&artifacts, Path::new("/etc/google-cloud-ops-agent/generated"))?;
//! # Ok(())
//! # }
//! ```

/// Artifact output to a directory
pub mod output;
