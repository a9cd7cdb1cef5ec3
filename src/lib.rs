//! # agent_confgen
//!
//! A compiler from one operator-authored telemetry config to the literal
//! configuration files of the collection agents running on a host.
//!
//! ## Overview
//!
//! Operators describe logging and metrics pipelines once, in a unified YAML
//! document. agent_confgen validates that document against a fixed catalog
//! of component types and the target platform, resolves it into a pipeline
//! IR, and generates:
//!
//! - a Fluent Bit main config and parser config for logs (both platforms),
//! - a collectd config for metrics on Linux,
//! - an OpenTelemetry collector config for metrics on Windows.
//!
//! Output is deterministic: the same document, platform and directories
//! always yield byte-identical artifacts.
//!
//! ## Usage
//!
//! ```no_run
//! use agent_confgen::{compile, CompileOptions, Platform};
//!
//! # fn main() -> anyhow::Result<()> {
//! let input = br#"
//! logging:
//!   receivers:
//!     app:
//!       type: files
//!       include_paths: [/var/log/app/*.log]
//!   service:
//!     pipelines:
//!       app_pipeline:
//!         receivers: [app]
//! "#;
//!
//! let artifacts = compile(input, &CompileOptions::for_platform(Platform::Linux))?;
//! for (name, content) in artifacts.files() {
//!     println!("{}: {} bytes", name, content.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`config`]: The unified document and its strict parser
//! - [`catalog`]: Built-in component types, defaults and generation rules
//! - [`validate`]: Semantic checks and reference resolution
//! - [`ir`]: The validated pipeline model
//! - [`generators`]: Fluent Bit, collectd and OpenTelemetry output
//! - [`error`]: Error types of every stage
//! - [`cli`]: Command-line interface definitions
//! - [`utils`]: Writing artifacts to disk
//! - [`constants`]: Fixed values baked into the artifacts

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Built-in catalog of component types
pub mod catalog;

/// Parse, validate and generate in one call
pub mod compile;

/// Unified config document and parser
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Error types for every compile stage
pub mod error;

/// Backend config generators
pub mod generators;

/// Validated pipeline model
pub mod ir;

/// Target platforms and backends
pub mod platform;

/// Artifact output helpers
pub mod utils;

/// Semantic validation
pub mod validate;

pub use compile::{compile, Artifacts, CompileOptions};
pub use error::{
    CompileError, ConfigPath, GenerationError, ParseError, ValidationError, ValidationErrorKind,
};
pub use platform::{Backend, Platform};
