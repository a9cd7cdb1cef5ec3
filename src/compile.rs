//! One-shot compile: bytes in, every artifact for the platform out.

use log::debug;

use crate::catalog::TelemetryClass;
use crate::config::parse_unified_config;
use crate::constants::{
    COLLECTD_FILE, FLUENT_BIT_MAIN_FILE, FLUENT_BIT_PARSER_FILE, LINUX_LOGS_DIR, LINUX_STATE_DIR,
    OTEL_FILE, WINDOWS_LOGS_DIR, WINDOWS_STATE_DIR,
};
use crate::error::{CompileError, ConfigPath, GenerationError};
use crate::generators::{collectd, fluent_bit, otel, OtelOptions};
use crate::ir::ValidatedConfig;
use crate::platform::{Backend, Platform};
use crate::validate::validate;

/// Parameters of a compile. The directories are substituted verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub platform: Platform,
    pub logs_dir: String,
    pub state_dir: String,
}

impl CompileOptions {
    /// Options using the agent's standard directories on `platform`.
    pub fn for_platform(platform: Platform) -> Self {
        let (logs_dir, state_dir) = match platform {
            Platform::Linux => (LINUX_LOGS_DIR, LINUX_STATE_DIR),
            Platform::Windows => (WINDOWS_LOGS_DIR, WINDOWS_STATE_DIR),
        };
        CompileOptions {
            platform,
            logs_dir: logs_dir.to_string(),
            state_dir: state_dir.to_string(),
        }
    }
}

/// Every artifact produced by one compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub fluent_bit_main: String,
    pub fluent_bit_parser: String,
    /// Present on Linux.
    pub collectd: Option<String>,
    /// Present on Windows.
    pub otel: Option<String>,
}

impl Artifacts {
    /// `(file name, content)` for every artifact present, in a fixed order.
    pub fn files(&self) -> Vec<(&'static str, &str)> {
        let mut files = vec![
            (FLUENT_BIT_MAIN_FILE, self.fluent_bit_main.as_str()),
            (FLUENT_BIT_PARSER_FILE, self.fluent_bit_parser.as_str()),
        ];
        if let Some(collectd) = &self.collectd {
            files.push((COLLECTD_FILE, collectd.as_str()));
        }
        if let Some(otel) = &self.otel {
            files.push((OTEL_FILE, otel.as_str()));
        }
        files
    }
}

/// Parse, validate and generate.
///
/// The logs and metrics backends only read the IR and run in parallel. When
/// both fail the logs error is reported.
pub fn compile(input: &[u8], options: &CompileOptions) -> Result<Artifacts, CompileError> {
    let config = parse_unified_config(input)?;
    let ir = validate(&config, options.platform)?;
    debug!("Validated config for {}", options.platform);

    let (logs, metrics) = rayon::join(
        || fluent_bit::generate(&ir, &options.logs_dir, &options.state_dir),
        || generate_metrics(&ir, options),
    );
    let fluent_bit = logs?;
    let (collectd, otel) = metrics?;

    Ok(Artifacts {
        fluent_bit_main: fluent_bit.main,
        fluent_bit_parser: fluent_bit.parser,
        collectd,
        otel,
    })
}

type MetricsArtifacts = (Option<String>, Option<String>);

fn generate_metrics(
    ir: &ValidatedConfig,
    options: &CompileOptions,
) -> Result<MetricsArtifacts, GenerationError> {
    match options.platform.metrics_backend() {
        Backend::Collectd => Ok((Some(collectd::generate(ir, &options.logs_dir)?), None)),
        Backend::Otel => Ok((None, Some(otel::generate(ir, OtelOptions::default())?))),
        Backend::FluentBit => Err(GenerationError::new(
            Backend::FluentBit,
            ConfigPath::new(&[TelemetryClass::Metrics.section_key()]),
            "fluent-bit does not handle metrics",
        )),
    }
}
