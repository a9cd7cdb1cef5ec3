//! Global constants for agent_confgen.
//!
//! This module centralizes the fixed values baked into generated artifacts
//! and the defaults used by the command-line tool.

// Directory defaults
/// Linux directory the sub-agents write their own logs to
pub const LINUX_LOGS_DIR: &str = "/var/log/google-cloud-ops-agent/subagents";

/// Linux directory holding Fluent Bit buffers and tail offsets
pub const LINUX_STATE_DIR: &str = "/var/lib/google-cloud-ops-agent/fluent-bit";

/// Windows directory the sub-agents write their own logs to
pub const WINDOWS_LOGS_DIR: &str = r"C:\ProgramData\Google\Cloud Operations\Ops Agent\log";

/// Windows directory holding Fluent Bit buffers and tail offsets
pub const WINDOWS_STATE_DIR: &str = r"C:\ProgramData\Google\Cloud Operations\Ops Agent\run";

// Fluent Bit tuning
/// Seconds between flushes of the output queue
pub const FLUENT_BIT_FLUSH_SECS: u32 = 1;

/// Port of the built-in HTTP monitoring server
pub const FLUENT_BIT_HTTP_PORT: u16 = 2020;

/// Memory cap for filesystem-backed chunks kept up
pub const FLUENT_BIT_BACKLOG_MEM_LIMIT: &str = "50M";

/// Maximum number of chunks kept in memory
pub const FLUENT_BIT_MAX_CHUNKS_UP: u32 = 128;

/// Read buffer for tail and syslog inputs
pub const FLUENT_BIT_BUFFER_CHUNK_SIZE: &str = "512k";

/// Upper bound a read buffer may grow to for long lines
pub const FLUENT_BIT_BUFFER_MAX_SIZE: &str = "5M";

/// Per-input memory buffer limit
pub const FLUENT_BIT_MEM_BUF_LIMIT: &str = "10M";

/// Seconds a rotated file keeps being watched
pub const FLUENT_BIT_ROTATE_WAIT_SECS: u32 = 30;

/// Seconds between rescans of tail path globs
pub const FLUENT_BIT_REFRESH_INTERVAL_SECS: u32 = 60;

/// Retries before a chunk is dropped by the output
pub const FLUENT_BIT_RETRY_LIMIT: u32 = 3;

/// Parser attached to syslog inputs
pub const DEFAULT_MESSAGE_PARSER: &str = "lib:default_message_parser";

/// File Fluent Bit writes its own log to, under the logs directory
pub const FLUENT_BIT_SELF_LOG: &str = "logging-module.log";

// Metrics
/// Global collectd interval in seconds
pub const COLLECTD_INTERVAL_SECS: u64 = 60;

/// File collectd writes its own log to, under the logs directory
pub const COLLECTD_SELF_LOG: &str = "metrics-module.log";

/// Prefix of every metric type written to Cloud Monitoring
pub const METRIC_TYPE_PREFIX: &str = "agent.googleapis.com/";

// Artifact file names
/// Fluent Bit main configuration
pub const FLUENT_BIT_MAIN_FILE: &str = "fluent_bit_main.conf";

/// Fluent Bit parser definitions
pub const FLUENT_BIT_PARSER_FILE: &str = "fluent_bit_parser.conf";

/// collectd configuration (Linux)
pub const COLLECTD_FILE: &str = "collectd.conf";

/// OpenTelemetry collector configuration (Windows)
pub const OTEL_FILE: &str = "otel.yaml";
