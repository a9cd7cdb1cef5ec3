//! Fluent Bit main and parser configuration.
//!
//! Every pipeline becomes a run of stanzas in IR order: one `[INPUT]` per
//! receiver (each followed by a `modify` filter stamping the log name), one
//! parser `[FILTER]` per processor and one `[OUTPUT]` per exporter. Inputs
//! are tagged `<pipeline>.<receiver>`, so tags and offset databases never
//! collide between pipelines.

use log::debug;

use crate::catalog::{ComponentKind, FluentBitRule, ParserFormat, TelemetryClass};
use crate::constants::{
    DEFAULT_MESSAGE_PARSER, FLUENT_BIT_BACKLOG_MEM_LIMIT, FLUENT_BIT_BUFFER_CHUNK_SIZE,
    FLUENT_BIT_BUFFER_MAX_SIZE, FLUENT_BIT_FLUSH_SECS, FLUENT_BIT_HTTP_PORT,
    FLUENT_BIT_MAX_CHUNKS_UP, FLUENT_BIT_MEM_BUF_LIMIT, FLUENT_BIT_REFRESH_INTERVAL_SECS,
    FLUENT_BIT_RETRY_LIMIT, FLUENT_BIT_ROTATE_WAIT_SECS, FLUENT_BIT_SELF_LOG,
};
use crate::error::{ConfigPath, GenerationError};
use crate::generators::{missing_param, missing_rule, unexpected_rule};
use crate::ir::{PipelineIr, ResolvedComponent, SectionIr, ValidatedConfig};
use crate::platform::Backend;

/// The two Fluent Bit artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FluentBitConfig {
    pub main: String,
    /// Empty when no pipeline needs a parser.
    pub parser: String,
}

/// One `[NAME]` block of `Key Value` lines, keys padded to a common width.
struct Stanza {
    header: &'static str,
    path: ConfigPath,
    entries: Vec<(&'static str, String)>,
}

impl Stanza {
    fn new(header: &'static str, path: ConfigPath) -> Self {
        Stanza {
            header,
            path,
            entries: Vec::new(),
        }
    }

    fn entry(mut self, key: &'static str, value: impl ToString) -> Self {
        self.entries.push((key, value.to_string()));
        self
    }

    fn optional_entry(self, key: &'static str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.entry(key, value),
            None => self,
        }
    }

    fn render(&self, out: &mut String) -> Result<(), GenerationError> {
        let width = self.entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        out.push_str(&format!("[{}]\n", self.header));
        for (key, value) in &self.entries {
            if value.is_empty() || value.contains(['\n', '\r']) {
                return Err(GenerationError::new(
                    Backend::FluentBit,
                    self.path.clone(),
                    format!("value of {} cannot be written as a single line", key),
                ));
            }
            if value.trim() != value {
                return Err(GenerationError::new(
                    Backend::FluentBit,
                    self.path.clone(),
                    format!("value of {} would lose its leading or trailing whitespace", key),
                ));
            }
            out.push_str(&format!("    {:<width$} {}\n", key, value, width = width));
        }
        Ok(())
    }
}

fn render_all(stanzas: &[Stanza]) -> Result<String, GenerationError> {
    let mut out = String::new();
    for (i, stanza) in stanzas.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        stanza.render(&mut out)?;
    }
    Ok(out)
}

/// Generate the Fluent Bit configs for the logs section of `config`.
///
/// `logs_dir` and `state_dir` are used verbatim, joined with the platform's
/// path separator.
pub fn generate(
    config: &ValidatedConfig,
    logs_dir: &str,
    state_dir: &str,
) -> Result<FluentBitConfig, GenerationError> {
    let section = &config.logging;
    let sep = config.platform.path_separator();
    let buffers_dir = format!("{}{}buffers", state_dir, sep);

    let mut stanzas = vec![service_stanza(logs_dir, &buffers_dir, sep)];
    for pipeline in section.pipelines() {
        pipeline_stanzas(section, pipeline, &buffers_dir, sep, &mut stanzas)?;
    }
    let main = render_all(&stanzas)?;
    let parser = render_all(&parser_stanzas(section)?)?;

    debug!(
        "Generated Fluent Bit config: {} stanzas for {} pipelines",
        stanzas.len(),
        section.pipelines().len()
    );
    Ok(FluentBitConfig { main, parser })
}

fn service_stanza(logs_dir: &str, buffers_dir: &str, sep: char) -> Stanza {
    Stanza::new("SERVICE", ConfigPath::new(&[TelemetryClass::Logs.section_key()]))
        .entry("Daemon", "off")
        .entry("Flush", FLUENT_BIT_FLUSH_SECS)
        .entry("Log_File", format!("{}{}{}", logs_dir, sep, FLUENT_BIT_SELF_LOG))
        .entry("Log_Level", "info")
        .entry("HTTP_Server", "On")
        .entry("HTTP_Listen", "0.0.0.0")
        .entry("HTTP_PORT", FLUENT_BIT_HTTP_PORT)
        .entry("storage.path", buffers_dir)
        .entry("storage.sync", "normal")
        .entry("storage.checksum", "on")
        .entry("storage.backlog.mem_limit", FLUENT_BIT_BACKLOG_MEM_LIMIT)
        .entry("storage.metrics", "on")
        .entry("storage.max_chunks_up", FLUENT_BIT_MAX_CHUNKS_UP)
}

fn tag(pipeline: &PipelineIr, receiver: &ResolvedComponent) -> String {
    format!("{}.{}", pipeline.name, receiver.name)
}

/// Anchored alternation matching exactly `tags`.
fn match_regex(tags: &[String]) -> String {
    let escaped: Vec<String> = tags.iter().map(|tag| regex::escape(tag)).collect();
    format!("^({})$", escaped.join("|"))
}

fn rule(component: &ResolvedComponent) -> Result<FluentBitRule, GenerationError> {
    component
        .entry
        .fluent_bit
        .ok_or_else(|| missing_rule(Backend::FluentBit, component, TelemetryClass::Logs))
}

fn pipeline_stanzas(
    section: &SectionIr,
    pipeline: &PipelineIr,
    buffers_dir: &str,
    sep: char,
    stanzas: &mut Vec<Stanza>,
) -> Result<(), GenerationError> {
    let tags: Vec<String> = pipeline
        .receivers
        .iter()
        .map(|id| tag(pipeline, section.component(*id)))
        .collect();
    let match_regex = match_regex(&tags);

    for (id, tag) in pipeline.receivers.iter().zip(&tags) {
        let receiver = section.component(*id);
        let db = format!("{}{}{}", buffers_dir, sep, tag);
        stanzas.push(input_stanza(receiver, tag, &db)?);
        stanzas.push(
            Stanza::new("FILTER", receiver.path(TelemetryClass::Logs))
                .entry("Name", "modify")
                .entry("Match", tag)
                .entry("Add", format!("logName {}", receiver.name)),
        );
    }
    for id in &pipeline.processors {
        stanzas.push(filter_stanza(section.component(*id), &match_regex)?);
    }
    for id in &pipeline.exporters {
        stanzas.push(output_stanza(section.component(*id), &match_regex)?);
    }
    Ok(())
}

fn input_stanza(
    receiver: &ResolvedComponent,
    tag: &str,
    db: &str,
) -> Result<Stanza, GenerationError> {
    let path = receiver.path(TelemetryClass::Logs);
    let required = |name: &'static str| {
        receiver
            .param(name)
            .ok_or_else(|| missing_param(Backend::FluentBit, receiver, TelemetryClass::Logs, name))
    };

    let stanza = Stanza::new("INPUT", path);
    let stanza = match rule(receiver)? {
        FluentBitRule::Tail => stanza
            .entry("Name", "tail")
            .entry("Tag", tag)
            .entry("Path", required("include_paths")?)
            .optional_entry("Exclude_Path", receiver.param("exclude_paths"))
            .entry("DB", db)
            .entry("Read_from_Head", "True")
            .entry("Rotate_Wait", FLUENT_BIT_ROTATE_WAIT_SECS)
            .entry("Skip_Long_Lines", "On")
            .entry("Key", "message")
            .entry("Buffer_Chunk_Size", FLUENT_BIT_BUFFER_CHUNK_SIZE)
            .entry("Buffer_Max_Size", FLUENT_BIT_BUFFER_MAX_SIZE)
            .entry("Mem_Buf_Limit", FLUENT_BIT_MEM_BUF_LIMIT)
            .entry("storage.type", "filesystem")
            .entry("Refresh_Interval", FLUENT_BIT_REFRESH_INTERVAL_SECS),
        FluentBitRule::Syslog => stanza
            .entry("Name", "syslog")
            .entry("Tag", tag)
            .entry("Mode", required("transport_protocol")?)
            .entry("Listen", required("listen_host")?)
            .entry("Port", required("listen_port")?)
            .entry("Parser", DEFAULT_MESSAGE_PARSER)
            .entry("Buffer_Chunk_Size", FLUENT_BIT_BUFFER_CHUNK_SIZE)
            .entry("Buffer_Max_Size", FLUENT_BIT_BUFFER_MAX_SIZE)
            .entry("Mem_Buf_Limit", FLUENT_BIT_MEM_BUF_LIMIT)
            .entry("storage.type", "filesystem"),
        FluentBitRule::Winlog => stanza
            .entry("Name", "winlog")
            .entry("Tag", tag)
            .entry("Channels", required("channels")?)
            .entry("Interval_Sec", 1)
            .entry("DB", db),
        other => {
            return Err(unexpected_rule(
                Backend::FluentBit,
                receiver,
                TelemetryClass::Logs,
                other,
            ))
        }
    };
    Ok(stanza)
}

fn filter_stanza(
    processor: &ResolvedComponent,
    match_regex: &str,
) -> Result<Stanza, GenerationError> {
    match rule(processor)? {
        FluentBitRule::Parser(_) => Ok(Stanza::new("FILTER", processor.path(TelemetryClass::Logs))
            .entry("Name", "parser")
            .entry("Match_Regex", match_regex)
            .entry("Key_Name", processor.str_param("field").unwrap_or("message"))
            .entry("Parser", &processor.name)
            .entry("Reserve_Data", "True")),
        other => Err(unexpected_rule(Backend::FluentBit, processor, TelemetryClass::Logs, other)),
    }
}

fn output_stanza(
    exporter: &ResolvedComponent,
    match_regex: &str,
) -> Result<Stanza, GenerationError> {
    match rule(exporter)? {
        FluentBitRule::Stackdriver => Ok(Stanza::new("OUTPUT", exporter.path(TelemetryClass::Logs))
            .entry("Name", "stackdriver")
            .entry("Match_Regex", match_regex)
            .entry("resource", "gce_instance")
            .optional_entry("workers", exporter.param("workers"))
            .entry("Retry_Limit", FLUENT_BIT_RETRY_LIMIT)
            .entry("tls", "On")
            .entry("tls.verify", "Off")),
        other => Err(unexpected_rule(Backend::FluentBit, exporter, TelemetryClass::Logs, other)),
    }
}

/// `[PARSER]` stanzas for the used parse processors, in first-use order,
/// then the library parser syslog inputs reference.
fn parser_stanzas(section: &SectionIr) -> Result<Vec<Stanza>, GenerationError> {
    let mut stanzas = Vec::new();
    for id in section.used_components(ComponentKind::Processor) {
        let processor = section.component(id);
        let format = match rule(processor)? {
            FluentBitRule::Parser(format) => format,
            other => {
                return Err(unexpected_rule(
                    Backend::FluentBit,
                    processor,
                    TelemetryClass::Logs,
                    other,
                ))
            }
        };
        let regex = match format {
            ParserFormat::Regex => Some(processor.str_param("regex").ok_or_else(|| {
                missing_param(Backend::FluentBit, processor, TelemetryClass::Logs, "regex")
            })?),
            ParserFormat::Json => None,
        };
        stanzas.push(
            Stanza::new("PARSER", processor.path(TelemetryClass::Logs))
                .entry("Name", &processor.name)
                .entry("Format", format)
                .optional_entry("Regex", regex)
                .optional_entry("Time_Key", processor.str_param("time_key"))
                .optional_entry("Time_Format", processor.str_param("time_format")),
        );
    }

    let mut uses_syslog = false;
    for id in section.used_components(ComponentKind::Receiver) {
        if rule(section.component(id))? == FluentBitRule::Syslog {
            uses_syslog = true;
        }
    }
    if uses_syslog {
        stanzas.push(
            Stanza::new("PARSER", ConfigPath::new(&[TelemetryClass::Logs.section_key()]))
                .entry("Name", DEFAULT_MESSAGE_PARSER)
                .entry("Format", "regex")
                .entry("Regex", "^(?<message>.*)$"),
        );
    }
    Ok(stanzas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_unified_config;
    use crate::platform::Platform;
    use crate::validate::validate;
    use pretty_assertions::assert_eq;

    const LOGS_DIR: &str = "/var/log/agent";
    const STATE_DIR: &str = "/var/lib/agent";

    fn generate_yaml(text: &str, platform: Platform) -> FluentBitConfig {
        let config = parse_unified_config(text.as_bytes()).unwrap();
        let ir = validate(&config, platform).unwrap();
        generate(&ir, LOGS_DIR, STATE_DIR).unwrap()
    }

    fn stanza_headers(text: &str) -> Vec<&str> {
        text.lines().filter(|line| line.starts_with('[')).collect()
    }

    #[test]
    fn test_stanza_alignment() {
        let stanza = Stanza::new("INPUT", ConfigPath::default())
            .entry("Name", "tail")
            .entry("Buffer_Chunk_Size", "512k");
        let mut out = String::new();
        stanza.render(&mut out).unwrap();
        assert_eq!(
            out,
            "[INPUT]\n    Name              tail\n    Buffer_Chunk_Size 512k\n"
        );
    }

    #[test]
    fn test_line_break_in_value_is_generation_error() {
        let stanza = Stanza::new("INPUT", ConfigPath::new(&["logging", "receivers", "r1"]))
            .entry("Path", "/a\n[OUTPUT]");
        let err = stanza.render(&mut String::new()).unwrap_err();
        assert_eq!(err.backend, Backend::FluentBit);
        assert_eq!(
            err.to_string(),
            "fluent-bit generation failed at logging.receivers.r1: value of Path cannot be written as a single line"
        );
    }

    #[test]
    fn test_edge_whitespace_in_value_is_generation_error() {
        let stanza = Stanza::new("SERVICE", ConfigPath::new(&["logging"]))
            .entry("Log_File", "/var/log/agent /logging-module.log")
            .entry("storage.path", "/var/lib/agent/buffers ");
        let err = stanza.render(&mut String::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "fluent-bit generation failed at logging: value of storage.path would lose its leading or trailing whitespace"
        );
    }

    #[test]
    fn test_logs_dir_with_leading_space_rejected() {
        let config = parse_unified_config(b"").unwrap();
        let ir = validate(&config, Platform::Linux).unwrap();
        let err = generate(&ir, " /var/log/agent", STATE_DIR).unwrap_err();
        assert_eq!(err.backend, Backend::FluentBit);
    }

    #[test]
    fn test_match_regex_escapes_tags() {
        assert_eq!(
            match_regex(&["p1.r1".to_string(), "p-2.r2".to_string()]),
            r"^(p1\.r1|p\-2\.r2)$"
        );
    }

    #[test]
    fn test_default_linux_pipeline() {
        let out = generate_yaml("", Platform::Linux);
        assert_eq!(
            stanza_headers(&out.main),
            vec!["[SERVICE]", "[INPUT]", "[FILTER]", "[OUTPUT]"]
        );
        assert!(out.main.contains("    Path              /var/log/messages,/var/log/syslog\n"));
        assert!(out
            .main
            .contains("    DB                /var/lib/agent/buffers/default_pipeline.syslog\n"));
        assert!(out
            .main
            .contains("    Log_File                  /var/log/agent/logging-module.log\n"));
        assert!(out.main.contains("    Match_Regex ^(default_pipeline\\.syslog)$\n"));
        assert_eq!(out.parser, "");
    }

    #[test]
    fn test_windows_paths_use_backslash() {
        let config = parse_unified_config(b"").unwrap();
        let ir = validate(&config, Platform::Windows).unwrap();
        let out = generate(&ir, r"C:\logs", r"C:\run").unwrap();
        assert!(out
            .main
            .contains(r"    DB           C:\run\buffers\default_pipeline.windows_event_log"));
        assert!(out.main.contains("    Channels     System,Application,Security\n"));
        assert!(out.main.contains(r"C:\logs\logging-module.log"));
    }

    #[test]
    fn test_processors_and_parsers() {
        let out = generate_yaml(
            r#"
logging:
  receivers:
    app:
      type: files
      include_paths: [/var/log/app/*.log]
      exclude_paths: [/var/log/app/debug.log]
    net:
      type: syslog
      transport_protocol: tcp
      listen_host: 0.0.0.0
      listen_port: 5140
  processors:
    json:
      type: parse_json
      time_key: time
      time_format: "%Y-%m-%dT%H:%M:%S"
    access:
      type: parse_regex
      field: log
      regex: ^(?<host>[^ ]*) (?<path>.*)$
  service:
    pipelines:
      main:
        receivers: [app, net]
        processors: [access, json]
"#,
            Platform::Linux,
        );

        assert_eq!(
            stanza_headers(&out.main),
            vec![
                "[SERVICE]", "[INPUT]", "[FILTER]", "[INPUT]", "[FILTER]", "[FILTER]", "[FILTER]",
                "[OUTPUT]"
            ]
        );
        assert!(out.main.contains("    Exclude_Path      /var/log/app/debug.log\n"));
        assert!(out.main.contains("    Mode              tcp\n"));
        assert!(out.main.contains("    Port              5140\n"));
        assert!(out.main.contains("    Key_Name     log\n"));
        let access = out.main.find("    Parser       access\n").unwrap();
        let json = out.main.find("    Parser       json\n").unwrap();
        assert!(access < json);

        let expected_parser = "\
[PARSER]
    Name   access
    Format regex
    Regex  ^(?<host>[^ ]*) (?<path>.*)$

[PARSER]
    Name        json
    Format      json
    Time_Key    time
    Time_Format %Y-%m-%dT%H:%M:%S

[PARSER]
    Name   lib:default_message_parser
    Format regex
    Regex  ^(?<message>.*)$
";
        assert_eq!(out.parser, expected_parser);
    }

    #[test]
    fn test_pipelines_never_share_state() {
        let out = generate_yaml(
            r#"
logging:
  receivers:
    app:
      type: files
      include_paths: [/a]
  service:
    pipelines:
      first:
        receivers: [app]
      second:
        receivers: [app]
"#,
            Platform::Linux,
        );
        assert!(out.main.contains("/var/lib/agent/buffers/first.app\n"));
        assert!(out.main.contains("/var/lib/agent/buffers/second.app\n"));
        assert_eq!(out.main.matches("[OUTPUT]").count(), 2);
    }

    #[test]
    fn test_exporter_workers() {
        let out = generate_yaml(
            r#"
logging:
  receivers:
    app:
      type: files
      include_paths: [/a]
  exporters:
    cloud:
      type: google_cloud_logging
      workers: 2
  service:
    pipelines:
      main:
        receivers: [app]
        exporters: [cloud]
"#,
            Platform::Linux,
        );
        assert!(out.main.contains("    workers     2\n"));
    }
}
