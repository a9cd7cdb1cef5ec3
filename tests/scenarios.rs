//! End-to-end compile scenarios.
//!
//! These tests drive the public `compile` entry point the way the agent's
//! startup does and check the observable artifacts and errors.

use anyhow::Result;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use agent_confgen::config::default_config_yaml;
use agent_confgen::utils::output::write_artifacts;
use agent_confgen::{compile, CompileError, CompileOptions, Platform, ValidationErrorKind};

fn linux() -> CompileOptions {
    CompileOptions {
        platform: Platform::Linux,
        logs_dir: "/var/log/agent".to_string(),
        state_dir: "/var/lib/agent".to_string(),
    }
}

fn windows() -> CompileOptions {
    CompileOptions::for_platform(Platform::Windows)
}

fn headers(text: &str) -> Vec<&str> {
    text.lines().filter(|line| line.starts_with('[')).collect()
}

fn validation_kind(result: Result<agent_confgen::Artifacts, CompileError>) -> ValidationErrorKind {
    match result {
        Err(CompileError::Validation(err)) => err.kind,
        other => panic!("expected a validation error, got {:?}", other),
    }
}

const SINGLE_FILE_PIPELINE: &str = r#"
logging:
  receivers:
    r1:
      type: files
      include_paths: [/var/log/app.log]
  service:
    pipelines:
      p1:
        receivers: [r1]
"#;

#[test]
fn test_single_file_pipeline_routes_to_default_exporter() -> Result<()> {
    let artifacts = compile(SINGLE_FILE_PIPELINE.as_bytes(), &linux())?;

    assert_eq!(
        headers(&artifacts.fluent_bit_main),
        vec!["[SERVICE]", "[INPUT]", "[FILTER]", "[OUTPUT]"]
    );
    assert!(artifacts.fluent_bit_main.contains("    Path              /var/log/app.log\n"));
    assert!(artifacts.fluent_bit_main.contains("    Tag               p1.r1\n"));
    assert!(artifacts.fluent_bit_main.contains("    Name        stackdriver\n"));
    assert!(artifacts.fluent_bit_main.contains("    Match_Regex ^(p1\\.r1)$\n"));
    assert_eq!(artifacts.fluent_bit_parser, "");
    // Metrics untouched, so the default host metrics pipeline is generated.
    let collectd = artifacts.collectd.as_deref().unwrap_or_default();
    assert!(collectd.contains("<LoadPlugin cpu>"));
    assert!(artifacts.otel.is_none());
    Ok(())
}

#[test]
fn test_missing_processor_reference() {
    let input = r#"
logging:
  receivers:
    r1:
      type: files
      include_paths: [/var/log/app.log]
  service:
    pipelines:
      p1:
        receivers: [r1]
        processors: [missing_proc]
"#;
    let result = compile(input.as_bytes(), &linux());
    let message = match &result {
        Err(err) => err.to_string(),
        Ok(_) => String::new(),
    };
    assert!(message.contains("p1"), "{}", message);
    assert!(message.contains("missing_proc"), "{}", message);
    assert!(matches!(
        validation_kind(result),
        ValidationErrorKind::UnresolvedReference { name, .. } if name == "missing_proc"
    ));
}

#[test]
fn test_two_receivers_with_one_name() {
    let input = r#"
logging:
  receivers:
    r1:
      type: files
      include_paths: [/var/log/a.log]
    r1:
      type: syslog
      transport_protocol: tcp
      listen_host: 0.0.0.0
      listen_port: 5140
"#;
    assert_eq!(
        validation_kind(compile(input.as_bytes(), &linux())),
        ValidationErrorKind::DuplicateName { name: "r1".into() }
    );
}

#[test]
fn test_linux_only_receiver_on_windows() {
    let input = r#"
metrics:
  receivers:
    web:
      type: nginx
      status_url: http://localhost/status
  service:
    pipelines:
      p1:
        receivers: [web]
"#;
    assert!(matches!(
        validation_kind(compile(input.as_bytes(), &windows())),
        ValidationErrorKind::PlatformMismatch {
            platform: Platform::Windows,
            ref type_name,
            ..
        } if type_name == "nginx"
    ));
    assert!(compile(input.as_bytes(), &linux()).is_ok());
}

#[test]
fn test_compile_is_deterministic() -> Result<()> {
    let input = r#"
logging:
  receivers:
    app:
      type: files
      include_paths: [/var/log/app/*.log]
    net:
      type: syslog
      transport_protocol: tcp
      listen_host: 127.0.0.1
      listen_port: 5140
  processors:
    json:
      type: parse_json
  service:
    pipelines:
      p1:
        receivers: [app, net]
        processors: [json]
      p2:
        receivers: [net]
metrics:
  receivers:
    host:
      type: hostmetrics
  processors:
    drop:
      type: exclude_metrics
      metrics_pattern: [processes/*]
  service:
    pipelines:
      m1:
        receivers: [host]
        processors: [drop]
"#;
    for options in [linux(), windows()] {
        let first = compile(input.as_bytes(), &options)?;
        for _ in 0..5 {
            assert_eq!(compile(input.as_bytes(), &options)?, first);
        }
    }
    Ok(())
}

#[test]
fn test_filter_order_follows_pipeline() -> Result<()> {
    let config = |order: &str| {
        format!(
            r#"
logging:
  receivers:
    r1:
      type: files
      include_paths: [/var/log/app.log]
  processors:
    a:
      type: parse_json
    b:
      type: parse_json
      field: payload
  service:
    pipelines:
      p1:
        receivers: [r1]
        processors: [{}]
"#,
            order
        )
    };

    let ab = compile(config("a, b").as_bytes(), &linux())?;
    let ba = compile(config("b, a").as_bytes(), &linux())?;

    let parser_filters = |main: &str| -> Vec<String> {
        main.lines()
            .filter(|line| line.starts_with("    Parser       "))
            .map(|line| line.trim_start_matches("    Parser       ").to_string())
            .collect()
    };
    assert_eq!(parser_filters(&ab.fluent_bit_main), vec!["a", "b"]);
    assert_eq!(parser_filters(&ba.fluent_bit_main), vec!["b", "a"]);
    let parser_a = ab.fluent_bit_parser.find("Name   a").unwrap();
    let parser_b = ab.fluent_bit_parser.find("Name   b").unwrap();
    assert!(parser_a < parser_b);
    let parser_a = ba.fluent_bit_parser.find("Name   a").unwrap();
    let parser_b = ba.fluent_bit_parser.find("Name   b").unwrap();
    assert!(parser_b < parser_a);

    // Apart from the order of the parser filters, the main configs agree.
    let (ab_rest, mut ab_filters) = split_parser_filters(&ab.fluent_bit_main);
    let (ba_rest, mut ba_filters) = split_parser_filters(&ba.fluent_bit_main);
    assert_eq!(ab_rest, ba_rest);
    assert_ne!(ab_filters, ba_filters);
    ab_filters.sort();
    ba_filters.sort();
    assert_eq!(ab_filters, ba_filters);
    Ok(())
}

/// Split a Fluent Bit main config into its parser `[FILTER]` stanzas and
/// everything else, keeping the order of both.
fn split_parser_filters(main: &str) -> (Vec<&str>, Vec<&str>) {
    main.split("\n\n").partition(|stanza| {
        !(stanza.starts_with("[FILTER]")
            && stanza
                .lines()
                .any(|line| line.split_whitespace().eq(["Name", "parser"])))
    })
}

#[test]
fn test_receiver_named_like_implicit_exporter() -> Result<()> {
    let input = r#"
logging:
  receivers:
    google:
      type: files
      include_paths: [/var/log/app.log]
  service:
    pipelines:
      p1:
        receivers: [google]
"#;
    for options in [linux(), windows()] {
        let artifacts = compile(input.as_bytes(), &options)?;
        let main = &artifacts.fluent_bit_main;
        assert!(main.contains("    Tag               p1.google\n"), "{}", main);
        assert!(main.contains("    Add   logName google\n"), "{}", main);
        assert_eq!(main.matches("[OUTPUT]").count(), 1);
        assert!(main.contains("    Match_Regex ^(p1\\.google)$\n"), "{}", main);
    }
    Ok(())
}

#[test]
fn test_explicit_defaults_compile_like_empty_config() -> Result<()> {
    for options in [linux(), windows()] {
        let explicit = default_config_yaml(options.platform)?;
        assert_eq!(compile(explicit.as_bytes(), &options)?, compile(b"", &options)?);
    }
    Ok(())
}

#[test]
fn test_windows_metrics_go_to_otel() -> Result<()> {
    let artifacts = compile(b"", &windows())?;
    assert!(artifacts.collectd.is_none());

    let otel: serde_yaml::Value =
        serde_yaml::from_str(artifacts.otel.as_deref().unwrap_or_default())?;
    let pipeline = &otel["service"]["pipelines"]["metrics/metrics_default_pipeline"];
    assert_eq!(pipeline["receivers"][0], "hostmetrics/metrics_hostmetrics");
    assert_eq!(pipeline["exporters"][0], "googlecloud/metrics_google");
    assert!(artifacts.fluent_bit_main.contains("    Name         winlog\n"));
    Ok(())
}

#[test]
fn test_failed_compile_writes_nothing() -> Result<()> {
    let out = TempDir::new()?;
    let bad = b"logging:\n  receivers:\n    r1:\n      type: bogus\n";

    if let Ok(artifacts) = compile(bad, &linux()) {
        write_artifacts(&artifacts, out.path())?;
    }
    assert_eq!(std::fs::read_dir(out.path())?.count(), 0);

    let artifacts = compile(SINGLE_FILE_PIPELINE.as_bytes(), &linux())?;
    write_artifacts(&artifacts, out.path())?;
    let mut written: Vec<String> = std::fs::read_dir(out.path())?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<_>>()?;
    written.sort();
    assert_eq!(
        written,
        vec!["collectd.conf", "fluent_bit_main.conf", "fluent_bit_parser.conf"]
    );
    Ok(())
}
