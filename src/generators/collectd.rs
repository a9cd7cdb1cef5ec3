//! collectd configuration for the metrics section on Linux.
//!
//! collectd has no notion of pipelines: every used receiver is loaded once,
//! every used `exclude_metrics` processor contributes rules to one global
//! `PreCache` chain, and all values go to a single `write_gcm` writer.

use log::debug;

use crate::catalog::{CollectdPlugin, CollectdRule, ComponentKind, TelemetryClass};
use crate::constants::{COLLECTD_INTERVAL_SECS, COLLECTD_SELF_LOG};
use crate::error::{ConfigPath, GenerationError};
use crate::generators::{glob_to_regex, missing_param, missing_rule, unexpected_rule};
use crate::ir::{ResolvedComponent, SectionIr, ValidatedConfig};
use crate::platform::{Backend, Platform};

/// Generate the collectd config for the metrics section of `config`.
pub fn generate(config: &ValidatedConfig, logs_dir: &str) -> Result<String, GenerationError> {
    if config.platform != Platform::Linux {
        return Err(GenerationError::new(
            Backend::Collectd,
            ConfigPath::new(&[TelemetryClass::Metrics.section_key()]),
            format!("collectd is not available on {}", config.platform),
        ));
    }
    let section = &config.metrics;

    let log_file = format!("{}/{}", logs_dir, COLLECTD_SELF_LOG);
    let mut blocks = vec![
        format!(
            "LoadPlugin logfile\n<Plugin \"logfile\">\n  LogLevel \"info\"\n  File {}\n  Timestamp true\n</Plugin>\n",
            quote(&log_file).ok_or_else(|| {
                GenerationError::new(
                    Backend::Collectd,
                    ConfigPath::new(&[TelemetryClass::Metrics.section_key()]),
                    "logs directory cannot be written as a single line",
                )
            })?
        ),
        format!("Interval {}\n", COLLECTD_INTERVAL_SECS),
    ];

    let mut loaded = Vec::new();
    for id in section.used_components(ComponentKind::Receiver) {
        receiver_blocks(section.component(id), &mut loaded, &mut blocks)?;
    }

    let rules = filter_rules(section)?;
    if !rules.is_empty() {
        blocks.push("LoadPlugin match_regex\n".to_string());
        blocks.push(format!("<Chain \"PreCache\">\n{}</Chain>\n", rules.concat()));
    }

    let exporters = section.used_components(ComponentKind::Exporter);
    for id in &exporters {
        let exporter = section.component(*id);
        match rule(exporter)? {
            CollectdRule::WriteGcm => {}
            other => {
                return Err(unexpected_rule(
                    Backend::Collectd,
                    exporter,
                    TelemetryClass::Metrics,
                    other,
                ))
            }
        }
    }
    if !exporters.is_empty() {
        blocks.push(
            "LoadPlugin write_gcm\n<Plugin \"write_gcm\">\n  PrettyPrintJSON false\n</Plugin>\n"
                .to_string(),
        );
    }

    debug!("Generated collectd config with {} blocks", blocks.len());
    Ok(blocks.join("\n"))
}

/// Quote a collectd string, or `None` if it spans lines.
fn quote(value: &str) -> Option<String> {
    if value.contains(['\n', '\r']) {
        return None;
    }
    Some(format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\"")))
}

fn rule(component: &ResolvedComponent) -> Result<CollectdRule, GenerationError> {
    component
        .entry
        .collectd
        .ok_or_else(|| missing_rule(Backend::Collectd, component, TelemetryClass::Metrics))
}

fn quoted_param(component: &ResolvedComponent, name: &str) -> Result<String, GenerationError> {
    let value = component
        .str_param(name)
        .ok_or_else(|| missing_param(Backend::Collectd, component, TelemetryClass::Metrics, name))?;
    quote(value).ok_or_else(|| {
        GenerationError::new(
            Backend::Collectd,
            component.path(TelemetryClass::Metrics).child(name),
            "value cannot be written as a single line",
        )
    })
}

fn interval(component: &ResolvedComponent) -> u64 {
    component
        .param("collection_interval")
        .and_then(|value| value.as_duration_secs())
        .unwrap_or(COLLECTD_INTERVAL_SECS)
}

fn load_plugin(name: &str, interval: u64, loaded: &mut Vec<String>, blocks: &mut Vec<String>) {
    if loaded.iter().any(|plugin| plugin == name) {
        return;
    }
    loaded.push(name.to_string());
    blocks.push(format!("<LoadPlugin {}>\n  Interval {}\n</LoadPlugin>\n", name, interval));
}

fn receiver_blocks(
    receiver: &ResolvedComponent,
    loaded: &mut Vec<String>,
    blocks: &mut Vec<String>,
) -> Result<(), GenerationError> {
    let interval = interval(receiver);
    match rule(receiver)? {
        CollectdRule::PluginSet(plugins) => {
            for CollectdPlugin { name, options } in plugins {
                load_plugin(name, interval, loaded, blocks);
                if !options.is_empty() {
                    let body: String = options
                        .iter()
                        .map(|(key, value)| format!("  {} {}\n", key, value))
                        .collect();
                    blocks.push(format!("<Plugin \"{}\">\n{}</Plugin>\n", name, body));
                }
            }
        }
        CollectdRule::Plugin {
            plugin,
            instance,
            params,
        } => {
            load_plugin(plugin, interval, loaded, blocks);
            let indent = if instance { "    " } else { "  " };
            let mut body = String::new();
            for (unified, legacy) in params {
                let value = quoted_param(receiver, unified)?;
                body.push_str(&format!("{}{} {}\n", indent, legacy, value));
            }
            if instance {
                body = format!("  <Instance \"{}\">\n{}  </Instance>\n", receiver.name, body);
            }
            blocks.push(format!("<Plugin \"{}\">\n{}</Plugin>\n", plugin, body));
        }
        other => {
            return Err(unexpected_rule(
                Backend::Collectd,
                receiver,
                TelemetryClass::Metrics,
                other,
            ))
        }
    }
    Ok(())
}

/// `<Rule>` blocks for every pattern of every used exclude processor.
fn filter_rules(section: &SectionIr) -> Result<Vec<String>, GenerationError> {
    let mut rules = Vec::new();
    for id in section.used_components(ComponentKind::Processor) {
        let processor = section.component(id);
        match rule(processor)? {
            CollectdRule::MatchRegexChain => {}
            other => {
                return Err(unexpected_rule(
                    Backend::Collectd,
                    processor,
                    TelemetryClass::Metrics,
                    other,
                ))
            }
        }
        for (i, pattern) in processor.list_param("metrics_pattern").iter().enumerate() {
            let (group, metric) = pattern.split_once('/').ok_or_else(|| {
                GenerationError::new(
                    Backend::Collectd,
                    processor.path(TelemetryClass::Metrics).child("metrics_pattern"),
                    format!("pattern \"{}\" has no metric part", pattern),
                )
            })?;
            let plugin = quote(&glob_to_regex(group));
            let type_ = quote(&glob_to_regex(metric));
            let (plugin, type_) = match (plugin, type_) {
                (Some(plugin), Some(type_)) => (plugin, type_),
                _ => {
                    return Err(GenerationError::new(
                        Backend::Collectd,
                        processor.path(TelemetryClass::Metrics).child("metrics_pattern"),
                        format!("pattern \"{}\" cannot be written as a single line", pattern),
                    ))
                }
            };
            rules.push(format!(
                "  <Rule \"{}_{}\">\n    <Match \"regex\">\n      Plugin {}\n      Type {}\n    </Match>\n    Target \"stop\"\n  </Rule>\n",
                processor.name, i, plugin, type_
            ));
        }
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_unified_config;
    use crate::validate::validate;
    use pretty_assertions::assert_eq;

    fn generate_yaml(text: &str) -> String {
        let config = parse_unified_config(text.as_bytes()).unwrap();
        let ir = validate(&config, Platform::Linux).unwrap();
        generate(&ir, "/var/log/agent").unwrap()
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r#"a "b" \c"#).unwrap(), r#""a \"b\" \\c""#);
        assert_eq!(quote("a\nb"), None);
    }

    #[test]
    fn test_default_config() {
        let out = generate_yaml("");
        let expected = "\
LoadPlugin logfile
<Plugin \"logfile\">
  LogLevel \"info\"
  File \"/var/log/agent/metrics-module.log\"
  Timestamp true
</Plugin>

Interval 60

<LoadPlugin cpu>
  Interval 60
</LoadPlugin>

<Plugin \"cpu\">
  ValuesPercentage true
  ReportByCpu false
</Plugin>

<LoadPlugin df>
  Interval 60
</LoadPlugin>

<Plugin \"df\">
  FSType \"tmpfs\"
  IgnoreSelected true
  ValuesPercentage true
</Plugin>

<LoadPlugin disk>
  Interval 60
</LoadPlugin>

<LoadPlugin interface>
  Interval 60
</LoadPlugin>

<Plugin \"interface\">
  Interface \"lo\"
  IgnoreSelected true
</Plugin>

<LoadPlugin load>
  Interval 60
</LoadPlugin>

<LoadPlugin memory>
  Interval 60
</LoadPlugin>

<Plugin \"memory\">
  ValuesPercentage true
</Plugin>

<LoadPlugin processes>
  Interval 60
</LoadPlugin>

<LoadPlugin swap>
  Interval 60
</LoadPlugin>

<Plugin \"swap\">
  ValuesPercentage true
</Plugin>

LoadPlugin write_gcm
<Plugin \"write_gcm\">
  PrettyPrintJSON false
</Plugin>
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_third_party_receivers_and_filter() {
        let out = generate_yaml(
            r#"
metrics:
  receivers:
    web:
      type: nginx
      status_url: http://localhost/status
      collection_interval: 30s
    site_a:
      type: apache
      server_status_url: http://localhost/server-status?auto
    site_b:
      type: apache
      server_status_url: http://127.0.0.1:8080/server-status?auto
  processors:
    drop:
      type: exclude_metrics
      metrics_pattern: [processes/*, nginx/requests]
  service:
    pipelines:
      p1:
        receivers: [web, site_a, site_b]
        processors: [drop]
"#,
        );
        assert!(out.contains("<LoadPlugin nginx>\n  Interval 30\n</LoadPlugin>\n"));
        assert!(out.contains("<Plugin \"nginx\">\n  URL \"http://localhost/status\"\n</Plugin>\n"));
        assert_eq!(out.matches("<LoadPlugin apache>").count(), 1);
        assert!(out.contains(
            "<Plugin \"apache\">\n  <Instance \"site_b\">\n    URL \"http://127.0.0.1:8080/server-status?auto\"\n  </Instance>\n</Plugin>\n"
        ));
        assert!(out.contains("LoadPlugin match_regex\n"));
        assert!(out.contains(
            "  <Rule \"drop_0\">\n    <Match \"regex\">\n      Plugin \"^processes$\"\n      Type \"^.*$\"\n    </Match>\n    Target \"stop\"\n  </Rule>\n"
        ));
        assert!(out.contains("  <Rule \"drop_1\">"));
        assert!(!out.contains("<LoadPlugin cpu>"));
    }

    #[test]
    fn test_empty_filter_emits_no_chain() {
        let out = generate_yaml("");
        assert!(!out.contains("match_regex"));
        assert!(!out.contains("PreCache"));
    }

    #[test]
    fn test_refuses_windows() {
        let config = parse_unified_config(b"").unwrap();
        let ir = validate(&config, Platform::Windows).unwrap();
        let err = generate(&ir, "C:\\logs").unwrap_err();
        assert_eq!(
            err.to_string(),
            "collectd generation failed at metrics: collectd is not available on windows"
        );
    }
}
