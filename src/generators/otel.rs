//! OpenTelemetry collector configuration, used for metrics on Windows.
//!
//! The document is built as an ordered [`Mapping`] and serialized by
//! `serde_yaml`, so quoting follows YAML rules. Component ids are
//! `<collector type>/<section>_<name>`, which cannot collide: names are
//! unique per kind within a section, collector types differ between kinds
//! and names never contain `/`.

use std::collections::HashMap;

use log::debug;
use serde_yaml::{Mapping, Value};

use crate::catalog::{ComponentKind, OtelRule, ParserFormat, TelemetryClass};
use crate::constants::METRIC_TYPE_PREFIX;
use crate::error::{ConfigPath, GenerationError};
use crate::generators::{glob_to_regex, missing_param, missing_rule};
use crate::ir::{ComponentId, ResolvedComponent, SectionIr, ValidatedConfig};
use crate::platform::Backend;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OtelOptions {
    /// Also route the logs section through the collector.
    pub include_logs: bool,
}

fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Value {
    Value::Mapping(
        entries
            .into_iter()
            .map(|(key, value)| (Value::String(key.into()), value))
            .collect(),
    )
}

fn strings<S: ToString>(items: impl IntoIterator<Item = S>) -> Value {
    Value::Sequence(items.into_iter().map(|item| Value::String(item.to_string())).collect())
}

/// Collected top-level sections of the document.
#[derive(Default)]
struct Document {
    receivers: Mapping,
    processors: Mapping,
    exporters: Mapping,
    pipelines: Mapping,
}

impl Document {
    fn components(&mut self, kind: ComponentKind) -> &mut Mapping {
        match kind {
            ComponentKind::Receiver => &mut self.receivers,
            ComponentKind::Processor => &mut self.processors,
            ComponentKind::Exporter => &mut self.exporters,
        }
    }

    fn into_value(self) -> Value {
        let mut root = Mapping::new();
        root.insert("receivers".into(), Value::Mapping(self.receivers));
        if !self.processors.is_empty() {
            root.insert("processors".into(), Value::Mapping(self.processors));
        }
        root.insert("exporters".into(), Value::Mapping(self.exporters));
        root.insert("service".into(), mapping([("pipelines", Value::Mapping(self.pipelines))]));
        Value::Mapping(root)
    }
}

/// Generate the collector config. Metrics are always included; logs only
/// when `options.include_logs` is set.
pub fn generate(config: &ValidatedConfig, options: OtelOptions) -> Result<String, GenerationError> {
    let mut document = Document::default();
    if options.include_logs {
        add_section(&config.logging, &mut document)?;
    }
    add_section(&config.metrics, &mut document)?;

    let text = serde_yaml::to_string(&document.into_value())
        .map_err(|e| GenerationError::new(Backend::Otel, ConfigPath::default(), e.to_string()))?;
    debug!("Generated OpenTelemetry config ({} bytes)", text.len());
    Ok(text)
}

fn add_section(section: &SectionIr, document: &mut Document) -> Result<(), GenerationError> {
    let class = section.class;
    let mut ids: HashMap<ComponentId, Vec<String>> = HashMap::new();
    for kind in ComponentKind::ALL {
        for id in section.used_components(kind) {
            let rendered = render_component(section.component(id), class)?;
            ids.insert(id, rendered.iter().map(|(key, _)| key.clone()).collect());
            let target = document.components(kind);
            for (key, value) in rendered {
                target.insert(Value::String(key), value);
            }
        }
    }

    for pipeline in section.pipelines() {
        let mut entry = Mapping::new();
        for kind in ComponentKind::ALL {
            let names: Vec<&String> = pipeline
                .components(kind)
                .iter()
                .filter_map(|id| ids.get(id))
                .flatten()
                .collect();
            if !names.is_empty() {
                entry.insert(kind.section_key().into(), strings(names));
            }
        }
        let key = format!("{}/{}_{}", class, class.section_key(), pipeline.name);
        document.pipelines.insert(Value::String(key), Value::Mapping(entry));
    }
    Ok(())
}

/// Collector components for one IR component as `(id, config)` pairs.
///
/// Event log receivers expand to one receiver per channel; an exclude
/// filter without patterns renders to nothing.
fn render_component(
    component: &ResolvedComponent,
    class: TelemetryClass,
) -> Result<Vec<(String, Value)>, GenerationError> {
    let rule = component
        .entry
        .otel
        .ok_or_else(|| missing_rule(Backend::Otel, component, class))?;
    let id = format!("{}/{}_{}", rule.type_id(), class.section_key(), component.name);
    let required = |name: &'static str| {
        component
            .param(name)
            .ok_or_else(|| missing_param(Backend::Otel, component, class, name))
    };

    let config = match rule {
        OtelRule::HostMetrics { scrapers } => mapping([
            ("collection_interval", Value::String(required("collection_interval")?.to_string())),
            (
                "scrapers",
                mapping(scrapers.iter().map(|scraper| (*scraper, Value::Mapping(Mapping::new())))),
            ),
        ]),
        OtelRule::PerfCounters(sets) => {
            let perfcounters = sets
                .iter()
                .map(|set| {
                    let mut entries = vec![("object", Value::String(set.object.to_string()))];
                    if !set.instances.is_empty() {
                        entries.push(("instances", strings([set.instances])));
                    }
                    entries.push(("counters", strings(set.counters.iter())));
                    mapping(entries)
                })
                .collect();
            mapping([
                (
                    "collection_interval",
                    Value::String(required("collection_interval")?.to_string()),
                ),
                ("perfcounters", Value::Sequence(perfcounters)),
            ])
        }
        OtelRule::FileLog => {
            let mut entries = vec![("include", strings(component.list_param("include_paths")))];
            let exclude = component.list_param("exclude_paths");
            if !exclude.is_empty() {
                entries.push(("exclude", strings(exclude)));
            }
            entries.push(("start_at", Value::String("beginning".into())));
            mapping(entries)
        }
        OtelRule::Syslog => {
            let protocol = required("transport_protocol")?.to_string();
            let address = format!("{}:{}", required("listen_host")?, required("listen_port")?);
            mapping([
                (protocol, mapping([("listen_address", Value::String(address))])),
                ("protocol".to_string(), Value::String("rfc5424".into())),
            ])
        }
        OtelRule::WindowsEventLog => {
            return Ok(component
                .list_param("channels")
                .iter()
                .enumerate()
                .map(|(i, channel)| {
                    (
                        format!("{}_{}", id, i),
                        mapping([("channel", Value::String(channel.clone()))]),
                    )
                })
                .collect());
        }
        OtelRule::LogParser(format) => {
            let field = component.str_param("field").unwrap_or("message");
            let mut operator = vec![
                (
                    "type",
                    Value::String(
                        match format {
                            ParserFormat::Json => "json_parser",
                            ParserFormat::Regex => "regex_parser",
                        }
                        .into(),
                    ),
                ),
                ("parse_from", Value::String(format!("attributes.{}", field))),
            ];
            if format == ParserFormat::Regex {
                operator.push(("regex", Value::String(required("regex")?.to_string())));
            }
            if let Some(time_key) = component.str_param("time_key") {
                let mut timestamp =
                    vec![("parse_from", Value::String(format!("attributes.{}", time_key)))];
                if let Some(layout) = component.str_param("time_format") {
                    timestamp.push(("layout_type", Value::String("strptime".into())));
                    timestamp.push(("layout", Value::String(layout.to_string())));
                }
                operator.push(("timestamp", mapping(timestamp)));
            }
            mapping([("operators", Value::Sequence(vec![mapping(operator)]))])
        }
        OtelRule::Filter => {
            let patterns = component.list_param("metrics_pattern");
            if patterns.is_empty() {
                return Ok(Vec::new());
            }
            let names = patterns
                .iter()
                .map(|pattern| glob_to_regex(&format!("{}{}", METRIC_TYPE_PREFIX, pattern)));
            mapping([(
                "metrics",
                mapping([(
                    "exclude",
                    mapping([
                        ("match_type", Value::String("regexp".into())),
                        ("metric_names", strings(names)),
                    ]),
                )]),
            )])
        }
        OtelRule::GoogleCloud => match class {
            TelemetryClass::Metrics => mapping([(
                "metric",
                mapping([("prefix", Value::String(METRIC_TYPE_PREFIX.into()))]),
            )]),
            TelemetryClass::Logs => {
                let mut entries = Vec::new();
                if let Some(workers) = component.param("workers").and_then(|value| value.as_int()) {
                    entries.push((
                        "sending_queue",
                        mapping([("num_consumers", Value::Number(workers.into()))]),
                    ));
                }
                mapping(entries)
            }
        },
    };
    Ok(vec![(id, config)])
}
