//! Built-in catalog of supported component types.
//!
//! Every component type the unified config may reference is described by a
//! [`CatalogEntry`]: its parameter schema, the platforms it is legal on and one
//! generation rule per backend. Adding a component type means adding a row to
//! the table in `entries.rs`; the validator and the generators are driven
//! entirely by that data.

mod defaults;
mod entries;

use std::fmt;

use serde_yaml::Value;

use crate::platform::Platform;

pub use defaults::{default_exporter, default_pipeline, DefaultComponent, DefaultPipeline};
pub use entries::CATALOG;

/// Telemetry class a section of the unified config describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TelemetryClass {
    Logs,
    Metrics,
}

impl TelemetryClass {
    /// Sections in the order they are validated and generated.
    pub const ALL: [TelemetryClass; 2] = [TelemetryClass::Logs, TelemetryClass::Metrics];

    /// Top-level key of the section in the unified config.
    pub fn section_key(self) -> &'static str {
        match self {
            TelemetryClass::Logs => "logging",
            TelemetryClass::Metrics => "metrics",
        }
    }
}

impl fmt::Display for TelemetryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryClass::Logs => write!(f, "logs"),
            TelemetryClass::Metrics => write!(f, "metrics"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Receiver,
    Processor,
    Exporter,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 3] = [
        ComponentKind::Receiver,
        ComponentKind::Processor,
        ComponentKind::Exporter,
    ];

    /// Key of the component table inside a section, also used in pipelines.
    pub fn section_key(self) -> &'static str {
        match self {
            ComponentKind::Receiver => "receivers",
            ComponentKind::Processor => "processors",
            ComponentKind::Exporter => "exporters",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Receiver => write!(f, "receiver"),
            ComponentKind::Processor => write!(f, "processor"),
            ComponentKind::Exporter => write!(f, "exporter"),
        }
    }
}

/// Shape a parameter value must have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    String,
    StringList { min_len: usize },
    Port,
    Int { min: i64, max: i64 },
    /// `<n>s`, `<n>m` or `<n>h`, no shorter than `min_secs`.
    Duration { min_secs: u64 },
    Enum(&'static [&'static str]),
    Regex,
    /// `<group>/<metric>` globs where `*` matches any run of characters.
    MetricPatterns,
}

/// Literal default carried by the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
    List(&'static [&'static str]),
}

impl DefaultValue {
    /// The default as it would have been written in a unified config.
    pub fn to_yaml(self) -> Value {
        match self {
            DefaultValue::Str(s) => Value::String(s.to_string()),
            DefaultValue::Int(i) => Value::Number(i.into()),
            DefaultValue::List(items) => Value::Sequence(
                items.iter().map(|item| Value::String(item.to_string())).collect(),
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
    Default(DefaultValue),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub requirement: Requirement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParserFormat {
    Json,
    Regex,
}

impl fmt::Display for ParserFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserFormat::Json => write!(f, "json"),
            ParserFormat::Regex => write!(f, "regex"),
        }
    }
}

/// How a component is rendered into the Fluent Bit main/parser configs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FluentBitRule {
    Tail,
    Syslog,
    Winlog,
    Parser(ParserFormat),
    Stackdriver,
}

/// A collectd plugin with fixed options, rendered verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectdPlugin {
    pub name: &'static str,
    pub options: &'static [(&'static str, &'static str)],
}

/// How a component is rendered into the collectd config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectdRule {
    /// Several plugins loaded together, no user parameters besides the interval.
    PluginSet(&'static [CollectdPlugin]),
    /// One plugin; `params` maps unified parameter names to collectd option
    /// names. With `instance` the options are wrapped in an `<Instance>` block
    /// named after the receiver.
    Plugin {
        plugin: &'static str,
        instance: bool,
        params: &'static [(&'static str, &'static str)],
    },
    MatchRegexChain,
    WriteGcm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PerfCounterSet {
    pub object: &'static str,
    pub instances: &'static str,
    pub counters: &'static [&'static str],
}

/// How a component is rendered into the OpenTelemetry collector config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtelRule {
    HostMetrics { scrapers: &'static [&'static str] },
    PerfCounters(&'static [PerfCounterSet]),
    FileLog,
    Syslog,
    WindowsEventLog,
    LogParser(ParserFormat),
    Filter,
    GoogleCloud,
}

impl OtelRule {
    /// Collector component type used as the prefix of generated ids.
    pub fn type_id(self) -> &'static str {
        match self {
            OtelRule::HostMetrics { .. } => "hostmetrics",
            OtelRule::PerfCounters(_) => "windowsperfcounters",
            OtelRule::FileLog => "filelog",
            OtelRule::Syslog => "syslog",
            OtelRule::WindowsEventLog => "windowseventlog",
            OtelRule::LogParser(_) => "logstransform",
            OtelRule::Filter => "filter",
            OtelRule::GoogleCloud => "googlecloud",
        }
    }
}

/// Declarative definition of one component type.
#[derive(Debug)]
pub struct CatalogEntry {
    pub class: TelemetryClass,
    pub kind: ComponentKind,
    pub type_name: &'static str,
    pub params: &'static [ParamSpec],
    pub platforms: &'static [Platform],
    /// At most one component of this type may be used per section.
    pub singleton: bool,
    pub fluent_bit: Option<FluentBitRule>,
    pub collectd: Option<CollectdRule>,
    pub otel: Option<OtelRule>,
}

impl CatalogEntry {
    pub fn supports(&self, platform: Platform) -> bool {
        self.platforms.contains(&platform)
    }

    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|spec| spec.name == name)
    }
}

/// Find the entry for `type_name` among the components of `class`/`kind`.
pub fn lookup(
    class: TelemetryClass,
    kind: ComponentKind,
    type_name: &str,
) -> Option<&'static CatalogEntry> {
    CATALOG
        .iter()
        .find(|e| e.class == class && e.kind == kind && e.type_name == type_name)
}

/// Type names known for `class`/`kind`, in catalog order, on any platform.
pub fn supported_types(class: TelemetryClass, kind: ComponentKind) -> Vec<&'static str> {
    CATALOG
        .iter()
        .filter(|e| e.class == class && e.kind == kind)
        .map(|e| e.type_name)
        .collect()
}
