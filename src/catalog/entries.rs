use crate::catalog::{
    CatalogEntry, CollectdPlugin, CollectdRule, ComponentKind, DefaultValue, FluentBitRule,
    OtelRule, ParamKind, ParamSpec, ParserFormat, PerfCounterSet, Requirement, TelemetryClass,
};
use crate::platform::Platform;

const ALL_PLATFORMS: &[Platform] = &[Platform::Linux, Platform::Windows];
const LINUX_ONLY: &[Platform] = &[Platform::Linux];
const WINDOWS_ONLY: &[Platform] = &[Platform::Windows];

const COLLECTION_INTERVAL: ParamSpec = ParamSpec {
    name: "collection_interval",
    kind: ParamKind::Duration { min_secs: 10 },
    requirement: Requirement::Default(DefaultValue::Str("60s")),
};

const PARSE_FIELD: ParamSpec = ParamSpec {
    name: "field",
    kind: ParamKind::String,
    requirement: Requirement::Default(DefaultValue::Str("message")),
};

const TIME_KEY: ParamSpec = ParamSpec {
    name: "time_key",
    kind: ParamKind::String,
    requirement: Requirement::Optional,
};

const TIME_FORMAT: ParamSpec = ParamSpec {
    name: "time_format",
    kind: ParamKind::String,
    requirement: Requirement::Optional,
};

// Logs receivers

const FILES_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "include_paths",
        kind: ParamKind::StringList { min_len: 1 },
        requirement: Requirement::Required,
    },
    ParamSpec {
        name: "exclude_paths",
        kind: ParamKind::StringList { min_len: 0 },
        requirement: Requirement::Optional,
    },
];

const SYSLOG_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "transport_protocol",
        kind: ParamKind::Enum(&["tcp", "udp"]),
        requirement: Requirement::Required,
    },
    ParamSpec {
        name: "listen_host",
        kind: ParamKind::String,
        requirement: Requirement::Required,
    },
    ParamSpec {
        name: "listen_port",
        kind: ParamKind::Port,
        requirement: Requirement::Required,
    },
];

const WINDOWS_EVENT_LOG_PARAMS: &[ParamSpec] = &[ParamSpec {
    name: "channels",
    kind: ParamKind::StringList { min_len: 1 },
    requirement: Requirement::Required,
}];

// Logs processors

const PARSE_JSON_PARAMS: &[ParamSpec] = &[PARSE_FIELD, TIME_KEY, TIME_FORMAT];

const PARSE_REGEX_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "regex",
        kind: ParamKind::Regex,
        requirement: Requirement::Required,
    },
    PARSE_FIELD,
    TIME_KEY,
    TIME_FORMAT,
];

// Logs exporters

const CLOUD_LOGGING_PARAMS: &[ParamSpec] = &[ParamSpec {
    name: "workers",
    kind: ParamKind::Int { min: 1, max: 64 },
    requirement: Requirement::Default(DefaultValue::Int(8)),
}];

// Metrics receivers

const HOSTMETRICS_PARAMS: &[ParamSpec] = &[COLLECTION_INTERVAL];

const NGINX_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "status_url",
        kind: ParamKind::String,
        requirement: Requirement::Required,
    },
    COLLECTION_INTERVAL,
];

const APACHE_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "server_status_url",
        kind: ParamKind::String,
        requirement: Requirement::Required,
    },
    COLLECTION_INTERVAL,
];

const PERF_COUNTER_PARAMS: &[ParamSpec] = &[COLLECTION_INTERVAL];

// Metrics processors

const EXCLUDE_METRICS_PARAMS: &[ParamSpec] = &[ParamSpec {
    name: "metrics_pattern",
    kind: ParamKind::MetricPatterns,
    requirement: Requirement::Default(DefaultValue::List(&[])),
}];

const HOSTMETRICS_COLLECTD_PLUGINS: &[CollectdPlugin] = &[
    CollectdPlugin {
        name: "cpu",
        options: &[("ValuesPercentage", "true"), ("ReportByCpu", "false")],
    },
    CollectdPlugin {
        name: "df",
        options: &[
            ("FSType", "\"tmpfs\""),
            ("IgnoreSelected", "true"),
            ("ValuesPercentage", "true"),
        ],
    },
    CollectdPlugin { name: "disk", options: &[] },
    CollectdPlugin {
        name: "interface",
        options: &[("Interface", "\"lo\""), ("IgnoreSelected", "true")],
    },
    CollectdPlugin { name: "load", options: &[] },
    CollectdPlugin {
        name: "memory",
        options: &[("ValuesPercentage", "true")],
    },
    CollectdPlugin { name: "processes", options: &[] },
    CollectdPlugin {
        name: "swap",
        options: &[("ValuesPercentage", "true")],
    },
];

const HOSTMETRICS_SCRAPERS: &[&str] = &[
    "cpu",
    "disk",
    "filesystem",
    "load",
    "memory",
    "network",
    "paging",
    "processes",
];

const IIS_COUNTERS: &[PerfCounterSet] = &[PerfCounterSet {
    object: "Web Service",
    instances: "_Total",
    counters: &[
        "Current Connections",
        "Total Bytes Received",
        "Total Bytes Sent",
        "Total Connection Attempts (all instances)",
        "Total Delete Requests",
        "Total Get Requests",
        "Total Head Requests",
        "Total Options Requests",
        "Total Post Requests",
        "Total Put Requests",
        "Total Trace Requests",
    ],
}];

const MSSQL_COUNTERS: &[PerfCounterSet] = &[
    PerfCounterSet {
        object: "SQLServer:General Statistics",
        instances: "",
        counters: &["User Connections"],
    },
    PerfCounterSet {
        object: "SQLServer:Databases",
        instances: "_Total",
        counters: &["Transactions/sec", "Write Transactions/sec"],
    },
];

/// Every component type the compiler understands.
pub static CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        class: TelemetryClass::Logs,
        kind: ComponentKind::Receiver,
        type_name: "files",
        params: FILES_PARAMS,
        platforms: ALL_PLATFORMS,
        singleton: false,
        fluent_bit: Some(FluentBitRule::Tail),
        collectd: None,
        otel: Some(OtelRule::FileLog),
    },
    CatalogEntry {
        class: TelemetryClass::Logs,
        kind: ComponentKind::Receiver,
        type_name: "syslog",
        params: SYSLOG_PARAMS,
        platforms: ALL_PLATFORMS,
        singleton: false,
        fluent_bit: Some(FluentBitRule::Syslog),
        collectd: None,
        otel: Some(OtelRule::Syslog),
    },
    CatalogEntry {
        class: TelemetryClass::Logs,
        kind: ComponentKind::Receiver,
        type_name: "windows_event_log",
        params: WINDOWS_EVENT_LOG_PARAMS,
        platforms: WINDOWS_ONLY,
        singleton: false,
        fluent_bit: Some(FluentBitRule::Winlog),
        collectd: None,
        otel: Some(OtelRule::WindowsEventLog),
    },
    CatalogEntry {
        class: TelemetryClass::Logs,
        kind: ComponentKind::Processor,
        type_name: "parse_json",
        params: PARSE_JSON_PARAMS,
        platforms: ALL_PLATFORMS,
        singleton: false,
        fluent_bit: Some(FluentBitRule::Parser(ParserFormat::Json)),
        collectd: None,
        otel: Some(OtelRule::LogParser(ParserFormat::Json)),
    },
    CatalogEntry {
        class: TelemetryClass::Logs,
        kind: ComponentKind::Processor,
        type_name: "parse_regex",
        params: PARSE_REGEX_PARAMS,
        platforms: ALL_PLATFORMS,
        singleton: false,
        fluent_bit: Some(FluentBitRule::Parser(ParserFormat::Regex)),
        collectd: None,
        otel: Some(OtelRule::LogParser(ParserFormat::Regex)),
    },
    CatalogEntry {
        class: TelemetryClass::Logs,
        kind: ComponentKind::Exporter,
        type_name: "google_cloud_logging",
        params: CLOUD_LOGGING_PARAMS,
        platforms: ALL_PLATFORMS,
        singleton: false,
        fluent_bit: Some(FluentBitRule::Stackdriver),
        collectd: None,
        otel: Some(OtelRule::GoogleCloud),
    },
    CatalogEntry {
        class: TelemetryClass::Metrics,
        kind: ComponentKind::Receiver,
        type_name: "hostmetrics",
        params: HOSTMETRICS_PARAMS,
        platforms: ALL_PLATFORMS,
        singleton: true,
        fluent_bit: None,
        collectd: Some(CollectdRule::PluginSet(HOSTMETRICS_COLLECTD_PLUGINS)),
        otel: Some(OtelRule::HostMetrics { scrapers: HOSTMETRICS_SCRAPERS }),
    },
    CatalogEntry {
        class: TelemetryClass::Metrics,
        kind: ComponentKind::Receiver,
        type_name: "nginx",
        params: NGINX_PARAMS,
        platforms: LINUX_ONLY,
        singleton: true,
        fluent_bit: None,
        collectd: Some(CollectdRule::Plugin {
            plugin: "nginx",
            instance: false,
            params: &[("status_url", "URL")],
        }),
        otel: None,
    },
    CatalogEntry {
        class: TelemetryClass::Metrics,
        kind: ComponentKind::Receiver,
        type_name: "apache",
        params: APACHE_PARAMS,
        platforms: LINUX_ONLY,
        singleton: false,
        fluent_bit: None,
        collectd: Some(CollectdRule::Plugin {
            plugin: "apache",
            instance: true,
            params: &[("server_status_url", "URL")],
        }),
        otel: None,
    },
    CatalogEntry {
        class: TelemetryClass::Metrics,
        kind: ComponentKind::Receiver,
        type_name: "iis",
        params: PERF_COUNTER_PARAMS,
        platforms: WINDOWS_ONLY,
        singleton: true,
        fluent_bit: None,
        collectd: None,
        otel: Some(OtelRule::PerfCounters(IIS_COUNTERS)),
    },
    CatalogEntry {
        class: TelemetryClass::Metrics,
        kind: ComponentKind::Receiver,
        type_name: "mssql",
        params: PERF_COUNTER_PARAMS,
        platforms: WINDOWS_ONLY,
        singleton: true,
        fluent_bit: None,
        collectd: None,
        otel: Some(OtelRule::PerfCounters(MSSQL_COUNTERS)),
    },
    CatalogEntry {
        class: TelemetryClass::Metrics,
        kind: ComponentKind::Processor,
        type_name: "exclude_metrics",
        params: EXCLUDE_METRICS_PARAMS,
        platforms: ALL_PLATFORMS,
        singleton: false,
        fluent_bit: None,
        collectd: Some(CollectdRule::MatchRegexChain),
        otel: Some(OtelRule::Filter),
    },
    CatalogEntry {
        class: TelemetryClass::Metrics,
        kind: ComponentKind::Exporter,
        type_name: "google_cloud_monitoring",
        params: &[],
        platforms: ALL_PLATFORMS,
        singleton: false,
        fluent_bit: None,
        collectd: Some(CollectdRule::WriteGcm),
        otel: Some(OtelRule::GoogleCloud),
    },
];
