use crate::catalog::{ComponentKind, DefaultValue, TelemetryClass};
use crate::platform::Platform;

/// A component instance the compiler declares on the operator's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultComponent {
    pub kind: ComponentKind,
    pub name: &'static str,
    pub type_name: &'static str,
    pub params: &'static [(&'static str, DefaultValue)],
}

/// Pipeline injected into a section that declares none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultPipeline {
    pub name: &'static str,
    pub components: &'static [DefaultComponent],
}

impl DefaultPipeline {
    /// Names of the components of `kind`, in the order the pipeline lists them.
    pub fn names(&self, kind: ComponentKind) -> Vec<&'static str> {
        self.components
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name)
            .collect()
    }
}

const LINUX_LOGS: DefaultPipeline = DefaultPipeline {
    name: "default_pipeline",
    components: &[DefaultComponent {
        kind: ComponentKind::Receiver,
        name: "syslog",
        type_name: "files",
        params: &[(
            "include_paths",
            DefaultValue::List(&["/var/log/messages", "/var/log/syslog"]),
        )],
    }],
};

const WINDOWS_LOGS: DefaultPipeline = DefaultPipeline {
    name: "default_pipeline",
    components: &[DefaultComponent {
        kind: ComponentKind::Receiver,
        name: "windows_event_log",
        type_name: "windows_event_log",
        params: &[(
            "channels",
            DefaultValue::List(&["System", "Application", "Security"]),
        )],
    }],
};

const METRICS: DefaultPipeline = DefaultPipeline {
    name: "default_pipeline",
    components: &[
        DefaultComponent {
            kind: ComponentKind::Receiver,
            name: "hostmetrics",
            type_name: "hostmetrics",
            params: &[("collection_interval", DefaultValue::Str("60s"))],
        },
        DefaultComponent {
            kind: ComponentKind::Processor,
            name: "metrics_filter",
            type_name: "exclude_metrics",
            params: &[("metrics_pattern", DefaultValue::List(&[]))],
        },
    ],
};

const LOGS_EXPORTER: DefaultComponent = DefaultComponent {
    kind: ComponentKind::Exporter,
    name: "google",
    type_name: "google_cloud_logging",
    params: &[],
};

const METRICS_EXPORTER: DefaultComponent = DefaultComponent {
    kind: ComponentKind::Exporter,
    name: "google",
    type_name: "google_cloud_monitoring",
    params: &[],
};

pub fn default_pipeline(class: TelemetryClass, platform: Platform) -> &'static DefaultPipeline {
    match (class, platform) {
        (TelemetryClass::Logs, Platform::Linux) => &LINUX_LOGS,
        (TelemetryClass::Logs, Platform::Windows) => &WINDOWS_LOGS,
        (TelemetryClass::Metrics, _) => &METRICS,
    }
}

/// Exporter a pipeline routes to when it lists none.
pub fn default_exporter(class: TelemetryClass) -> &'static DefaultComponent {
    match class {
        TelemetryClass::Logs => &LOGS_EXPORTER,
        TelemetryClass::Metrics => &METRICS_EXPORTER,
    }
}
