//! Validated, reference-resolved pipeline model.
//!
//! This is the only structure the generators consume. Every pipeline holds
//! [`ComponentId`] handles into its section's component table, so no
//! generator ever sees a name that does not resolve.

use std::fmt;

use indexmap::IndexMap;

use crate::catalog::{CatalogEntry, ComponentKind, TelemetryClass};
use crate::error::ConfigPath;
use crate::platform::Platform;

/// A parameter value after it passed its schema check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    String(String),
    List(Vec<String>),
    Int(i64),
    /// Whole seconds.
    Duration(u64),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_duration_secs(&self) -> Option<u64> {
        match self {
            ParamValue::Duration(secs) => Some(*secs),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::String(s) => f.write_str(s),
            ParamValue::List(items) => f.write_str(&items.join(",")),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Duration(secs) => write!(f, "{}s", secs),
        }
    }
}

/// Handle to a component in its section's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(usize);

impl ComponentId {
    pub(crate) fn new(index: usize) -> Self {
        ComponentId(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// A component instance bound to its catalog entry.
#[derive(Debug, Clone)]
pub struct ResolvedComponent {
    pub name: String,
    pub kind: ComponentKind,
    pub entry: &'static CatalogEntry,
    /// Parameters in catalog schema order, defaults filled in.
    pub params: IndexMap<&'static str, ParamValue>,
}

impl ResolvedComponent {
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn str_param(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(ParamValue::as_str)
    }

    /// List parameter, empty when unset.
    pub fn list_param(&self, name: &str) -> &[String] {
        self.param(name).and_then(ParamValue::as_list).unwrap_or(&[])
    }

    /// Location of the declaration, used in generation errors.
    pub fn path(&self, class: TelemetryClass) -> ConfigPath {
        ConfigPath::new(&[class.section_key(), self.kind.section_key(), self.name.as_str()])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineIr {
    pub name: String,
    pub receivers: Vec<ComponentId>,
    pub processors: Vec<ComponentId>,
    pub exporters: Vec<ComponentId>,
}

impl PipelineIr {
    pub fn components(&self, kind: ComponentKind) -> &[ComponentId] {
        match kind {
            ComponentKind::Receiver => &self.receivers,
            ComponentKind::Processor => &self.processors,
            ComponentKind::Exporter => &self.exporters,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SectionIr {
    pub class: TelemetryClass,
    components: Vec<ResolvedComponent>,
    pipelines: Vec<PipelineIr>,
}

impl SectionIr {
    pub(crate) fn new(
        class: TelemetryClass,
        components: Vec<ResolvedComponent>,
        pipelines: Vec<PipelineIr>,
    ) -> Self {
        SectionIr {
            class,
            components,
            pipelines,
        }
    }

    pub fn component(&self, id: ComponentId) -> &ResolvedComponent {
        &self.components[id.0]
    }

    pub fn components(&self) -> &[ResolvedComponent] {
        &self.components
    }

    pub fn pipelines(&self) -> &[PipelineIr] {
        &self.pipelines
    }

    /// Names are unique per kind, but a built-in component may share its
    /// name with a declared component of another kind.
    pub fn find(&self, kind: ComponentKind, name: &str) -> Option<ComponentId> {
        self.components
            .iter()
            .position(|c| c.kind == kind && c.name == name)
            .map(ComponentId)
    }

    /// Components of `kind` referenced by any pipeline, in first-use order.
    pub fn used_components(&self, kind: ComponentKind) -> Vec<ComponentId> {
        let mut used = Vec::new();
        for pipeline in &self.pipelines {
            for id in pipeline.components(kind) {
                if !used.contains(id) {
                    used.push(*id);
                }
            }
        }
        used
    }
}

/// Output of a successful validation.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub platform: Platform,
    pub logging: SectionIr,
    pub metrics: SectionIr,
}

impl ValidatedConfig {
    pub fn section(&self, class: TelemetryClass) -> &SectionIr {
        match class {
            TelemetryClass::Logs => &self.logging,
            TelemetryClass::Metrics => &self.metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::lookup;

    fn component(name: &str, kind: ComponentKind, type_name: &str) -> ResolvedComponent {
        ResolvedComponent {
            name: name.to_string(),
            kind,
            entry: lookup(TelemetryClass::Logs, kind, type_name).unwrap(),
            params: IndexMap::new(),
        }
    }

    #[test]
    fn test_used_components_first_use_order() {
        let section = SectionIr::new(
            TelemetryClass::Logs,
            vec![
                component("a", ComponentKind::Processor, "parse_json"),
                component("b", ComponentKind::Processor, "parse_json"),
                component("r", ComponentKind::Receiver, "files"),
            ],
            vec![
                PipelineIr {
                    name: "p1".into(),
                    receivers: vec![ComponentId(2)],
                    processors: vec![ComponentId(1), ComponentId(0)],
                    exporters: vec![],
                },
                PipelineIr {
                    name: "p2".into(),
                    receivers: vec![ComponentId(2)],
                    processors: vec![ComponentId(0)],
                    exporters: vec![],
                },
            ],
        );
        assert_eq!(
            section.used_components(ComponentKind::Processor),
            vec![ComponentId(1), ComponentId(0)]
        );
        assert_eq!(section.used_components(ComponentKind::Receiver), vec![ComponentId(2)]);
        assert_eq!(section.find(ComponentKind::Processor, "b"), Some(ComponentId(1)));
        assert_eq!(section.find(ComponentKind::Receiver, "b"), None);
        assert_eq!(section.find(ComponentKind::Processor, "zzz"), None);
        assert_eq!(section.component(ComponentId(2)).name, "r");
    }

    #[test]
    fn test_param_value_display() {
        assert_eq!(ParamValue::Duration(60).to_string(), "60s");
        assert_eq!(
            ParamValue::List(vec!["/a".into(), "/b".into()]).to_string(),
            "/a,/b"
        );
        assert_eq!(ParamValue::Int(8).to_string(), "8");
    }

    #[test]
    fn test_component_path() {
        let c = component("r1", ComponentKind::Receiver, "files");
        assert_eq!(c.path(TelemetryClass::Logs).to_string(), "logging.receivers.r1");
        assert!(c.list_param("include_paths").is_empty());
        assert!(c.str_param("include_paths").is_none());
    }
}
