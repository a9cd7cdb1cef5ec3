use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_yaml::Value;

use crate::catalog::{ComponentKind, TelemetryClass};
use crate::error::ParseError;

/// The operator-authored document, decoded but not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnifiedConfig {
    #[serde(default, deserialize_with = "nullable")]
    pub logging: Section,
    #[serde(default, deserialize_with = "nullable")]
    pub metrics: Section,
}

/// One telemetry class: its components and the pipelines wiring them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Section {
    #[serde(default, deserialize_with = "nullable")]
    pub receivers: NamedEntries<RawComponent>,
    #[serde(default, deserialize_with = "nullable")]
    pub processors: NamedEntries<RawComponent>,
    #[serde(default, deserialize_with = "nullable")]
    pub exporters: NamedEntries<RawComponent>,
    #[serde(default, deserialize_with = "nullable")]
    pub service: Service,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Service {
    #[serde(default, deserialize_with = "nullable")]
    pub pipelines: NamedEntries<RawPipeline>,
}

/// A pipeline exactly as written: component names, in the listed order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPipeline {
    #[serde(default, deserialize_with = "nullable")]
    pub receivers: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub processors: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub exporters: Vec<String>,
}

impl RawPipeline {
    pub fn references(&self, kind: ComponentKind) -> &[String] {
        match kind {
            ComponentKind::Receiver => &self.receivers,
            ComponentKind::Processor => &self.processors,
            ComponentKind::Exporter => &self.exporters,
        }
    }
}

/// A declared component: its `type` plus whatever other keys were given.
///
/// Parameters stay untyped here; their schema depends on the type and is
/// checked against the catalog by the validator.
#[derive(Debug, Clone, PartialEq)]
pub struct RawComponent {
    pub type_name: String,
    pub params: IndexMap<String, Value>,
}

/// Name-keyed entries in document order.
///
/// Unlike a map this keeps repeated names, so the validator can report them
/// as duplicates instead of one silently replacing the other.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedEntries<T>(Vec<(String, T)>);

impl<T> NamedEntries<T> {
    pub fn new(entries: Vec<(String, T)>) -> Self {
        NamedEntries(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<T> Default for NamedEntries<T> {
    fn default() -> Self {
        NamedEntries(Vec::new())
    }
}

impl UnifiedConfig {
    /// Load and parse a unified config from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config = parse_unified_config(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;

        debug!("Loaded unified config from {}", path.display());
        Ok(config)
    }

    pub fn section(&self, class: TelemetryClass) -> &Section {
        match class {
            TelemetryClass::Logs => &self.logging,
            TelemetryClass::Metrics => &self.metrics,
        }
    }
}

impl Section {
    pub fn components(&self, kind: ComponentKind) -> &NamedEntries<RawComponent> {
        match kind {
            ComponentKind::Receiver => &self.receivers,
            ComponentKind::Processor => &self.processors,
            ComponentKind::Exporter => &self.exporters,
        }
    }

    pub fn pipelines(&self) -> &NamedEntries<RawPipeline> {
        &self.service.pipelines
    }
}

/// Decode a unified config document.
///
/// Decoding is strict: unknown keys, wrong value shapes and malformed YAML are
/// all rejected with the location of the offending node. A document that is
/// empty or only holds comments is an empty config.
pub fn parse_unified_config(data: &[u8]) -> std::result::Result<UnifiedConfig, ParseError> {
    let text = std::str::from_utf8(data)?;
    if is_blank_document(text) {
        debug!("Unified config is empty, using an empty config");
        return Ok(UnifiedConfig::default());
    }

    let config: Option<UnifiedConfig> = serde_yaml::from_str(text)?;
    Ok(config.unwrap_or_default())
}

fn is_blank_document(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}

/// Treat an explicit YAML null like an absent key.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for NamedEntries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = NamedEntries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of names to definitions")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some(name) = map.next_key::<String>()? {
                    let value = map.next_value::<T>()?;
                    entries.push((name, value));
                }
                Ok(NamedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

impl<'de> Deserialize<'de> for RawComponent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ComponentVisitor;

        impl<'de> Visitor<'de> for ComponentVisitor {
            type Value = RawComponent;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a component definition with a `type` key")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut type_name: Option<String> = None;
                let mut params = IndexMap::new();
                while let Some(key) = map.next_key::<String>()? {
                    if key == "type" {
                        if type_name.is_some() {
                            return Err(de::Error::duplicate_field("type"));
                        }
                        type_name = Some(map.next_value()?);
                    } else if params.contains_key(&key) {
                        return Err(de::Error::custom(format!("duplicate parameter `{}`", key)));
                    } else {
                        let value: Value = map.next_value()?;
                        params.insert(key, value);
                    }
                }
                let type_name = type_name.ok_or_else(|| de::Error::missing_field("type"))?;
                Ok(RawComponent { type_name, params })
            }
        }

        deserializer.deserialize_map(ComponentVisitor)
    }
}
