use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde_yaml::{Mapping, Value};

use crate::catalog::{default_pipeline, ComponentKind, TelemetryClass};
use crate::platform::Platform;

/// The built-in default pipelines of `platform`, written out as an explicit
/// unified config.
///
/// Compiling this document gives the same artifacts as compiling an empty
/// one, so it is a convenient starting point for operators.
pub fn default_config_yaml(platform: Platform) -> std::result::Result<String, serde_yaml::Error> {
    let mut root = Mapping::new();
    for class in TelemetryClass::ALL {
        let pipeline = default_pipeline(class, platform);
        let mut section = Mapping::new();

        for kind in ComponentKind::ALL {
            let mut components = Mapping::new();
            for component in pipeline.components.iter().filter(|c| c.kind == kind) {
                let mut body = Mapping::new();
                body.insert("type".into(), component.type_name.into());
                for (key, value) in component.params {
                    body.insert((*key).into(), value.to_yaml());
                }
                components.insert(component.name.into(), Value::Mapping(body));
            }
            if !components.is_empty() {
                section.insert(kind.section_key().into(), Value::Mapping(components));
            }
        }

        let mut references = Mapping::new();
        for kind in ComponentKind::ALL {
            let names = pipeline.names(kind);
            if !names.is_empty() {
                references.insert(
                    kind.section_key().into(),
                    Value::Sequence(names.into_iter().map(Value::from).collect()),
                );
            }
        }
        let mut pipelines = Mapping::new();
        pipelines.insert(pipeline.name.into(), Value::Mapping(references));
        let mut service = Mapping::new();
        service.insert("pipelines".into(), Value::Mapping(pipelines));
        section.insert("service".into(), Value::Mapping(service));

        root.insert(class.section_key().into(), Value::Mapping(section));
    }
    serde_yaml::to_string(&root)
}

/// Write the default unified config for `platform` to `path`.
pub fn create_default_config_file(path: &Path, platform: Platform) -> Result<()> {
    let yaml = default_config_yaml(platform).context("Failed to serialize default config")?;
    fs::write(path, yaml)
        .context(format!("Failed to write config file: {}", path.display()))?;
    info!("Wrote default {} config to {}", platform, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_unified_config;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_parses() {
        for platform in [Platform::Linux, Platform::Windows] {
            let yaml = default_config_yaml(platform).unwrap();
            let config = parse_unified_config(yaml.as_bytes()).unwrap();
            assert_eq!(config.logging.pipelines().len(), 1);
            assert_eq!(config.metrics.processors.len(), 1);
        }
    }

    #[test]
    fn test_linux_default_config_content() {
        let yaml = default_config_yaml(Platform::Linux).unwrap();
        let config = parse_unified_config(yaml.as_bytes()).unwrap();
        let (name, receiver) = config.logging.receivers.iter().next().unwrap();
        assert_eq!(name, "syslog");
        assert_eq!(receiver.type_name, "files");
        assert!(receiver.params.contains_key("include_paths"));
    }

    #[test]
    fn test_create_default_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        create_default_config_file(&path, Platform::Windows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("windows_event_log"));
    }
}
