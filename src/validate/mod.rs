//! Semantic validation: unified config in, validated IR out.
//!
//! Validation runs in a fixed order so the first reported fault is stable:
//! the `logging` section before `metrics`; inside a section, receivers, then
//! processors, then exporters (each in declaration order), then pipelines.

mod params;

use std::collections::HashSet;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::catalog::{self, ComponentKind, DefaultComponent, TelemetryClass};
use crate::config::{RawComponent, RawPipeline, Section, UnifiedConfig};
use crate::error::{ConfigPath, ValidationError, ValidationErrorKind};
use crate::ir::{ComponentId, PipelineIr, ResolvedComponent, SectionIr, ValidatedConfig};
use crate::platform::Platform;

lazy_static! {
    static ref NAME_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Validate `config` for `platform` and resolve every reference.
pub fn validate(
    config: &UnifiedConfig,
    platform: Platform,
) -> Result<ValidatedConfig, ValidationError> {
    let logging = SectionValidator::new(TelemetryClass::Logs, platform).run(&config.logging)?;
    let metrics = SectionValidator::new(TelemetryClass::Metrics, platform).run(&config.metrics)?;
    Ok(ValidatedConfig {
        platform,
        logging,
        metrics,
    })
}

struct SectionValidator {
    class: TelemetryClass,
    platform: Platform,
    components: Vec<ResolvedComponent>,
    /// Components referenced by some pipeline so far.
    used: Vec<ComponentId>,
}

impl SectionValidator {
    fn new(class: TelemetryClass, platform: Platform) -> Self {
        SectionValidator {
            class,
            platform,
            components: Vec::new(),
            used: Vec::new(),
        }
    }

    fn section_path(&self) -> ConfigPath {
        ConfigPath::new(&[self.class.section_key()])
    }

    fn component_path(&self, kind: ComponentKind, name: &str) -> ConfigPath {
        self.section_path().child(kind.section_key()).child(name)
    }

    fn run(mut self, section: &Section) -> Result<SectionIr, ValidationError> {
        for kind in ComponentKind::ALL {
            for (name, raw) in section.components(kind).iter() {
                self.declare(kind, name, raw)?;
            }
        }

        let pipelines: Vec<(String, RawPipeline)> = if section.pipelines().is_empty() {
            self.inject_default_pipeline()?
        } else {
            section
                .pipelines()
                .iter()
                .map(|(name, raw)| (name.to_string(), raw.clone()))
                .collect()
        };

        let pipelines_path = self.section_path().child("service").child("pipelines");
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(pipelines.len());
        for (name, raw) in &pipelines {
            let path = pipelines_path.child(name.as_str());
            check_name(name, &path)?;
            if !seen.insert(name.as_str()) {
                return Err(ValidationError::new(
                    path,
                    ValidationErrorKind::DuplicateName { name: name.clone() },
                ));
            }
            resolved.push(self.resolve_pipeline(name, raw, &path)?);
        }

        debug!(
            "Validated {} section: {} components, {} pipelines",
            self.class.section_key(),
            self.components.len(),
            resolved.len()
        );
        Ok(SectionIr::new(self.class, self.components, resolved))
    }

    /// Check one operator declaration and add it to the table.
    fn declare(
        &mut self,
        kind: ComponentKind,
        name: &str,
        raw: &RawComponent,
    ) -> Result<ComponentId, ValidationError> {
        let path = self.component_path(kind, name);
        check_name(name, &path)?;
        if self.components.iter().any(|c| c.name == name) {
            return Err(ValidationError::new(
                path,
                ValidationErrorKind::DuplicateName { name: name.to_string() },
            ));
        }
        self.bind(kind, name, raw, path)
    }

    /// Resolve a component against the catalog and add it to the table.
    fn bind(
        &mut self,
        kind: ComponentKind,
        name: &str,
        raw: &RawComponent,
        path: ConfigPath,
    ) -> Result<ComponentId, ValidationError> {
        let type_path = path.child("type");
        let entry = catalog::lookup(self.class, kind, &raw.type_name).ok_or_else(|| {
            ValidationError::new(
                type_path.clone(),
                ValidationErrorKind::UnknownComponentType {
                    class: self.class,
                    kind,
                    type_name: raw.type_name.clone(),
                    supported: catalog::supported_types(self.class, kind),
                },
            )
        })?;
        if !entry.supports(self.platform) {
            return Err(ValidationError::new(
                type_path,
                ValidationErrorKind::PlatformMismatch {
                    class: self.class,
                    kind,
                    type_name: raw.type_name.clone(),
                    platform: self.platform,
                },
            ));
        }

        let params = params::resolve_params(entry, &raw.params, &path)?;
        self.components.push(ResolvedComponent {
            name: name.to_string(),
            kind,
            entry,
            params,
        });
        Ok(ComponentId::new(self.components.len() - 1))
    }

    /// Declare a built-in component unless the operator already declared one
    /// of the same kind under that name, in which case theirs wins.
    ///
    /// Built-in names only have to be unique within their kind: an operator
    /// receiver called `google` does not clash with the implicit exporter.
    fn declare_default(
        &mut self,
        component: &DefaultComponent,
    ) -> Result<ComponentId, ValidationError> {
        match self.find(component.kind, component.name) {
            Some(id) => {
                debug!(
                    "Using declared {} {} \"{}\" in place of the built-in one",
                    self.class, component.kind, component.name
                );
                Ok(id)
            }
            None => {
                let raw = RawComponent {
                    type_name: component.type_name.to_string(),
                    params: component
                        .params
                        .iter()
                        .map(|(key, value)| (key.to_string(), value.to_yaml()))
                        .collect(),
                };
                let path = self.component_path(component.kind, component.name);
                self.bind(component.kind, component.name, &raw, path)
            }
        }
    }

    fn inject_default_pipeline(&mut self) -> Result<Vec<(String, RawPipeline)>, ValidationError> {
        let default = catalog::default_pipeline(self.class, self.platform);
        for component in default.components {
            self.declare_default(component)?;
        }
        debug!(
            "No {} pipelines declared, injecting \"{}\"",
            self.class.section_key(),
            default.name
        );

        let names = |kind: ComponentKind| -> Vec<String> {
            default.names(kind).into_iter().map(str::to_string).collect()
        };
        Ok(vec![(
            default.name.to_string(),
            RawPipeline {
                receivers: names(ComponentKind::Receiver),
                processors: names(ComponentKind::Processor),
                exporters: names(ComponentKind::Exporter),
            },
        )])
    }

    fn resolve_pipeline(
        &mut self,
        name: &str,
        raw: &RawPipeline,
        path: &ConfigPath,
    ) -> Result<PipelineIr, ValidationError> {
        if raw.receivers.is_empty() {
            return Err(ValidationError::new(
                path.child("receivers"),
                ValidationErrorKind::EmptyPipeline { pipeline: name.to_string() },
            ));
        }

        let mut resolved: [Vec<ComponentId>; 3] = Default::default();
        for (slot, kind) in ComponentKind::ALL.into_iter().enumerate() {
            let list_path = path.child(kind.section_key());
            for reference in raw.references(kind) {
                let id = self.find(kind, reference).ok_or_else(|| {
                    ValidationError::new(
                        list_path.clone(),
                        ValidationErrorKind::UnresolvedReference {
                            pipeline: name.to_string(),
                            kind,
                            name: reference.clone(),
                        },
                    )
                })?;
                if resolved[slot].contains(&id) {
                    return Err(ValidationError::new(
                        list_path,
                        ValidationErrorKind::DuplicateName { name: reference.clone() },
                    ));
                }
                self.mark_used(id, &list_path)?;
                resolved[slot].push(id);
            }
        }

        let [receivers, processors, mut exporters] = resolved;
        if exporters.is_empty() {
            exporters.push(self.declare_default(catalog::default_exporter(self.class))?);
        }
        Ok(PipelineIr {
            name: name.to_string(),
            receivers,
            processors,
            exporters,
        })
    }

    /// Record a pipeline reference, enforcing single-use component types.
    fn mark_used(&mut self, id: ComponentId, path: &ConfigPath) -> Result<(), ValidationError> {
        if self.used.contains(&id) {
            return Ok(());
        }
        let entry = self.component(id).entry;
        if entry.singleton
            && self
                .used
                .iter()
                .any(|other| std::ptr::eq(self.component(*other).entry, entry))
        {
            return Err(ValidationError::new(
                path.clone(),
                ValidationErrorKind::TooManyInstances {
                    class: self.class,
                    kind: entry.kind,
                    type_name: entry.type_name.to_string(),
                },
            ));
        }
        self.used.push(id);
        Ok(())
    }

    fn component(&self, id: ComponentId) -> &ResolvedComponent {
        &self.components[id.index()]
    }

    fn find(&self, kind: ComponentKind, name: &str) -> Option<ComponentId> {
        self.components
            .iter()
            .position(|c| c.kind == kind && c.name == name)
            .map(ComponentId::new)
    }
}

fn check_name(name: &str, path: &ConfigPath) -> Result<(), ValidationError> {
    if NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::new(
            path.clone(),
            ValidationErrorKind::InvalidName { name: name.to_string() },
        ))
    }
}
