//! Backend generators. Each one is a pure function of the validated IR.

pub mod collectd;
pub mod fluent_bit;
pub mod otel;

use std::fmt::Debug;

use crate::catalog::TelemetryClass;
use crate::error::GenerationError;
use crate::ir::ResolvedComponent;
use crate::platform::Backend;

pub use fluent_bit::FluentBitConfig;
pub use otel::OtelOptions;

/// Turn a `*` glob into an anchored regex.
pub(crate) fn glob_to_regex(glob: &str) -> String {
    format!("^{}$", regex::escape(glob).replace(r"\*", ".*"))
}

pub(crate) fn missing_rule(
    backend: Backend,
    component: &ResolvedComponent,
    class: TelemetryClass,
) -> GenerationError {
    GenerationError::new(
        backend,
        component.path(class),
        format!("type \"{}\" has no {} rule", component.entry.type_name, backend),
    )
}

pub(crate) fn unexpected_rule(
    backend: Backend,
    component: &ResolvedComponent,
    class: TelemetryClass,
    rule: impl Debug,
) -> GenerationError {
    GenerationError::new(
        backend,
        component.path(class),
        format!("rule {:?} cannot render a {}", rule, component.kind),
    )
}

pub(crate) fn missing_param(
    backend: Backend,
    component: &ResolvedComponent,
    class: TelemetryClass,
    name: &str,
) -> GenerationError {
    GenerationError::new(
        backend,
        component.path(class).child(name),
        "resolved parameter is missing",
    )
}
