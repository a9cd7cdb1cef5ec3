//! Error types for every compile stage.
//!
//! Error texts are compared verbatim against reference expectations, so each
//! error is plain data (kind + path + detail) rendered by exactly one
//! `Display` implementation.

use std::fmt;

use thiserror::Error;

use crate::catalog::{ComponentKind, TelemetryClass};
use crate::platform::{Backend, Platform};

/// Dotted location inside the unified config, e.g. `logging.receivers.r1.type`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConfigPath(Vec<String>);

impl ConfigPath {
    pub fn new<S: AsRef<str>>(segments: &[S]) -> Self {
        ConfigPath(segments.iter().map(|s| s.as_ref().to_string()).collect())
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        ConfigPath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// The unified config could not be decoded.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unified config is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),

    #[error("unified config is not valid: {0}")]
    Invalid(#[from] serde_yaml::Error),
}

/// What a [`ValidationError`] is about.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationErrorKind {
    #[error("unknown {class} {kind} type \"{type_name}\"; supported types: [{}]", .supported.join(", "))]
    UnknownComponentType {
        class: TelemetryClass,
        kind: ComponentKind,
        type_name: String,
        supported: Vec<&'static str>,
    },

    #[error("{class} {kind} type \"{type_name}\" is not supported on {platform}")]
    PlatformMismatch {
        class: TelemetryClass,
        kind: ComponentKind,
        type_name: String,
        platform: Platform,
    },

    #[error("invalid parameter: {detail}")]
    InvalidParameter { detail: String },

    #[error("duplicate name \"{name}\"")]
    DuplicateName { name: String },

    #[error("pipeline \"{pipeline}\" references undeclared {kind} \"{name}\"")]
    UnresolvedReference {
        pipeline: String,
        kind: ComponentKind,
        name: String,
    },

    #[error("pipeline \"{pipeline}\" declares no receivers")]
    EmptyPipeline { pipeline: String },

    #[error("invalid name \"{name}\": names may only contain letters, digits, '_' and '-'")]
    InvalidName { name: String },

    #[error("at most one {class} {kind} of type \"{type_name}\" may be used")]
    TooManyInstances {
        class: TelemetryClass,
        kind: ComponentKind,
        type_name: String,
    },
}

/// The config parsed but violates the catalog, platform or reference rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {kind}")]
pub struct ValidationError {
    pub path: ConfigPath,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(path: ConfigPath, kind: ValidationErrorKind) -> Self {
        ValidationError { path, kind }
    }

    pub fn invalid_parameter(path: ConfigPath, detail: impl Into<String>) -> Self {
        ValidationError::new(
            path,
            ValidationErrorKind::InvalidParameter {
                detail: detail.into(),
            },
        )
    }
}

/// A generator met something validation should have rejected.
///
/// This always points at a defect in the catalog or the validator, never at
/// the operator's input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{backend} generation failed at {path}: {detail}")]
pub struct GenerationError {
    pub backend: Backend,
    pub path: ConfigPath,
    pub detail: String,
}

impl GenerationError {
    pub fn new(backend: Backend, path: ConfigPath, detail: impl Into<String>) -> Self {
        GenerationError {
            backend,
            path,
            detail: detail.into(),
        }
    }
}

/// Any failure of a whole compile.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
