//! Parameter checks driven by the catalog's parameter schemas.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde_yaml::Value;

use crate::catalog::{CatalogEntry, ParamKind, Requirement};
use crate::error::{ConfigPath, ValidationError};
use crate::ir::ParamValue;

lazy_static! {
    static ref METRIC_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9_.*-]+/[A-Za-z0-9_.*-]+$").unwrap();
}

/// Check `raw` against the schema of `entry` and fill in defaults.
///
/// Unknown parameters are reported first, in declaration order; then every
/// schema parameter is checked in catalog order.
pub(crate) fn resolve_params(
    entry: &'static CatalogEntry,
    raw: &IndexMap<String, Value>,
    path: &ConfigPath,
) -> Result<IndexMap<&'static str, ParamValue>, ValidationError> {
    for key in raw.keys() {
        if entry.param(key).is_none() {
            let supported: Vec<&str> = entry.params.iter().map(|spec| spec.name).collect();
            return Err(ValidationError::invalid_parameter(
                path.child(key.as_str()),
                format!(
                    "unknown parameter for type \"{}\"; supported parameters: [{}]",
                    entry.type_name,
                    supported.join(", ")
                ),
            ));
        }
    }

    let mut resolved = IndexMap::new();
    for spec in entry.params {
        let param_path = path.child(spec.name);
        let value = match raw.get(spec.name) {
            Some(value) if !value.is_null() => check_value(spec.kind, value, &param_path)?,
            _ => match spec.requirement {
                Requirement::Required => {
                    return Err(ValidationError::invalid_parameter(
                        param_path,
                        "parameter is required",
                    ))
                }
                Requirement::Optional => continue,
                Requirement::Default(default) => {
                    check_value(spec.kind, &default.to_yaml(), &param_path)?
                }
            },
        };
        resolved.insert(spec.name, value);
    }
    Ok(resolved)
}

fn check_value(
    kind: ParamKind,
    value: &Value,
    path: &ConfigPath,
) -> Result<ParamValue, ValidationError> {
    let invalid = |detail: String| ValidationError::invalid_parameter(path.clone(), detail);

    match kind {
        ParamKind::String => {
            let s = value
                .as_str()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| invalid("expected a non-empty string".into()))?;
            check_text(s).map_err(invalid)?;
            Ok(ParamValue::String(s.to_string()))
        }
        ParamKind::StringList { min_len } => {
            let items =
                string_list(value).ok_or_else(|| invalid("expected a list of strings".into()))?;
            if items.len() < min_len {
                return Err(invalid(format!("expected at least {} item(s)", min_len)));
            }
            for item in &items {
                check_list_item(item).map_err(invalid)?;
            }
            Ok(ParamValue::List(items))
        }
        ParamKind::Port => int_in_range(value, 1, 65535).map(ParamValue::Int).map_err(invalid),
        ParamKind::Int { min, max } => {
            int_in_range(value, min, max).map(ParamValue::Int).map_err(invalid)
        }
        ParamKind::Duration { min_secs } => {
            let secs = value
                .as_str()
                .and_then(parse_duration)
                .ok_or_else(|| {
                    invalid("expected a duration such as \"60s\", \"5m\" or \"1h\"".into())
                })?;
            if secs < min_secs {
                return Err(invalid(format!("duration must be at least {}s", min_secs)));
            }
            Ok(ParamValue::Duration(secs))
        }
        ParamKind::Enum(choices) => match value.as_str() {
            Some(s) if choices.contains(&s) => Ok(ParamValue::String(s.to_string())),
            _ => Err(invalid(format!("expected one of [{}]", choices.join(", ")))),
        },
        ParamKind::Regex => {
            let s = value
                .as_str()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| invalid("expected a non-empty regular expression".into()))?;
            check_text(s).map_err(invalid)?;
            Ok(ParamValue::String(s.to_string()))
        }
        ParamKind::MetricPatterns => {
            let items =
                string_list(value).ok_or_else(|| invalid("expected a list of strings".into()))?;
            for item in &items {
                if !METRIC_PATTERN.is_match(item) {
                    return Err(invalid(format!(
                        "invalid metrics pattern \"{}\"; expected <group>/<metric>",
                        item
                    )));
                }
            }
            Ok(ParamValue::List(items))
        }
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_sequence()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn int_in_range(value: &Value, min: i64, max: i64) -> Result<i64, String> {
    value
        .as_i64()
        .filter(|i| (min..=max).contains(i))
        .ok_or_else(|| format!("expected an integer between {} and {}", min, max))
}

/// Fluent Bit reads values unquoted, one per line, and trims their edges.
fn check_text(s: &str) -> Result<(), String> {
    if s.contains(['\n', '\r']) {
        return Err("value must not contain line breaks".into());
    }
    if s.trim() != s {
        return Err("value must not start or end with whitespace".into());
    }
    Ok(())
}

fn check_list_item(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("list items must not be empty".into());
    }
    check_text(s)?;
    if s.contains(',') {
        return Err(format!("list item \"{}\" must not contain ','", s));
    }
    Ok(())
}

/// Parse `<n>s`, `<n>m` or `<n>h` into seconds.
pub(crate) fn parse_duration(s: &str) -> Option<u64> {
    let unit = s.chars().last()?;
    let digits = &s[..s.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u64 = digits.parse().ok()?;
    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        _ => return None,
    };
    n.checked_mul(multiplier)
}
