//! Destination pattern interpolation.
//!
//! Per-entry target rules address their output path with a small
//! `{{ dotted.path }}` pattern evaluated against the entry JSON, e.g.
//! `dist/{{ fields.url }}/index.html`. This is deliberately not the page
//! template engine: patterns resolve paths only, and only scalar values.

use serde_json::Value;
use thiserror::Error;

/// Pattern interpolation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A `{{` delimiter without a matching `}}`.
    #[error("Unclosed '{{{{' delimiter in pattern '{0}'")]
    Unclosed(String),

    /// The referenced path does not exist in the entry.
    #[error("Unknown field '{path}' in pattern '{pattern}'")]
    UnknownField { pattern: String, path: String },

    /// The referenced value cannot appear in a filesystem path.
    #[error("Field '{path}' is not a string, number or boolean")]
    NotScalar { path: String },
}

/// Interpolate `{{ dotted.path }}` placeholders with values looked up in
/// `data`. Text outside placeholders passes through unchanged.
pub fn interpolate(pattern: &str, data: &Value) -> Result<String, PatternError> {
    let mut result = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| PatternError::Unclosed(pattern.to_string()))?;
        let path = after[..end].trim();
        let value = lookup(data, path).ok_or_else(|| PatternError::UnknownField {
            pattern: pattern.to_string(),
            path: path.to_string(),
        })?;
        match value {
            Value::String(text) => result.push_str(text),
            Value::Number(number) => result.push_str(&number.to_string()),
            Value::Bool(flag) => result.push_str(if *flag { "true" } else { "false" }),
            _ => {
                return Err(PatternError::NotScalar {
                    path: path.to_string(),
                });
            }
        }
        rest = &after[end + 2..];
    }

    result.push_str(rest);
    Ok(result)
}

/// Walk a dot-separated path through nested JSON objects.
fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}
