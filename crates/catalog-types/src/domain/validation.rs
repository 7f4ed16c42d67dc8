use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Input rejected before anything reaches the store.
///
/// `fields` names the offending paths (`urls.thumb`, `tags[0].title`, `id`)
/// so callers can render a structured response.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_fields(message: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            message: message.into(),
            fields,
        }
    }

    pub fn missing(fields: Vec<String>) -> Self {
        let message = format!("missing required field(s): {}", fields.join(", "));
        Self { message, fields }
    }

    pub fn malformed(err: serde_json::Error) -> Self {
        Self::new(format!("malformed input: {err}"))
    }
}

/// Collects missing required fields while a draft is turned into a record.
#[derive(Debug, Default)]
pub(crate) struct Required {
    missing: Vec<String>,
}

impl Required {
    /// Absent and empty strings both count as missing.
    pub(crate) fn text(&mut self, value: Option<String>, path: &str) -> String {
        match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                self.missing.push(path.to_string());
                String::new()
            }
        }
    }

    pub(crate) fn number(&mut self, value: Option<f64>, path: &str) -> f64 {
        match value {
            Some(v) => v,
            None => {
                self.missing.push(path.to_string());
                0.0
            }
        }
    }

    pub(crate) fn mark(&mut self, path: impl Into<String>) {
        self.missing.push(path.into());
    }

    pub(crate) fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.missing.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError::missing(self.missing))
        }
    }
}

pub(crate) fn decode_field<T: DeserializeOwned>(key: &str, value: &Value) -> Result<T, ValidationError> {
    serde_json::from_value(value.clone()).map_err(|e| {
        ValidationError::with_fields(format!("invalid value for `{key}`: {e}"), vec![key.into()])
    })
}

pub(crate) fn immutable_field(key: &str) -> ValidationError {
    ValidationError::with_fields(format!("field `{key}` cannot be changed"), vec![key.into()])
}

pub(crate) fn unknown_field(key: &str) -> ValidationError {
    ValidationError::with_fields(format!("unknown field `{key}`"), vec![key.into()])
}

/// Turns every key of a change object into a patch, reporting all rejected keys at once.
pub(crate) fn parse_patches<P>(
    change: &Map<String, Value>,
    parse: impl Fn(&str, &Value) -> Result<P, ValidationError>,
) -> Result<Vec<P>, ValidationError> {
    let mut patches = Vec::with_capacity(change.len());
    let mut problems = Vec::new();
    let mut fields = Vec::new();
    for (key, value) in change {
        match parse(key, value) {
            Ok(patch) => patches.push(patch),
            Err(err) => {
                problems.push(err.message);
                fields.extend(err.fields);
            }
        }
    }
    if problems.is_empty() {
        Ok(patches)
    } else {
        Err(ValidationError::with_fields(problems.join("; "), fields))
    }
}
