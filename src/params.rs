use std::collections::HashMap;
use strum::Display;
use thiserror::Error;

/// Decoded `key=value` pairs from a request's query string, in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl From<Vec<(String, String)>> for QueryParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

impl QueryParams {
    /// First value supplied for `key`; later duplicates are ignored.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FieldKind {
    #[strum(serialize = "integer")]
    Integer,
    #[strum(serialize = "non-empty-text")]
    NonEmptyText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

pub const ID: Field = Field {
    name: "id",
    kind: FieldKind::Integer,
};

pub const CONTENT: Field = Field {
    name: "content",
    kind: FieldKind::NonEmptyText,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("missing parameter `{0}`")]
    MissingParameter(&'static str),
    #[error("parameter `{0}` has the wrong type")]
    InvalidType(&'static str),
    #[error("parameter `{0}` is empty")]
    EmptyValue(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Integer(i64),
    Text(String),
}

/// Parameters that passed [`validate`], keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedParams {
    values: HashMap<&'static str, ParamValue>,
}

impl ValidatedParams {
    pub fn integer(&self, field: Field) -> Result<i64, ParamError> {
        match self.values.get(field.name) {
            Some(ParamValue::Integer(value)) => Ok(*value),
            Some(ParamValue::Text(_)) => Err(ParamError::InvalidType(field.name)),
            None => Err(ParamError::MissingParameter(field.name)),
        }
    }

    pub fn text(&self, field: Field) -> Result<&str, ParamError> {
        match self.values.get(field.name) {
            Some(ParamValue::Text(value)) => Ok(value),
            Some(ParamValue::Integer(_)) => Err(ParamError::InvalidType(field.name)),
            None => Err(ParamError::MissingParameter(field.name)),
        }
    }
}

/// Checks `fields` in order and stops at the first one that fails.
pub fn validate(query: &QueryParams, fields: &[Field]) -> Result<ValidatedParams, ParamError> {
    let mut validated = ValidatedParams::default();

    for field in fields {
        let raw = query
            .get(field.name)
            .ok_or(ParamError::MissingParameter(field.name))?;

        if raw.is_empty() {
            return Err(ParamError::EmptyValue(field.name));
        }

        let value = match field.kind {
            FieldKind::Integer => raw
                .trim()
                .parse::<i64>()
                .map(ParamValue::Integer)
                .map_err(|_| ParamError::InvalidType(field.name))?,
            FieldKind::NonEmptyText => ParamValue::Text(raw.to_string()),
        };
        validated.values.insert(field.name, value);
    }

    Ok(validated)
}
