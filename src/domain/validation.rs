use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use crate::domain::instant::{parse_instant, InstantError};

/// Field-level failure while building an [`Item`](crate::domain::Item) or a
/// [`Section`](crate::domain::Section).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("field `{field}` is not a valid URL: {source}")]
    InvalidUrl {
        field: String,
        source: url::ParseError,
    },

    #[error("field `{field}` must be an http(s) URL, got `{value}`")]
    UnsupportedScheme { field: String, value: String },

    #[error("field `{field}` is not a valid date-time: {source}")]
    InvalidInstant {
        field: String,
        source: InstantError,
    },

    #[error("field `{0}` must not be empty")]
    Empty(String),
}

/// Accept only absolute http/https URLs.
pub fn http_url(field: &str, raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw).map_err(|source| ValidationError::InvalidUrl {
        field: field.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(ValidationError::UnsupportedScheme {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Provider identifiers arrive as strings or as integers.
pub fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}

/// Typed, validating read access over a raw JSON object.
///
/// `null` is treated the same as an absent key.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn wrong_type(key: &str, expected: &'static str) -> ValidationError {
        ValidationError::WrongType {
            field: key.to_string(),
            expected,
        }
    }

    pub fn opt_str(&self, key: &str) -> Result<Option<&'a str>, ValidationError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(Self::wrong_type(key, "a string")),
        }
    }

    pub fn str(&self, key: &str) -> Result<&'a str, ValidationError> {
        self.opt_str(key)?
            .ok_or_else(|| ValidationError::MissingField(key.to_string()))
    }

    pub fn opt_string(&self, key: &str) -> Result<Option<String>, ValidationError> {
        Ok(self.opt_str(key)?.map(String::from))
    }

    /// An identifier given as a string or an integer. Blank strings are rejected.
    pub fn opt_id(&self, key: &str) -> Result<Option<String>, ValidationError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let id = id_value(value).ok_or_else(|| Self::wrong_type(key, "a string or an integer"))?;
        if id.trim().is_empty() {
            return Err(ValidationError::Empty(key.to_string()));
        }
        Ok(Some(id))
    }

    pub fn id(&self, key: &str) -> Result<String, ValidationError> {
        self.opt_id(key)?
            .ok_or_else(|| ValidationError::MissingField(key.to_string()))
    }

    /// Integers, also accepting integer-valued strings such as `"120"`.
    pub fn opt_int(&self, key: &str) -> Result<Option<i64>, ValidationError> {
        let value = match self.get(key) {
            None => return Ok(None),
            Some(value) => value,
        };

        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };

        parsed
            .map(Some)
            .ok_or_else(|| Self::wrong_type(key, "an integer"))
    }

    pub fn int(&self, key: &str) -> Result<i64, ValidationError> {
        self.opt_int(key)?
            .ok_or_else(|| ValidationError::MissingField(key.to_string()))
    }

    pub fn opt_url(&self, key: &str) -> Result<Option<Url>, ValidationError> {
        self.opt_str(key)?.map(|raw| http_url(key, raw)).transpose()
    }

    pub fn url(&self, key: &str) -> Result<Url, ValidationError> {
        http_url(key, self.str(key)?)
    }

    pub fn opt_instant(
        &self,
        key: &str,
        sep: char,
    ) -> Result<Option<NaiveDateTime>, ValidationError> {
        self.opt_str(key)?
            .map(|raw| {
                parse_instant(raw, sep).map_err(|source| ValidationError::InvalidInstant {
                    field: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    pub fn instant(&self, key: &str, sep: char) -> Result<NaiveDateTime, ValidationError> {
        self.opt_instant(key, sep)?
            .ok_or_else(|| ValidationError::MissingField(key.to_string()))
    }
}
