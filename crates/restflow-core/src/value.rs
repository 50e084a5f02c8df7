//! Untyped field values returned by the API server

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field map observed on the server, keyed by attribute name
pub type ApiData = BTreeMap<String, ApiValue>;

/// A JSON value as returned by the server
///
/// Objects are kept ordered by key so that the display form is stable
/// between reads of the same object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum ApiValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<ApiValue>),
    Object(BTreeMap<String, ApiValue>),
}

impl ApiValue {
    pub fn as_object(&self) -> Option<&BTreeMap<String, ApiValue>> {
        match self {
            ApiValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Render the value as an object identifier
    ///
    /// Only strings and numbers identify objects; anything else yields `None`.
    pub fn as_id(&self) -> Option<String> {
        match self {
            ApiValue::String(s) => Some(s.clone()),
            ApiValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Resolve an attribute path against a top-level field map
pub fn lookup_path<'a>(data: &'a ApiData, path: &str) -> Option<&'a ApiValue> {
    let mut segments = path.split('/').filter(|segment| !segment.is_empty());
    let first = data.get(segments.next()?)?;
    segments.try_fold(first, |current, segment| current.as_object()?.get(segment))
}

/// Flatten a field map into display strings for the observable state
pub fn flatten(data: &ApiData) -> BTreeMap<String, String> {
    data.iter()
        .map(|(key, value)| (key.clone(), value.to_string()))
        .collect()
}

impl fmt::Display for ApiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiValue::Null => write!(f, "<nil>"),
            ApiValue::Bool(b) => write!(f, "{}", b),
            ApiValue::Number(n) => write!(f, "{}", n),
            ApiValue::String(s) => f.write_str(s),
            ApiValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            ApiValue::Object(map) => {
                write!(f, "map[")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}:{}", key, value)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<serde_json::Value> for ApiValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ApiValue::Null,
            serde_json::Value::Bool(b) => ApiValue::Bool(b),
            serde_json::Value::Number(n) => ApiValue::Number(n),
            serde_json::Value::String(s) => ApiValue::String(s),
            serde_json::Value::Array(items) => {
                ApiValue::Array(items.into_iter().map(ApiValue::from).collect())
            }
            serde_json::Value::Object(map) => ApiValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, ApiValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<ApiValue> for serde_json::Value {
    fn from(value: ApiValue) -> Self {
        match value {
            ApiValue::Null => serde_json::Value::Null,
            ApiValue::Bool(b) => serde_json::Value::Bool(b),
            ApiValue::Number(n) => serde_json::Value::Number(n),
            ApiValue::String(s) => serde_json::Value::String(s),
            ApiValue::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            ApiValue::Object(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}
