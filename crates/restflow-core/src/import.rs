//! Identity recovery from an import string
//!
//! An import string has the form `<full path>/<id>`; the last `/` separates
//! the collection path from the object id. No escaping is supported.

use crate::error::{RestError, Result};
use serde_json::Value;

/// Collection path and id recovered from an import string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTarget {
    pub path: String,
    pub id: String,
}

/// Split `<path>/<id>` at the last separator
pub fn parse_import_id(input: &str) -> Result<ImportTarget> {
    let (path, id) = input.rsplit_once('/').ok_or_else(|| {
        RestError::validation(format!(
            "invalid import id '{}'. Must be /<full path from server root>/<object id>",
            input
        ))
    })?;

    Ok(ImportTarget {
        path: path.to_string(),
        id: id.to_string(),
    })
}

/// Minimal payload that only carries the id under the id attribute
pub fn import_data(id_attribute: &str, id: &str) -> String {
    id_attribute
        .split('/')
        .filter(|segment| !segment.is_empty())
        .rev()
        .fold(Value::String(id.to_string()), |inner, segment| {
            let mut map = serde_json::Map::new();
            map.insert(segment.to_string(), inner);
            Value::Object(map)
        })
        .to_string()
}
