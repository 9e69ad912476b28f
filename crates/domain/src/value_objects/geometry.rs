//! Opaque place geometry

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Geometry attached to a place, passed through untyped
///
/// GeoJSON geometries arrive as objects; SVG, WKT (`geotext`) and KML
/// renderings arrive as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Geometry {
    /// GeoJSON geometry object
    Object(Map<String, Value>),
    /// SVG path, WKT or KML text
    Text(String),
}

impl Geometry {
    /// Wrap a raw value; only objects and strings are geometries
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(object) => Some(Self::Object(object.clone())),
            Value::String(text) => Some(Self::Text(text.clone())),
            _ => None,
        }
    }

    /// GeoJSON geometry `type` (e.g. `Point`), if this is an object
    #[must_use]
    pub fn geometry_type(&self) -> Option<&str> {
        match self {
            Self::Object(object) => object.get("type").and_then(Value::as_str),
            Self::Text(_) => None,
        }
    }

    /// Back to a raw JSON value
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Object(object) => Value::Object(object.clone()),
            Self::Text(text) => Value::String(text.clone()),
        }
    }
}
