//! Response normalization
//!
//! Every endpoint answers in one of a handful of JSON shapes depending on the
//! requested `format`. [`ResponseShape::classify`] names the shape once, and
//! [`ResponseShape::into_places`] turns each shape into the same list of
//! [`Place`]s.

use domain::Place;
use domain::fields::RawMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::format::ResponseFormat;

/// Shape of a decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape<'a> {
    /// GeoJSON or GeoCodeJSON `FeatureCollection`
    FeatureCollection {
        /// Feature objects (empty if `features` is absent)
        features: &'a [Value],
        /// Place data lives under `properties.geocoding` (GeoCodeJSON)
        nested_geocoding: bool,
    },
    /// A single place object (`reverse`, `details`)
    Single(&'a RawMap),
    /// Service-reported failure such as "Unable to geocode"
    ErrorObject(String),
    /// An array of place objects (`search`, `lookup`)
    List(&'a [Value]),
    /// An object that matches no known shape
    Unrecognized,
}

impl<'a> ResponseShape<'a> {
    /// Classify a payload produced for the given format
    ///
    /// `format` is `None` for format strings the normalizer has no special
    /// handling for; those are read as lists or single objects.
    #[must_use]
    pub fn classify(payload: &'a Value, format: Option<ResponseFormat>) -> Self {
        if let Some(format) = format.filter(ResponseFormat::is_feature_collection) {
            let features = payload
                .get("features")
                .and_then(Value::as_array)
                .map_or(&[][..], Vec::as_slice);
            return Self::FeatureCollection {
                features,
                nested_geocoding: format == ResponseFormat::GeoCodeJson,
            };
        }

        match payload {
            Value::Object(map) if map.contains_key("error") => {
                Self::ErrorObject(error_message(&map["error"]))
            },
            Value::Object(map) if map.contains_key("place_id") => Self::Single(map),
            Value::Array(items) => Self::List(items),
            _ => Self::Unrecognized,
        }
    }

    /// Build places from the classified payload
    #[must_use]
    pub fn into_places(self) -> Vec<Place> {
        match self {
            Self::FeatureCollection {
                features,
                nested_geocoding,
            } => features
                .iter()
                .filter_map(Value::as_object)
                .map(|feature| Place::from_map(&feature_record(feature, nested_geocoding)))
                .collect(),
            Self::Single(map) => vec![Place::from_map(map)],
            Self::ErrorObject(message) => {
                debug!(%message, "Service returned an error object");
                Vec::new()
            },
            Self::List(items) => items
                .iter()
                .filter_map(Value::as_object)
                .map(Place::from_map)
                .collect(),
            Self::Unrecognized => {
                debug!("Unrecognized response object");
                Vec::new()
            },
        }
    }
}

/// Normalize a payload into places
#[must_use]
pub fn normalize(payload: &Value, format: Option<ResponseFormat>) -> Vec<Place> {
    ResponseShape::classify(payload, format).into_places()
}

/// Flatten a feature into a single place record
///
/// The feature's `geometry` is injected under `geometry`; a point geometry
/// also supplies `lat`/`lon` and the feature `bbox` the bounding box when the
/// properties carry neither.
fn feature_record(feature: &RawMap, nested_geocoding: bool) -> RawMap {
    let properties = feature.get("properties").and_then(Value::as_object);
    let base = if nested_geocoding {
        properties
            .and_then(|p| p.get("geocoding"))
            .and_then(Value::as_object)
            .or(properties)
    } else {
        properties
    };

    let mut record = base.cloned().unwrap_or_else(Map::new);

    if let Some(geometry) = feature.get("geometry").filter(|g| !g.is_null()) {
        if !record.contains_key("lat") && !record.contains_key("lon") {
            if let Some((lon, lat)) = point_coordinates(geometry) {
                record.insert("lat".to_string(), lat.clone());
                record.insert("lon".to_string(), lon.clone());
            }
        }
        record.insert("geometry".to_string(), geometry.clone());
    }

    if let Some(bbox) = feature.get("bbox") {
        if !record.contains_key("boundingbox") && !record.contains_key("bbox") {
            record.insert("bbox".to_string(), bbox.clone());
        }
    }

    record
}

/// `[lon, lat]` of a GeoJSON `Point`
fn point_coordinates(geometry: &Value) -> Option<(&Value, &Value)> {
    if geometry.get("type")?.as_str()? != "Point" {
        return None;
    }
    let coordinates = geometry.get("coordinates")?.as_array()?;
    Some((coordinates.first()?, coordinates.get(1)?))
}

fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), ToString::to_string),
        other => other.to_string(),
    }
}
