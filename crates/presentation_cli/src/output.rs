//! JSON output documents

use chrono::{Local, SecondsFormat};
use domain::Place;
use serde::Serialize;
use serde_json::Value;

/// Version tag written into every document's metadata
pub const API_VERSION: &str = "nominatim-async-v1";

/// How a result was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    /// Coordinates were reverse geocoded
    ReverseGeocoding,
    /// Free-text search
    TextSearch,
    /// OSM id lookup
    Lookup,
}

impl MatchedBy {
    /// Value of the `matched_by` field
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReverseGeocoding => "nominatim_reverse_geocoding",
            Self::TextSearch => "nominatim_text_search",
            Self::Lookup => "nominatim_lookup",
        }
    }

    /// Match confidence; only reverse geocoding is exact
    #[must_use]
    pub const fn similarity(self) -> Option<f64> {
        match self {
            Self::ReverseGeocoding => Some(1.0),
            Self::TextSearch | Self::Lookup => None,
        }
    }
}

/// Coordinates of a result
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
}

/// Flat summary of a place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationResult {
    pub uid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub place_type: Option<String>,
    pub category: Option<String>,
    pub state: Option<String>,
    pub district_name: Option<String>,
    pub city_name: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
    pub matched_by: &'static str,
    pub similarity: Option<f64>,
    pub importance: Option<f64>,
    pub place_rank: Option<i64>,
    pub coordinates: Coordinates,
    pub boundingbox: Option<[f64; 4]>,
    pub osm_type: Option<String>,
    pub osm_id: Option<u64>,
}

impl LocationResult {
    /// Summarize a place
    #[must_use]
    pub fn from_place(place: &Place, matched_by: MatchedBy) -> Self {
        let address = place.address();

        let uid = place.osm_id().map_or_else(
            || "unknown".to_string(),
            |id| format!("{}{id}", place.osm_type().unwrap_or_default()),
        );

        Self {
            uid,
            name: place.display_name().to_string(),
            place_type: place.place_type().map(ToString::to_string),
            category: place.category().map(ToString::to_string),
            state: address.and_then(|a| a.state.clone()),
            district_name: address.and_then(|a| a.county.clone().or_else(|| a.district.clone())),
            city_name: address.and_then(|a| a.city.clone().or_else(|| a.town.clone())),
            country: address.and_then(|a| a.country.clone()),
            postcode: address.and_then(|a| a.postcode.clone()),
            matched_by: matched_by.as_str(),
            similarity: matched_by.similarity(),
            importance: place.importance(),
            place_rank: place.place_rank(),
            coordinates: Coordinates {
                lat: place.lat(),
                lon: place.lon(),
            },
            boundingbox: place.bounding_box().map(domain::BoundingBox::to_array),
            osm_type: place.osm_type().map(ToString::to_string),
            osm_id: place.osm_id(),
        }
    }
}

/// Execution metadata appended to every document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub search_mode: String,
    pub timestamp: String,
    pub api_version: &'static str,
}

impl Metadata {
    /// Metadata stamped with the current local time
    #[must_use]
    pub fn now(search_mode: &str) -> Self {
        Self {
            search_mode: search_mode.to_string(),
            timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            api_version: API_VERSION,
        }
    }
}

/// Failure document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorOutput {
    pub error: String,
    pub metadata: Metadata,
}

/// Attach metadata to a result document
///
/// Objects get a `metadata` key; anything else is wrapped as `result`.
#[must_use]
pub fn with_metadata(body: Value, metadata: &Metadata) -> Value {
    let metadata = serde_json::to_value(metadata).unwrap_or(Value::Null);
    match body {
        Value::Object(mut map) => {
            map.insert("metadata".to_string(), metadata);
            Value::Object(map)
        },
        other => serde_json::json!({ "result": other, "metadata": metadata }),
    }
}

/// Pretty-printed JSON (non-ASCII characters are written as-is)
#[must_use]
pub fn render<T: Serialize>(document: &T) -> String {
    serde_json::to_string_pretty(document)
        .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize output: {e}"}}"#))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn place(value: &Value) -> Place {
        Place::from_map(value.as_object().unwrap())
    }

    #[test]
    fn reverse_result_from_place() {
        let place = place(&json!({
            "place_id": 1,
            "osm_type": "relation",
            "osm_id": 12345,
            "lat": "50.3122",
            "lon": "28.4314",
            "category": "boundary",
            "type": "administrative",
            "importance": 0.5,
            "place_rank": 16,
            "display_name": "Житомир, Україна",
            "boundingbox": ["50.2", "50.3", "28.5", "28.8"],
            "address": {
                "city": "Житомир",
                "county": "Житомирський район",
                "state": "Житомирська область",
                "country": "Україна",
                "postcode": "10001"
            }
        }));

        let result = LocationResult::from_place(&place, MatchedBy::ReverseGeocoding);
        assert_eq!(result.uid, "relation12345");
        assert_eq!(result.name, "Житомир, Україна");
        assert_eq!(result.city_name.as_deref(), Some("Житомир"));
        assert_eq!(result.district_name.as_deref(), Some("Житомирський район"));
        assert_eq!(result.matched_by, "nominatim_reverse_geocoding");
        assert_eq!(result.similarity, Some(1.0));
        assert_eq!(result.boundingbox, Some([50.2, 50.3, 28.5, 28.8]));
        assert!((result.coordinates.lat - 50.3122).abs() < 1e-9);
    }

    #[test]
    fn fallbacks_for_district_and_city() {
        let place = place(&json!({
            "osm_id": 7,
            "osm_type": "node",
            "address": {"town": "Korostyshiv", "district": "Zhytomyr District"}
        }));
        let result = LocationResult::from_place(&place, MatchedBy::TextSearch);
        assert_eq!(result.city_name.as_deref(), Some("Korostyshiv"));
        assert_eq!(result.district_name.as_deref(), Some("Zhytomyr District"));
        assert_eq!(result.similarity, None);
        assert_eq!(result.matched_by, "nominatim_text_search");
    }

    #[test]
    fn unknown_uid_without_osm_id() {
        let result = LocationResult::from_place(&place(&json!({"place_id": 3})), MatchedBy::Lookup);
        assert_eq!(result.uid, "unknown");
        assert_eq!(result.state, None);
        assert_eq!(result.boundingbox, None);
    }

    #[test]
    fn serialized_field_names() {
        let result = LocationResult::from_place(
            &place(&json!({"osm_id": 1, "osm_type": "way", "type": "city"})),
            MatchedBy::TextSearch,
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "city");
        assert_eq!(value["uid"], "way1");
        assert!(value["similarity"].is_null());
        assert!(value["coordinates"]["lat"].is_number());
    }

    #[test]
    fn metadata_is_attached() {
        let metadata = Metadata::now("search");
        assert_eq!(metadata.api_version, "nominatim-async-v1");
        assert!(chrono::DateTime::parse_from_rfc3339(&metadata.timestamp).is_ok());

        let document = with_metadata(json!({"uid": "x"}), &metadata);
        assert_eq!(document["metadata"]["search_mode"], "search");
        assert_eq!(document["uid"], "x");

        let wrapped = with_metadata(json!("OK"), &metadata);
        assert_eq!(wrapped["result"], "OK");
    }

    #[test]
    fn render_keeps_unicode() {
        let rendered = render(&json!({"name": "Київ"}));
        assert!(rendered.contains("Київ"));
        assert!(rendered.contains('\n'));
    }
}
