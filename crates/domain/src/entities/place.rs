//! Normalized geocoding result
//!
//! A [`Place`] is built from whichever raw object a response format yields:
//! a `jsonv2`/`json` record, the `properties` of a GeoJSON feature, the
//! `properties.geocoding` of a GeoCodeJSON feature, or a `details` record.
//! The formats disagree on key names, so every field reads a list of
//! synonyms and takes the first one present. Construction never fails;
//! missing or malformed fields fall back to zero/empty defaults.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::{Address, AddressComponent};
use crate::fields::{self, RawMap};
use crate::value_objects::{BoundingBox, GeoLocation, Geometry};

const CATEGORY_KEYS: &[&str] = &["category", "class", "osm_key"];
const TYPE_KEYS: &[&str] = &["type", "osm_value"];
const PLACE_RANK_KEYS: &[&str] = &["place_rank", "rank_search"];
const ADDRESS_RANK_KEYS: &[&str] = &["address_rank", "rank_address"];
const DISPLAY_NAME_KEYS: &[&str] = &["display_name", "label"];
const NAME_DETAILS_KEYS: &[&str] = &["namedetails", "names"];
const GEOMETRY_KEYS: &[&str] = &["geometry", "geojson", "svg", "geotext", "geokml"];

/// Address information attached to a place
///
/// Search-style responses carry a keyed object, the details endpoint a
/// ranked list. A place has one or the other, never both.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlaceAddress {
    /// No address requested or returned
    #[default]
    None,
    /// Keyed address (`addressdetails=1` on search/reverse/lookup)
    Keyed(Address),
    /// Ranked address rows (`addressdetails=1` on details)
    Components(Vec<AddressComponent>),
}

impl PlaceAddress {
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(map)) => Self::Keyed(Address::from_map(map)),
            Some(Value::Array(rows)) => Self::Components(
                rows.iter()
                    .filter_map(Value::as_object)
                    .map(AddressComponent::from_map)
                    .collect(),
            ),
            _ => Self::None,
        }
    }
}

/// A single geocoded entity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Place {
    place_id: u64,
    licence: Option<String>,
    osm_type: Option<String>,
    osm_id: Option<u64>,
    lat: f64,
    lon: f64,
    display_name: String,
    category: Option<String>,
    #[serde(rename = "type")]
    place_type: Option<String>,
    importance: Option<f64>,
    place_rank: Option<i64>,
    address_rank: Option<i64>,
    bounding_box: Option<BoundingBox>,
    icon: Option<String>,
    address: PlaceAddress,
    extra_tags: BTreeMap<String, String>,
    name_details: BTreeMap<String, String>,
    geometry: Option<Geometry>,
    entrances: Vec<RawMap>,

    // details endpoint
    parent_place_id: Option<u64>,
    admin_level: Option<String>,
    local_name: Option<String>,
    address_tags: BTreeMap<String, String>,
    house_number: Option<String>,
    calculated_postcode: Option<String>,
    country_code: Option<String>,
    indexed_date: Option<String>,
    calculated_importance: Option<f64>,
    calculated_wikipedia: Option<String>,
    is_area: Option<bool>,
    centroid: Option<RawMap>,
    address_type: Option<String>,
    name: Option<String>,
    label: Option<String>,
    admin_levels: BTreeMap<String, String>,
}

impl Place {
    /// Build a place from a raw record
    #[must_use]
    pub fn from_map(map: &RawMap) -> Self {
        let centroid = fields::first_object(map, &["centroid"]).cloned();
        let (lat, lon) = centroid
            .as_ref()
            .and_then(centroid_coordinates)
            .unwrap_or_else(|| {
                (
                    fields::first_f64(map, &["lat"]).unwrap_or(0.0),
                    fields::first_f64(map, &["lon"]).unwrap_or(0.0),
                )
            });

        let bounding_box = map
            .get("boundingbox")
            .and_then(BoundingBox::from_nominatim)
            .or_else(|| map.get("bbox").and_then(BoundingBox::from_geojson));

        let geometry = GEOMETRY_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(Geometry::from_value);

        let entrances = map
            .get("entrances")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_object).cloned().collect())
            .unwrap_or_default();

        Self {
            place_id: fields::first_u64(map, &["place_id"]).unwrap_or(0),
            licence: fields::first_str(map, &["licence"]),
            osm_type: fields::first_str(map, &["osm_type"]),
            osm_id: fields::first_u64(map, &["osm_id"]),
            lat,
            lon,
            display_name: fields::first_str(map, DISPLAY_NAME_KEYS).unwrap_or_default(),
            category: fields::first_str(map, CATEGORY_KEYS),
            place_type: fields::first_str(map, TYPE_KEYS),
            importance: fields::first_f64(map, &["importance"]),
            place_rank: fields::first_i64(map, PLACE_RANK_KEYS),
            address_rank: fields::first_i64(map, ADDRESS_RANK_KEYS),
            bounding_box,
            icon: fields::first_str(map, &["icon"]),
            address: PlaceAddress::from_value(map.get("address")),
            extra_tags: fields::first_string_map(map, &["extratags"]),
            name_details: fields::first_string_map(map, NAME_DETAILS_KEYS),
            geometry,
            entrances,
            parent_place_id: fields::first_u64(map, &["parent_place_id"]),
            admin_level: fields::first_str(map, &["admin_level"]),
            local_name: fields::first_str(map, &["localname"]),
            address_tags: fields::first_string_map(map, &["addresstags"]),
            house_number: fields::first_str(map, &["housenumber"]),
            calculated_postcode: fields::first_str(map, &["calculated_postcode"]),
            country_code: fields::first_str(map, &["country_code"]),
            indexed_date: fields::first_str(map, &["indexed_date"]),
            calculated_importance: fields::first_f64(map, &["calculated_importance"]),
            calculated_wikipedia: fields::first_str(map, &["calculated_wikipedia"]),
            is_area: fields::first_bool(map, &["isarea"]),
            centroid,
            address_type: fields::first_str(map, &["addresstype"]),
            name: fields::first_str(map, &["name"]),
            label: fields::first_str(map, &["label"]),
            admin_levels: fields::first_string_map(map, &["admin"]),
        }
    }

    /// Internal Nominatim place id (0 when absent)
    #[must_use]
    pub const fn place_id(&self) -> u64 {
        self.place_id
    }

    /// Data licence notice
    #[must_use]
    pub fn licence(&self) -> Option<&str> {
        self.licence.as_deref()
    }

    /// OSM object type (`node`/`way`/`relation` or `N`/`W`/`R`)
    #[must_use]
    pub fn osm_type(&self) -> Option<&str> {
        self.osm_type.as_deref()
    }

    /// OSM object id
    #[must_use]
    pub const fn osm_id(&self) -> Option<u64> {
        self.osm_id
    }

    /// Latitude (0.0 when absent)
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude (0.0 when absent)
    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.lon
    }

    /// Coordinates as a validated location, if they are in range
    #[must_use]
    pub fn location(&self) -> Option<GeoLocation> {
        GeoLocation::new(self.lat, self.lon).ok()
    }

    /// Full display name, falling back to the GeoCodeJSON `label`
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Main OSM tag key (`category`, `class` or `osm_key`)
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Main OSM tag value (`type` or `osm_value`)
    #[must_use]
    pub fn place_type(&self) -> Option<&str> {
        self.place_type.as_deref()
    }

    /// Importance score
    #[must_use]
    pub const fn importance(&self) -> Option<f64> {
        self.importance
    }

    /// Search rank (`place_rank` or `rank_search`)
    #[must_use]
    pub const fn place_rank(&self) -> Option<i64> {
        self.place_rank
    }

    /// Address rank (`address_rank` or `rank_address`)
    #[must_use]
    pub const fn address_rank(&self) -> Option<i64> {
        self.address_rank
    }

    /// Bounding box
    #[must_use]
    pub const fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    /// Icon URL
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Keyed address, if one was returned
    #[must_use]
    pub const fn address(&self) -> Option<&Address> {
        match &self.address {
            PlaceAddress::Keyed(address) => Some(address),
            PlaceAddress::None | PlaceAddress::Components(_) => None,
        }
    }

    /// Ranked address rows from the details endpoint (empty otherwise)
    #[must_use]
    pub fn address_components(&self) -> &[AddressComponent] {
        match &self.address {
            PlaceAddress::Components(rows) => rows.as_slice(),
            PlaceAddress::None | PlaceAddress::Keyed(_) => &[],
        }
    }

    /// Address in whichever shape was returned
    #[must_use]
    pub const fn address_details(&self) -> &PlaceAddress {
        &self.address
    }

    /// Additional OSM tags (`extratags=1`)
    #[must_use]
    pub const fn extra_tags(&self) -> &BTreeMap<String, String> {
        &self.extra_tags
    }

    /// Localized names (`namedetails=1`, or `names` on details)
    #[must_use]
    pub const fn name_details(&self) -> &BTreeMap<String, String> {
        &self.name_details
    }

    /// Geometry in the requested polygon format
    #[must_use]
    pub const fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Entrance records (`entrances=1`)
    #[must_use]
    pub fn entrances(&self) -> &[RawMap] {
        &self.entrances
    }

    /// Parent place id (details only)
    #[must_use]
    pub const fn parent_place_id(&self) -> Option<u64> {
        self.parent_place_id
    }

    /// OSM admin level as published (details only)
    #[must_use]
    pub fn admin_level(&self) -> Option<&str> {
        self.admin_level.as_deref()
    }

    /// Local name (details only)
    #[must_use]
    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    /// Address tags of the OSM object (details only)
    #[must_use]
    pub const fn address_tags(&self) -> &BTreeMap<String, String> {
        &self.address_tags
    }

    /// House number (details only)
    #[must_use]
    pub fn house_number(&self) -> Option<&str> {
        self.house_number.as_deref()
    }

    /// Postcode computed by Nominatim (details only)
    #[must_use]
    pub fn calculated_postcode(&self) -> Option<&str> {
        self.calculated_postcode.as_deref()
    }

    /// Country code (details only)
    #[must_use]
    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }

    /// Last indexing timestamp (details only)
    #[must_use]
    pub fn indexed_date(&self) -> Option<&str> {
        self.indexed_date.as_deref()
    }

    /// Importance computed by Nominatim (details only)
    #[must_use]
    pub const fn calculated_importance(&self) -> Option<f64> {
        self.calculated_importance
    }

    /// Wikipedia reference computed by Nominatim (details only)
    #[must_use]
    pub fn calculated_wikipedia(&self) -> Option<&str> {
        self.calculated_wikipedia.as_deref()
    }

    /// Whether the place is an area (details only)
    #[must_use]
    pub const fn is_area(&self) -> Option<bool> {
        self.is_area
    }

    /// Centroid geometry (details only)
    #[must_use]
    pub const fn centroid(&self) -> Option<&RawMap> {
        self.centroid.as_ref()
    }

    /// Address type
    #[must_use]
    pub fn address_type(&self) -> Option<&str> {
        self.address_type.as_deref()
    }

    /// Plain name
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// GeoCodeJSON label
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// GeoCodeJSON admin names keyed by level (`level2`, `level4`, ...)
    #[must_use]
    pub const fn admin_levels(&self) -> &BTreeMap<String, String> {
        &self.admin_levels
    }

    /// Whether the record identified anything at all
    ///
    /// A zero id together with an empty display name means the source
    /// record carried no identity.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        self.place_id != 0 || !self.display_name.is_empty()
    }
}

/// `[lon, lat]` of a GeoJSON point centroid
fn centroid_coordinates(centroid: &RawMap) -> Option<(f64, f64)> {
    let coordinates = centroid.get("coordinates")?.as_array()?;
    let lon = fields::to_f64(coordinates.first()?)?;
    let lat = fields::to_f64(coordinates.get(1)?)?;
    Some((lat, lon))
}
