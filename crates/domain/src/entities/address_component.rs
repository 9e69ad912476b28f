//! One row of a details-endpoint address list

use serde::{Deserialize, Serialize};

use crate::fields::{self, RawMap};

/// A single level of the address hierarchy as returned by `details`
///
/// The details endpoint lists every object that contributes to a place's
/// address, including rows that are not part of the canonical address
/// (`is_address == false`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    /// Name in the local language
    pub local_name: String,
    /// OSM object id
    pub osm_id: Option<u64>,
    /// OSM object type (`N`, `W`, `R`)
    pub osm_type: Option<String>,
    /// Main OSM tag key
    pub class: Option<String>,
    /// Main OSM tag value
    pub component_type: Option<String>,
    /// OSM administrative level
    pub admin_level: Option<i64>,
    /// Nominatim address rank
    pub rank_address: i64,
    /// Whether this row is part of the canonical address
    pub is_address: bool,
}

impl AddressComponent {
    /// Build a component from one element of the details `address` array
    #[must_use]
    pub fn from_map(map: &RawMap) -> Self {
        Self {
            local_name: fields::first_str(map, &["localname"]).unwrap_or_default(),
            osm_id: fields::first_u64(map, &["osm_id"]),
            osm_type: fields::first_str(map, &["osm_type"]),
            class: fields::first_str(map, &["class"]),
            component_type: fields::first_str(map, &["type"]),
            admin_level: fields::first_i64(map, &["admin_level"]),
            rank_address: fields::first_i64(map, &["rank_address"]).unwrap_or(0),
            is_address: fields::first_bool(map, &["isaddress"]).unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn maps_details_row() {
        let row = json!({
            "localname": "Mitte",
            "place_id": 1_234,
            "osm_id": 16_347,
            "osm_type": "R",
            "place_type": null,
            "class": "boundary",
            "type": "administrative",
            "admin_level": 9,
            "rank_address": 20,
            "distance": 0.005,
            "isaddress": true
        });
        let component = AddressComponent::from_map(row.as_object().unwrap());

        assert_eq!(component.local_name, "Mitte");
        assert_eq!(component.osm_id, Some(16_347));
        assert_eq!(component.osm_type.as_deref(), Some("R"));
        assert_eq!(component.class.as_deref(), Some("boundary"));
        assert_eq!(component.component_type.as_deref(), Some("administrative"));
        assert_eq!(component.admin_level, Some(9));
        assert_eq!(component.rank_address, 20);
        assert!(component.is_address);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let component = AddressComponent::from_map(&RawMap::new());
        assert_eq!(component, AddressComponent::default());
        assert!(component.local_name.is_empty());
        assert_eq!(component.rank_address, 0);
        assert!(!component.is_address);
    }

    #[test]
    fn string_admin_level_is_parsed() {
        let row = json!({"admin_level": "15", "isaddress": false});
        let component = AddressComponent::from_map(row.as_object().unwrap());
        assert_eq!(component.admin_level, Some(15));
        assert!(!component.is_address);
    }
}
