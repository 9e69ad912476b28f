//! Bounding box value object

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fields::to_f64;

/// Area covered by a place, in Nominatim's `[min_lat, max_lat, min_lon, max_lon]` order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern edge
    pub min_lat: f64,
    /// Northern edge
    pub max_lat: f64,
    /// Western edge
    pub min_lon: f64,
    /// Eastern edge
    pub max_lon: f64,
}

impl BoundingBox {
    /// Parse a Nominatim `boundingbox` array (`[min_lat, max_lat, min_lon, max_lon]`)
    ///
    /// Elements may be numbers or numeric strings. Anything other than
    /// exactly four convertible elements yields `None`.
    #[must_use]
    pub fn from_nominatim(value: &Value) -> Option<Self> {
        let [min_lat, max_lat, min_lon, max_lon] = four_floats(value)?;
        Some(Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }

    /// Parse a GeoJSON `bbox` array (`[min_lon, min_lat, max_lon, max_lat]`)
    #[must_use]
    pub fn from_geojson(value: &Value) -> Option<Self> {
        let [min_lon, min_lat, max_lon, max_lat] = four_floats(value)?;
        Some(Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }

    /// The box in Nominatim order
    #[must_use]
    pub const fn to_array(&self) -> [f64; 4] {
        [self.min_lat, self.max_lat, self.min_lon, self.max_lon]
    }
}

fn four_floats(value: &Value) -> Option<[f64; 4]> {
    let items = value.as_array()?;
    if items.len() != 4 {
        return None;
    }
    Some([
        to_f64(&items[0])?,
        to_f64(&items[1])?,
        to_f64(&items[2])?,
        to_f64(&items[3])?,
    ])
}
