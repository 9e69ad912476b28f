//! Keyed address of a place
//!
//! Nominatim returns `address` as a flat object whose keys name the
//! administrative or point-of-interest level (`city`, `road`, `shop`, ...).
//! [`Address`] gives every documented key its own field; keys without a
//! field are kept in [`Address::other`] so nothing is dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fields::{self, RawMap};

macro_rules! address_record {
    ($( $(#[$doc:meta])* $field:ident => [$($key:literal),+] ),+ $(,)?) => {
        /// Structured address with one optional field per known component
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct Address {
            $(
                $(#[$doc])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<String>,
            )+
            /// Components without a dedicated field, keyed by source name
            #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
            pub other: BTreeMap<String, String>,
        }

        impl Address {
            /// Source keys that map onto a dedicated field
            const KNOWN_KEYS: &'static [&'static str] = &[$($($key),+),+];

            /// Build an address from the raw `address` object
            #[must_use]
            pub fn from_map(map: &RawMap) -> Self {
                let other = map
                    .iter()
                    .filter(|(key, _)| !Self::KNOWN_KEYS.contains(&key.as_str()))
                    .filter_map(|(key, value)| {
                        fields::scalar_to_string(value).map(|s| (key.clone(), s))
                    })
                    .collect();

                Self {
                    $( $field: fields::first_str(map, &[$($key),+]), )+
                    other,
                }
            }

            /// Look up a component by its source key
            #[must_use]
            pub fn get(&self, key: &str) -> Option<&str> {
                match key {
                    $( $($key)|+ => self.$field.as_deref(), )+
                    _ => self.other.get(key).map(String::as_str),
                }
            }
        }
    };
}

address_record! {
    /// Country name
    country => ["country"],
    /// ISO 3166-1 alpha-2 country code (lowercase)
    country_code => ["country_code"],
    /// Continent
    continent => ["continent"],
    /// State
    state => ["state"],
    /// Region
    region => ["region"],
    /// State district
    state_district => ["state_district"],
    /// County
    county => ["county"],
    /// Municipality
    municipality => ["municipality"],
    /// City
    city => ["city"],
    /// Town
    town => ["town"],
    /// Village
    village => ["village"],
    /// City district
    city_district => ["city_district"],
    /// District
    district => ["district"],
    /// Borough
    borough => ["borough"],
    /// Suburb
    suburb => ["suburb"],
    /// Subdivision
    subdivision => ["subdivision"],
    /// Hamlet
    hamlet => ["hamlet"],
    /// Croft
    croft => ["croft"],
    /// Isolated dwelling
    isolated_dwelling => ["isolated_dwelling"],
    /// Neighbourhood
    neighbourhood => ["neighbourhood"],
    /// Allotments
    allotments => ["allotments"],
    /// Quarter
    quarter => ["quarter"],
    /// City block
    city_block => ["city_block"],
    /// Residential area
    residential => ["residential"],
    /// Farm
    farm => ["farm"],
    /// Farmyard
    farmyard => ["farmyard"],
    /// Industrial area
    industrial => ["industrial"],
    /// Commercial area
    commercial => ["commercial"],
    /// Retail area
    retail => ["retail"],
    /// Road
    road => ["road"],
    /// House number
    house_number => ["house_number", "housenumber"],
    /// House name
    house_name => ["house_name"],
    /// Postcode
    postcode => ["postcode"],
    /// ISO 3166-2 subdivision code at admin level 4
    iso3166_2_lvl4 => ["ISO3166-2-lvl4"],
    emergency => ["emergency"],
    historic => ["historic"],
    military => ["military"],
    natural => ["natural"],
    landuse => ["landuse"],
    place => ["place"],
    railway => ["railway"],
    man_made => ["man_made"],
    aerialway => ["aerialway"],
    boundary => ["boundary"],
    amenity => ["amenity"],
    aeroway => ["aeroway"],
    club => ["club"],
    craft => ["craft"],
    leisure => ["leisure"],
    office => ["office"],
    mountain_pass => ["mountain_pass"],
    shop => ["shop"],
    tourism => ["tourism"],
    bridge => ["bridge"],
    tunnel => ["tunnel"],
    waterway => ["waterway"],
}

impl Address {
    /// Name of the settlement: city, town, village or hamlet, in that order
    #[must_use]
    pub fn settlement(&self) -> Option<&str> {
        [&self.city, &self.town, &self.village, &self.hamlet]
            .into_iter()
            .filter_map(Option::as_deref)
            .find(|name| !name.trim().is_empty())
    }

    /// Whether no component is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
