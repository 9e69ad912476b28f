//! Domain entities - Geocoded places and their addresses

mod address;
mod address_component;
mod place;

pub use address::Address;
pub use address_component::AddressComponent;
pub use place::{Place, PlaceAddress};
