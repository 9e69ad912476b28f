//! Domain layer for the Nominatim geocoding client
//!
//! Contains the normalized place model ([`Place`], [`Address`],
//! [`AddressComponent`]) and the value objects it is built from.
//! Everything here is immutable after construction and free of I/O.

pub mod entities;
pub mod fields;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
