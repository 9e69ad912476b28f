//! Value Objects - Immutable, identity-less domain primitives

mod bounding_box;
mod geo_location;
mod geometry;

pub use bounding_box::BoundingBox;
pub use geo_location::{GeoLocation, InvalidCoordinates};
pub use geometry::Geometry;
