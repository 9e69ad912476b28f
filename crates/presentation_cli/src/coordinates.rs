//! Coordinate text parsing
//!
//! Accepts the forms people paste from maps and encyclopedias:
//!
//! - decimal pairs: `50.3122, 28.4314` or `50.3122 28.4314`
//! - DMS with ASCII or typographic marks: `50°18'44" N 28°25'53" E`,
//!   `50°18′44″ 28°25′53″`
//! - DMS with Ukrainian hemisphere markers: `50°18′44″ пн. ш. 28°25′53″ сх. д.`
//!
//! Seconds (and minutes) may be omitted. Without hemisphere markers the
//! first value is the latitude.

use std::sync::LazyLock;

use domain::value_objects::{GeoLocation, InvalidCoordinates};
use regex::{Captures, Regex};
use thiserror::Error;

#[allow(clippy::expect_used)]
static DECIMAL_COMMA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*$").expect("valid regex")
});

#[allow(clippy::expect_used)]
static DECIMAL_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s+(-?\d+(?:\.\d+)?)\s*$").expect("valid regex")
});

#[allow(clippy::expect_used)]
static DMS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(\d+(?:\.\d+)?)\s*°\s*(?:(\d+(?:\.\d+)?)\s*[′'’]\s*)?(?:(\d+(?:\.\d+)?)\s*[″"”]\s*)?(пн\.?\s*ш\.?|пд\.?\s*ш\.?|сх\.?\s*д\.?|зх\.?\s*д\.?|[NSEW]\b)?"#,
    )
    .expect("valid regex")
});

/// Coordinate text that could not be turned into a location
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// No supported coordinate notation found
    #[error("Invalid coordinates format: {0}")]
    Unrecognized(String),

    /// Parsed, but outside the valid range
    #[error(transparent)]
    OutOfRange(#[from] InvalidCoordinates),
}

/// Axis a DMS value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Latitude,
    Longitude,
}

/// One DMS value with its optional hemisphere
#[derive(Debug, Clone, Copy)]
struct DmsValue {
    degrees: f64,
    axis: Option<Axis>,
}

/// Parse a coordinate pair from free text
///
/// # Errors
///
/// Returns [`CoordinateError::Unrecognized`] if no notation matches and
/// [`CoordinateError::OutOfRange`] if the values are not valid coordinates.
pub fn parse_coordinates(text: &str) -> Result<GeoLocation, CoordinateError> {
    if let Some((lat, lon)) = decimal_pair(&DECIMAL_COMMA_RE, text)
        .or_else(|| decimal_pair(&DECIMAL_SPACE_RE, text))
    {
        return Ok(GeoLocation::new(lat, lon)?);
    }

    let (lat, lon) =
        dms_pair(text).ok_or_else(|| CoordinateError::Unrecognized(text.trim().to_string()))?;
    Ok(GeoLocation::new(lat, lon)?)
}

fn decimal_pair(re: &Regex, text: &str) -> Option<(f64, f64)> {
    let caps = re.captures(text)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

fn dms_pair(text: &str) -> Option<(f64, f64)> {
    let values: Vec<DmsValue> = DMS_RE.captures_iter(text).filter_map(|c| dms_value(&c)).collect();

    let marked = |axis| {
        values
            .iter()
            .find(|value| value.axis == Some(axis))
            .map(|value| value.degrees)
    };
    let mut unmarked = values
        .iter()
        .filter(|value| value.axis.is_none())
        .map(|value| value.degrees);

    let lat = marked(Axis::Latitude).or_else(|| unmarked.next())?;
    let lon = marked(Axis::Longitude).or_else(|| unmarked.next())?;
    Some((lat, lon))
}

fn dms_value(caps: &Captures<'_>) -> Option<DmsValue> {
    let part = |index: usize| -> Option<f64> {
        caps.get(index).map_or(Some(0.0), |m| m.as_str().parse().ok())
    };

    let magnitude = part(1)? + part(2)? / 60.0 + part(3)? / 3600.0;

    let (axis, sign) = match caps.get(4).map(|m| hemisphere_key(m.as_str())) {
        Some('N') => (Some(Axis::Latitude), 1.0),
        Some('S') => (Some(Axis::Latitude), -1.0),
        Some('E') => (Some(Axis::Longitude), 1.0),
        Some('W') => (Some(Axis::Longitude), -1.0),
        _ => (None, 1.0),
    };

    Some(DmsValue {
        degrees: sign * magnitude,
        axis,
    })
}

/// Map a hemisphere marker to `N`, `S`, `E` or `W`
fn hemisphere_key(marker: &str) -> char {
    let lower = marker.to_lowercase();
    if lower.starts_with("пн") {
        'N'
    } else if lower.starts_with("пд") {
        'S'
    } else if lower.starts_with("сх") {
        'E'
    } else if lower.starts_with("зх") {
        'W'
    } else {
        marker
            .chars()
            .next()
            .map_or(' ', |c| c.to_ascii_uppercase())
    }
}
