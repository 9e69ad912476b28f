//! Response formats understood by the normalizer

use std::fmt;
use std::str::FromStr;

use crate::error::NominatimError;

/// Output format requested through the `format` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseFormat {
    /// Legacy `json` output
    Json,
    /// Versioned `jsonv2` output (`category` instead of `class`)
    #[default]
    JsonV2,
    /// GeoJSON `FeatureCollection`
    GeoJson,
    /// GeoCodeJSON `FeatureCollection` with a nested `geocoding` object
    GeoCodeJson,
}

impl ResponseFormat {
    /// Wire value of the `format` parameter
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::JsonV2 => "jsonv2",
            Self::GeoJson => "geojson",
            Self::GeoCodeJson => "geocodejson",
        }
    }

    /// Parse a wire value, returning `None` for formats the normalizer treats generically
    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonv2" => Some(Self::JsonV2),
            "geojson" => Some(Self::GeoJson),
            "geocodejson" => Some(Self::GeoCodeJson),
            _ => None,
        }
    }

    /// True for the `FeatureCollection` based formats
    #[must_use]
    pub const fn is_feature_collection(&self) -> bool {
        matches!(self, Self::GeoJson | Self::GeoCodeJson)
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format of the `status` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFormat {
    /// Structured status object
    #[default]
    Json,
    /// Plain `OK` / error text
    Text,
}

impl StatusFormat {
    /// Wire value of the `format` parameter
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

impl FromStr for StatusFormat {
    type Err = NominatimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(NominatimError::InvalidInput(format!(
                "Invalid status format '{other}': expected 'json' or 'text'"
            ))),
        }
    }
}

impl fmt::Display for StatusFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_format_wire_values() {
        for format in [
            ResponseFormat::Json,
            ResponseFormat::JsonV2,
            ResponseFormat::GeoJson,
            ResponseFormat::GeoCodeJson,
        ] {
            assert_eq!(ResponseFormat::from_wire(format.as_str()), Some(format));
        }
        assert_eq!(ResponseFormat::from_wire("GeoJSON"), Some(ResponseFormat::GeoJson));
        assert_eq!(ResponseFormat::from_wire("xml"), None);
    }

    #[test]
    fn test_feature_collection_formats() {
        assert!(ResponseFormat::GeoJson.is_feature_collection());
        assert!(ResponseFormat::GeoCodeJson.is_feature_collection());
        assert!(!ResponseFormat::JsonV2.is_feature_collection());
        assert_eq!(ResponseFormat::default(), ResponseFormat::JsonV2);
    }

    #[test]
    fn test_status_format_parsing() {
        assert_eq!("json".parse::<StatusFormat>().unwrap(), StatusFormat::Json);
        assert_eq!("text".parse::<StatusFormat>().unwrap(), StatusFormat::Text);
        assert_eq!(StatusFormat::default(), StatusFormat::Json);

        let err = "xml".parse::<StatusFormat>().unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("xml"));
    }
}
