//! Request building blocks: parameters, queries, endpoints and cache keys

use std::collections::BTreeMap;

use reqwest::Method;

use crate::error::NominatimError;

/// Query parameters of a request
///
/// Ordered by key so that logically equal requests serialize identically.
pub type Params = BTreeMap<String, String>;

/// Prefix shared by every cache key
pub const CACHE_KEY_PREFIX: &str = "nominatim";

/// Build a [`Params`] map from string pairs
#[must_use]
pub fn params<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Params {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Free-text or structured search input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Sent as the `q` parameter
    Text(String),
    /// Structured fields (`street`, `city`, `country`, ...) sent as-is
    Structured(Params),
}

impl SearchQuery {
    /// Reject queries that would send nothing to search for
    ///
    /// # Errors
    ///
    /// Returns [`NominatimError::InvalidInput`] for blank text or an empty structured map.
    pub fn validate(&self) -> Result<(), NominatimError> {
        match self {
            Self::Text(text) if text.trim().is_empty() => Err(NominatimError::InvalidInput(
                "Query cannot be empty".to_string(),
            )),
            Self::Structured(fields) if fields.is_empty() => Err(NominatimError::InvalidInput(
                "Structured query cannot be empty".to_string(),
            )),
            Self::Text(_) | Self::Structured(_) => Ok(()),
        }
    }

    /// Merge the query into request parameters (last, so it wins over caller params)
    ///
    /// A structured query drops any caller `q`; the service rejects the mix.
    pub fn apply(self, params: &mut Params) {
        match self {
            Self::Text(text) => {
                params.insert("q".to_string(), text);
            },
            Self::Structured(fields) => {
                params.remove("q");
                params.extend(fields);
            },
        }
    }
}

impl From<&str> for SearchQuery {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for SearchQuery {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Service endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Forward geocoding
    Search,
    /// Reverse geocoding
    Reverse,
    /// OSM id lookup
    Lookup,
    /// Single object details
    Details,
    /// Service health
    Status,
}

impl Endpoint {
    /// Path relative to the base URL
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Reverse => "reverse",
            Self::Lookup => "lookup",
            Self::Details => "details",
            Self::Status => "status",
        }
    }
}

/// Expected body of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// JSON object or array
    Json,
    /// Raw text
    Text,
}

impl BodyKind {
    /// Value of the `Accept` header
    #[must_use]
    pub const fn accept(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Text => "text/plain",
        }
    }
}

/// Deterministic cache key for a request
///
/// `Params` is key-ordered, so insertion order never changes the key. Every
/// part is length-prefixed, so separators inside values cannot collide.
#[must_use]
pub fn cache_key(method: &Method, path: &str, params: &Params) -> String {
    let mut hasher = blake3::Hasher::new();
    update_part(&mut hasher, method.as_str());
    update_part(&mut hasher, path);
    hasher.update(&(params.len() as u64).to_le_bytes());
    for (key, value) in params {
        update_part(&mut hasher, key);
        update_part(&mut hasher, value);
    }
    format!("{CACHE_KEY_PREFIX}:{}", hasher.finalize().to_hex())
}

fn update_part(hasher: &mut blake3::Hasher, part: &str) {
    hasher.update(&(part.len() as u64).to_le_bytes());
    hasher.update(part.as_bytes());
}
