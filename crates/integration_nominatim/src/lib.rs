//! Nominatim geocoding client
//!
//! Geocodes free-text and structured queries, reverse-geocodes coordinates,
//! and looks up OSM objects via the [Nominatim](https://nominatim.org) API.
//! Every response format (`json`, `jsonv2`, `geojson`, `geocodejson`) is
//! normalized into the same [`domain::Place`] model.
//!
//! # Architecture
//!
//! [`GeocodingClient`] defines the operations, implemented by
//! [`NominatimClient`]. The client talks HTTP through the [`Transport`] trait
//! ([`ReqwestTransport`] by default) and routes every request through a
//! [`CacheManager`] ([`MokaCacheManager`] by default), which also enforces the
//! service's rate limit of one request per second.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_nominatim::{GeocodingClient, NominatimClient, NominatimConfig, params};
//!
//! let client = NominatimClient::new(&NominatimConfig::default())?;
//!
//! let places = client
//!     .search("Kyiv".into(), params([("addressdetails", "1"), ("limit", "1")]))
//!     .await?;
//! let place = client.reverse(50.45, 30.52, params([("zoom", "10")])).await?;
//! ```

mod cache;
mod client;
mod config;
mod error;
mod format;
mod normalizer;
mod rate_limit;
mod request;
mod transport;

pub use cache::{
    CacheManager, CacheOptions, CacheStats, MokaCacheManager, NoopCacheManager, Payload, Producer,
};
pub use client::{GeocodingClient, NominatimClient, ServiceStatus};
pub use config::{NominatimConfig, RATE_LIMIT_BUCKET};
pub use error::{ErrorSource, NominatimError};
pub use format::{ResponseFormat, StatusFormat};
pub use normalizer::{ResponseShape, normalize};
pub use rate_limit::RateLimiter;
pub use request::{CACHE_KEY_PREFIX, Endpoint, Params, SearchQuery, cache_key, params};
pub use transport::{
    BoxError, HttpRequest, HttpResponse, HttpStatusError, ReqwestTransport, Transport,
};
