//! Nominatim geocoding client
//!
//! Turns search/reverse/lookup/details/status calls into cached,
//! rate-limited GET requests and normalizes the answers into [`Place`]s.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::Place;
use domain::value_objects::GeoLocation;
use futures::FutureExt;
#[cfg(test)]
use mockall::automock;
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::cache::{CacheManager, CacheOptions, MokaCacheManager, NoopCacheManager, Payload};
use crate::config::{NominatimConfig, RATE_LIMIT_BUCKET};
use crate::error::NominatimError;
use crate::format::{ResponseFormat, StatusFormat};
use crate::normalizer::normalize;
use crate::rate_limit::RateLimiter;
use crate::request::{BodyKind, Endpoint, Params, SearchQuery, cache_key};
use crate::transport::{HttpRequest, HttpStatusError, ReqwestTransport, Transport};

/// Answer of the `status` endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceStatus {
    /// Structured status (`status`, `message`, `data_updated`, ...)
    Json(Map<String, Value>),
    /// Raw text (`OK` when healthy)
    Text(String),
}

/// Trait for geocoding clients
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Forward geocoding from free text or structured fields
    async fn search(
        &self,
        query: SearchQuery,
        params: Params,
    ) -> Result<Vec<Place>, NominatimError>;

    /// Reverse geocoding; `None` when nothing is found at the coordinates
    async fn reverse(
        &self,
        lat: f64,
        lon: f64,
        params: Params,
    ) -> Result<Option<Place>, NominatimError>;

    /// Look up places by OSM ids such as `R146656` or `W104393803`
    async fn lookup(&self, ids: &[String], params: Params) -> Result<Vec<Place>, NominatimError>;

    /// Full details of one object, by `osmtype`+`osmid` or `place_id`
    async fn details(&self, params: Params) -> Result<Place, NominatimError>;

    /// Service health
    async fn status(&self, format: StatusFormat) -> Result<ServiceStatus, NominatimError>;
}

/// Nominatim client with pluggable transport and cache
pub struct NominatimClient {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn CacheManager>,
    user_agent: String,
    cache_options: CacheOptions,
}

impl fmt::Debug for NominatimClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NominatimClient")
            .field("cache", &self.cache)
            .field("user_agent", &self.user_agent)
            .field("cache_options", &self.cache_options)
            .finish_non_exhaustive()
    }
}

impl NominatimClient {
    /// Create a client with the reqwest transport and the in-memory cache
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &NominatimConfig) -> Result<Self, NominatimError> {
        config.validate().map_err(NominatimError::Configuration)?;

        let transport =
            ReqwestTransport::new(&config.base_url, Duration::from_secs(config.timeout_secs))
                .map_err(|e| NominatimError::Configuration(e.to_string()))?;

        let limiter = Arc::new(RateLimiter::new());
        if config.rate_limiting_enabled() {
            limiter.configure(RATE_LIMIT_BUCKET, config.rate_limit_per_second);
        }

        let cache: Arc<dyn CacheManager> = if config.caching_enabled() {
            Arc::new(MokaCacheManager::new(
                config.cache_max_entries,
                config.stale_ttl(),
                limiter,
            ))
        } else {
            Arc::new(NoopCacheManager::new(limiter))
        };

        Ok(Self::with_collaborators(config, Arc::new(transport), cache))
    }

    /// Create a client around explicit collaborators
    #[must_use]
    pub fn with_collaborators(
        config: &NominatimConfig,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn CacheManager>,
    ) -> Self {
        Self {
            transport,
            cache,
            user_agent: config.user_agent.clone(),
            cache_options: CacheOptions {
                ttl: config.cache_ttl(),
                rate_limit_key: Some(RATE_LIMIT_BUCKET.to_string()),
                serve_stale_if_limited: config.serve_stale_if_limited,
            },
        }
    }

    /// Fetch a payload through the cache
    async fn fetch(
        &self,
        endpoint: Endpoint,
        params: Params,
        kind: BodyKind,
    ) -> Result<Payload, NominatimError> {
        let key = cache_key(&Method::GET, endpoint.path(), &params);
        let request = HttpRequest::get(endpoint.path(), params)
            .with_header("User-Agent", self.user_agent.as_str())
            .with_header("Accept", kind.accept());
        let transport = Arc::clone(&self.transport);

        let producer = async move {
            let response = transport
                .send(request)
                .await
                .map_err(|e| NominatimError::transport_caused_by("HTTP request failed", e))?;

            if !response.is_success() {
                return Err(NominatimError::transport_caused_by(
                    "HTTP request failed",
                    HttpStatusError {
                        status: response.status,
                    },
                ));
            }

            decode_body(&response.body, kind)
        }
        .boxed();

        debug!(endpoint = endpoint.path(), %key, "Fetching");
        self.cache.wrap(&key, producer, &self.cache_options).await
    }

    /// Fetch a JSON object or array
    async fn fetch_json(&self, endpoint: Endpoint, params: Params) -> Result<Value, NominatimError> {
        match self.fetch(endpoint, params, BodyKind::Json).await? {
            Payload::Json(value) => Ok(value),
            Payload::Text(_) => Err(invalid_format()),
        }
    }
}

#[async_trait]
impl GeocodingClient for NominatimClient {
    #[instrument(skip(self))]
    async fn search(
        &self,
        query: SearchQuery,
        params: Params,
    ) -> Result<Vec<Place>, NominatimError> {
        query.validate()?;

        let mut request = with_format(ResponseFormat::JsonV2.as_str());
        request.extend(params);
        query.apply(&mut request);

        let format = requested_format(&request);
        let payload = self.fetch_json(Endpoint::Search, request).await?;
        let places = normalize(&payload, format);

        debug!(count = places.len(), "Search results");
        Ok(places)
    }

    #[instrument(skip(self))]
    async fn reverse(
        &self,
        lat: f64,
        lon: f64,
        params: Params,
    ) -> Result<Option<Place>, NominatimError> {
        let location =
            GeoLocation::new(lat, lon).map_err(|e| NominatimError::InvalidInput(e.to_string()))?;

        let mut request = with_format(ResponseFormat::JsonV2.as_str());
        request.extend(params);
        request.insert("lat".to_string(), location.latitude().to_string());
        request.insert("lon".to_string(), location.longitude().to_string());

        let format = requested_format(&request);
        let payload = self.fetch_json(Endpoint::Reverse, request).await?;
        let place = normalize(&payload, format).into_iter().next();

        debug!(found = place.is_some(), "Reverse result");
        Ok(place)
    }

    #[instrument(skip(self))]
    async fn lookup(&self, ids: &[String], params: Params) -> Result<Vec<Place>, NominatimError> {
        let ids: Vec<&str> = ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .collect();
        if ids.is_empty() {
            return Err(NominatimError::InvalidInput(
                "At least one OSM id is required".to_string(),
            ));
        }

        let mut request = with_format(ResponseFormat::JsonV2.as_str());
        request.extend(params);
        request.insert("osm_ids".to_string(), ids.join(","));

        let format = requested_format(&request);
        let payload = self.fetch_json(Endpoint::Lookup, request).await?;
        let places = normalize(&payload, format);

        debug!(count = places.len(), "Lookup results");
        Ok(places)
    }

    #[instrument(skip(self))]
    async fn details(&self, params: Params) -> Result<Place, NominatimError> {
        let by_osm = params.contains_key("osmtype") && params.contains_key("osmid");
        if !by_osm && !params.contains_key("place_id") {
            return Err(NominatimError::InvalidInput(
                "Either osmtype and osmid or place_id is required".to_string(),
            ));
        }

        let mut request = params;
        request.insert("format".to_string(), ResponseFormat::Json.as_str().to_string());

        let payload = self.fetch_json(Endpoint::Details, request).await?;
        let place = match &payload {
            Value::Object(map) => Place::from_map(map),
            Value::Array(items) => items
                .iter()
                .find_map(Value::as_object)
                .map(Place::from_map)
                .unwrap_or_default(),
            _ => Place::default(),
        };

        if !place.has_identity() {
            debug!("Details response carried no place identity");
        }
        Ok(place)
    }

    #[instrument(skip(self))]
    async fn status(&self, format: StatusFormat) -> Result<ServiceStatus, NominatimError> {
        let request = with_format(format.as_str());

        match format {
            StatusFormat::Text => match self.fetch(Endpoint::Status, request, BodyKind::Text).await? {
                Payload::Text(text) => Ok(ServiceStatus::Text(text)),
                Payload::Json(value) => Ok(ServiceStatus::Text(value.to_string())),
            },
            StatusFormat::Json => match self.fetch_json(Endpoint::Status, request).await? {
                Value::Object(map) => Ok(ServiceStatus::Json(map)),
                _ => Err(invalid_format()),
            },
        }
    }
}

fn with_format(format: &str) -> Params {
    let mut params = Params::new();
    params.insert("format".to_string(), format.to_string());
    params
}

/// Format the request actually asks for; caller params may override the default
fn requested_format(params: &Params) -> Option<ResponseFormat> {
    params
        .get("format")
        .and_then(|format| ResponseFormat::from_wire(format))
}

fn invalid_format() -> NominatimError {
    NominatimError::transport("API returned invalid data format")
}

/// Decode a response body into a payload
fn decode_body(body: &[u8], kind: BodyKind) -> Result<Payload, NominatimError> {
    match kind {
        BodyKind::Text => Ok(Payload::Text(String::from_utf8_lossy(body).into_owned())),
        BodyKind::Json => {
            let value: Value = serde_json::from_slice(body).map_err(|e| {
                NominatimError::transport_caused_by("Failed to decode JSON response", e)
            })?;
            if value.is_object() || value.is_array() {
                Ok(Payload::Json(value))
            } else {
                Err(invalid_format())
            }
        },
    }
}
