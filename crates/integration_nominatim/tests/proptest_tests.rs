//! Property-based tests for request validation and cache keys

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use integration_nominatim::{
    BoxError, GeocodingClient, HttpRequest, HttpResponse, NoopCacheManager, NominatimClient,
    NominatimConfig, NominatimError, Params, RateLimiter, Transport, cache_key,
};
use proptest::prelude::*;

/// Counts requests and answers every one with an empty list
#[derive(Debug, Default)]
struct CountingTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for CountingTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(HttpResponse::new(200, "[]"))
    }
}

fn client(transport: &Arc<CountingTransport>) -> NominatimClient {
    NominatimClient::with_collaborators(
        &NominatimConfig::for_testing(),
        Arc::clone(transport) as Arc<dyn Transport>,
        Arc::new(NoopCacheManager::new(Arc::new(RateLimiter::new()))),
    )
}

fn reverse(lat: f64, lon: f64) -> (Result<(), NominatimError>, usize) {
    let transport = Arc::new(CountingTransport::default());
    let client = client(&transport);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let result = runtime
        .block_on(client.reverse(lat, lon, Params::new()))
        .map(|_| ());
    (result, transport.calls.load(Ordering::SeqCst))
}

proptest! {
    #[test]
    fn reverse_in_range_reaches_transport(
        lat in -90.0f64..=90.0f64,
        lon in -180.0f64..=180.0f64
    ) {
        let (result, calls) = reverse(lat, lon);
        prop_assert!(result.is_ok());
        prop_assert_eq!(calls, 1);
    }

    #[test]
    fn reverse_out_of_range_never_reaches_transport(
        lat in prop_oneof![(-1000.0f64..-90.1f64), (90.1f64..1000.0f64)],
        lon in -180.0f64..=180.0f64
    ) {
        let (result, calls) = reverse(lat, lon);
        prop_assert!(result.is_err_and(|e| e.is_invalid_input()));
        prop_assert_eq!(calls, 0);
    }

    #[test]
    fn cache_key_ignores_insertion_order(
        pairs in prop::collection::vec(("[a-z]{1,8}", "[a-zA-Z0-9 ]{0,12}"), 0..8)
    ) {
        let forward: Params = pairs.iter().cloned().collect();
        let backward: Params = pairs.iter().rev().cloned().collect();
        // Duplicate keys resolve differently depending on order
        prop_assume!(forward == backward);

        let method = reqwest::Method::GET;
        prop_assert_eq!(
            cache_key(&method, "search", &forward),
            cache_key(&method, "search", &backward)
        );
        prop_assert!(cache_key(&method, "search", &forward).starts_with("nominatim:"));
    }

    #[test]
    fn cache_key_depends_on_path(q in "[a-z]{1,16}") {
        let params: Params = [("q".to_string(), q)].into_iter().collect();
        let method = reqwest::Method::GET;
        prop_assert_ne!(
            cache_key(&method, "search", &params),
            cache_key(&method, "lookup", &params)
        );
    }
}
