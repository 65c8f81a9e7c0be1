//! Client for the boundary and geocoding endpoints

use std::time::Duration;

use aptmap_common::auth::{AccessToken, TokenCache};
use aptmap_common::resilience::{RetryBudget, SlidingWindow};
use aptmap_domain::{
    AptMapError, Result, SgisCredentials, GEOCODE_MAX_ATTEMPTS, GEOCODE_RETRY_DELAY_SECS,
    RATE_LIMIT_MAX_CALLS, RATE_LIMIT_PERIOD_SECS, TOKEN_REFRESH_SKEW_SECS,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::auth::SgisAuthenticator;
use super::{envelope, geo};
use crate::http::{decode_response, HttpClient};
use crate::integrations::value_util::normalize_items;

const DEFAULT_BASE_URL: &str = "https://sgisapi.kostat.go.kr";
const AUTH_PATH: &str = "/OpenAPI3/auth/authentication.json";
const BOUNDARY_PATH: &str = "/OpenAPI3/boundary/hadmarea.geojson";
const GEOCODE_WGS84_PATH: &str = "/OpenAPI3/addr/geocodewgs84.json";
const GEOCODE_UTMK_PATH: &str = "/OpenAPI3/addr/geocode.json";

/// How far below the requested region the boundary query descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LowSearch {
    /// Only the region itself
    Exact,
    /// One administrative level down
    #[default]
    Children,
    /// Every level down
    Descendants,
}

impl LowSearch {
    fn as_param(self) -> &'static str {
        match self {
            Self::Exact => "0",
            Self::Children => "1",
            Self::Descendants => "2",
        }
    }
}

/// Client for the statistical-geography endpoints.
///
/// Owns its token cache and per-method limiters exclusively. The geocoding
/// endpoint is known to reject requests intermittently, so it runs under a
/// bounded retry: stale-token rejections force a re-authentication, other
/// classified rejections wait out a fixed delay, and the loop gives up after
/// a fixed attempt ceiling.
pub struct SgisClient {
    http: HttpClient,
    tokens: TokenCache<SgisAuthenticator>,
    boundary_limiter: SlidingWindow,
    geocode_limiter: SlidingWindow,
    retry_budget: RetryBudget,
    base_url: String,
    cancel: CancellationToken,
}

impl SgisClient {
    /// Create a client. Fails fast on empty credentials.
    pub fn new(credentials: SgisCredentials) -> Result<Self> {
        Self::assemble(credentials, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client against a different host (for testing).
    #[cfg(test)]
    pub fn with_base_url(credentials: SgisCredentials, base_url: impl Into<String>) -> Result<Self> {
        Self::assemble(credentials, base_url.into())
    }

    fn assemble(credentials: SgisCredentials, base_url: String) -> Result<Self> {
        let http = HttpClient::new()?;
        let authenticator =
            SgisAuthenticator::new(http.clone(), credentials, format!("{base_url}{AUTH_PATH}"));
        let tokens =
            TokenCache::new(authenticator, Duration::from_secs(TOKEN_REFRESH_SKEW_SECS));
        let retry_budget =
            RetryBudget::new(GEOCODE_MAX_ATTEMPTS, Duration::from_secs(GEOCODE_RETRY_DELAY_SECS))
                .map_err(AptMapError::Internal)?;

        Ok(Self {
            http,
            tokens,
            boundary_limiter: default_limiter()?,
            geocode_limiter: default_limiter()?,
            retry_budget,
            base_url,
            cancel: CancellationToken::new(),
        })
    }

    /// Attach a cancellation token; limiter waits, token round trips and
    /// retry pauses abort when it fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Replace the retry policy (for testing the bounded loop quickly).
    #[cfg(test)]
    pub fn with_retry_budget(mut self, retry_budget: RetryBudget) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    /// Widen the per-method quotas (for tests that hammer the mock server).
    #[cfg(test)]
    pub fn with_rate_limits(mut self, max_calls: u32, period: Duration) -> Result<Self> {
        self.boundary_limiter = SlidingWindow::new(max_calls, period).map_err(AptMapError::Internal)?;
        self.geocode_limiter = SlidingWindow::new(max_calls, period).map_err(AptMapError::Internal)?;
        Ok(self)
    }

    /// Fetch administrative boundaries as a WGS84 feature collection.
    ///
    /// `adm_cd` filters to one region (absent means the whole country),
    /// `low_search` picks the descent depth, `year` the reference year. The
    /// returned string is a compact GeoJSON feature collection with
    /// coordinates in decimal degrees and properties restricted to
    /// `adm_cd`/`adm_nm`/`addr_en`.
    pub async fn boundary(
        &self,
        adm_cd: Option<&str>,
        low_search: LowSearch,
        year: &str,
    ) -> Result<String> {
        self.boundary_limiter
            .acquire_cancellable(&self.cancel)
            .await
            .map_err(|_| AptMapError::Cancelled)?;
        let token = self.token().await?;

        let url = format!("{}{}", self.base_url, BOUNDARY_PATH);
        let mut query: Vec<(&str, String)> = vec![
            ("accessToken", token.value),
            ("low_search", low_search.as_param().to_string()),
            ("year", year.to_string()),
        ];
        if let Some(adm_cd) = adm_cd {
            query.push(("adm_cd", adm_cd.to_string()));
        }

        let body = self.http.get_text(&url, &query).await?;
        let decoded = decode_response(&body)?;
        envelope::classify(&decoded)?;

        let collection = geo::reproject_to_wgs84(&body)?;
        info!(adm_cd, year, bytes = collection.len(), "fetched administrative boundaries");
        Ok(collection)
    }

    /// Geocode an address to WGS84 hits, with the bounded retry.
    ///
    /// # Errors
    /// `RetryBudgetExhausted` once the attempt ceiling is reached; transport
    /// and malformed-response errors propagate immediately.
    pub async fn geocode(&self, address: &str, page: u32, limit: u32) -> Result<Vec<Value>> {
        let url = format!("{}{}", self.base_url, GEOCODE_WGS84_PATH);
        let mut last_error = String::new();

        for attempt in 1..=self.retry_budget.max_attempts() {
            self.geocode_limiter
                .acquire_cancellable(&self.cancel)
                .await
                .map_err(|_| AptMapError::Cancelled)?;
            let token = self.token().await?;

            match self.geocode_once(&url, &token, address, page, limit).await {
                Ok(hits) => return Ok(hits),
                Err(err @ AptMapError::Auth { .. }) => {
                    warn!(attempt, error = %err, "stale token while geocoding, re-authenticating");
                    last_error = err.to_string();
                    self.retry_budget.pause(&self.cancel).await.map_err(|_| AptMapError::Cancelled)?;
                    self.tokens.invalidate().await;
                }
                Err(err @ AptMapError::Api { .. }) => {
                    warn!(attempt, error = %err, "geocoding rejected, retrying");
                    last_error = err.to_string();
                    self.retry_budget.pause(&self.cancel).await.map_err(|_| AptMapError::Cancelled)?;
                }
                Err(other) => return Err(other),
            }
        }

        Err(AptMapError::RetryBudgetExhausted {
            attempts: self.retry_budget.max_attempts(),
            last_error,
        })
    }

    /// Geocode an address in the service's native planar reference (UTM-K).
    /// Single attempt; classified failures propagate to the caller.
    pub async fn geocode_utmk(&self, address: &str, page: u32, limit: u32) -> Result<Vec<Value>> {
        self.geocode_limiter
            .acquire_cancellable(&self.cancel)
            .await
            .map_err(|_| AptMapError::Cancelled)?;
        let token = self.token().await?;

        let url = format!("{}{}", self.base_url, GEOCODE_UTMK_PATH);
        self.geocode_once(&url, &token, address, page, limit).await
    }

    async fn geocode_once(
        &self,
        url: &str,
        token: &AccessToken,
        address: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Value>> {
        let query: Vec<(&str, String)> = vec![
            ("accessToken", token.value.clone()),
            ("address", address.to_string()),
            ("pagenum", page.to_string()),
            ("resultcount", limit.to_string()),
        ];

        let body = self.http.get_text(url, &query).await?;
        let decoded = decode_response(&body)?;
        envelope::classify(&decoded)?;

        Ok(normalize_items(decoded.get("result").and_then(|result| result.get("resultdata"))))
    }

    async fn token(&self) -> Result<AccessToken> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(AptMapError::Cancelled),
            token = self.tokens.get() => token,
        }
    }
}

fn default_limiter() -> Result<SlidingWindow> {
    SlidingWindow::new(RATE_LIMIT_MAX_CALLS, Duration::from_secs(RATE_LIMIT_PERIOD_SECS))
        .map_err(AptMapError::Internal)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> SgisClient {
        SgisClient::with_base_url(SgisCredentials::new("ck", "cs").unwrap(), server.uri())
            .unwrap()
            .with_rate_limits(1_000, Duration::from_secs(1))
            .unwrap()
    }

    async fn mount_auth(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(AUTH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errCd": 0,
                "errMsg": "Success",
                "result": {"accessTimeout": "9999999999999", "accessToken": "token-1"}
            })))
            .mount(server)
            .await;
    }

    fn boundary_body() -> serde_json::Value {
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [953_820.0, 1_952_000.0]},
                "properties": {"adm_cd": "11", "adm_nm": "서울특별시", "addr_en": "Seoul", "x": "1"}
            }]
        })
    }

    async fn requests_for(server: &MockServer, route: &str) -> usize {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == route)
            .count()
    }

    #[tokio::test]
    async fn boundary_authenticates_then_reprojects() {
        let server = MockServer::start().await;
        mount_auth(&server).await;
        Mock::given(method("GET"))
            .and(path(BOUNDARY_PATH))
            .and(query_param("accessToken", "token-1"))
            .and(query_param("adm_cd", "11"))
            .and(query_param("low_search", "1"))
            .and(query_param("year", "2023"))
            .respond_with(ResponseTemplate::new(200).set_body_json(boundary_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let merged = client.boundary(Some("11"), LowSearch::Children, "2023").await.unwrap();

        let collection =
            geojson::FeatureCollection::try_from(geojson::GeoJson::from_str(&merged).unwrap())
                .unwrap();
        let geometry = collection.features[0].geometry.as_ref().unwrap();
        let geojson::Value::Point(position) = &geometry.value else { panic!("expected point") };
        assert!((126.0..=128.0).contains(&position[0]));
        assert!((37.0..=38.0).contains(&position[1]));

        let properties = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(properties.len(), 3);
        assert!(properties.get("x").is_none());
    }

    #[tokio::test]
    async fn token_is_cached_across_calls() {
        let server = MockServer::start().await;
        mount_auth(&server).await;
        Mock::given(method("GET"))
            .and(path(BOUNDARY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(boundary_body()))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.boundary(None, LowSearch::default(), "2023").await.unwrap();
        client.boundary(None, LowSearch::default(), "2023").await.unwrap();

        assert_eq!(requests_for(&server, AUTH_PATH).await, 1);
    }

    #[tokio::test]
    async fn boundary_surfaces_classified_errors_without_retry() {
        let server = MockServer::start().await;
        mount_auth(&server).await;
        Mock::given(method("GET"))
            .and(path(BOUNDARY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errCd": -401, "errMsg": "인증정보가 존재하지 않습니다"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.boundary(None, LowSearch::default(), "2023").await.unwrap_err();

        assert!(matches!(err, AptMapError::Auth { .. }));
        assert_eq!(requests_for(&server, BOUNDARY_PATH).await, 1);
    }

    #[tokio::test]
    async fn geocode_returns_result_hits() {
        let server = MockServer::start().await;
        mount_auth(&server).await;
        Mock::given(method("GET"))
            .and(path(GEOCODE_WGS84_PATH))
            .and(query_param("address", "세종대로 110"))
            .and(query_param("pagenum", "0"))
            .and(query_param("resultcount", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errCd": 0,
                "result": {"resultdata": [{"x": "126.97", "y": "37.56"}], "totalcount": "1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let hits = client.geocode("세종대로 110", 0, 5).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["x"], "126.97");
    }

    #[tokio::test]
    async fn geocode_missing_resultdata_is_an_empty_hit_list() {
        let server = MockServer::start().await;
        mount_auth(&server).await;
        Mock::given(method("GET"))
            .and(path(GEOCODE_WGS84_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errCd": 0, "result": {}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let hits = client.geocode("어딘가", 0, 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn geocode_recovers_after_one_stale_token() {
        let server = MockServer::start().await;
        mount_auth(&server).await;

        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();
        Mock::given(method("GET"))
            .and(path(GEOCODE_WGS84_PATH))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                if attempts_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"errCd": -401, "errMsg": "stale"}))
                } else {
                    ResponseTemplate::new(200).set_body_json(json!({
                        "errCd": 0,
                        "result": {"resultdata": [{"x": "126.97"}]}
                    }))
                }
            })
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server)
            .with_retry_budget(RetryBudget::new(5, Duration::ZERO).unwrap());
        let hits = client.geocode("세종대로 110", 0, 5).await.unwrap();

        assert_eq!(hits.len(), 1);
        // The stale token forced a second authentication round trip.
        assert_eq!(requests_for(&server, AUTH_PATH).await, 2);
    }

    #[tokio::test]
    async fn geocode_exhausts_the_full_retry_budget() {
        let server = MockServer::start().await;
        mount_auth(&server).await;
        Mock::given(method("GET"))
            .and(path(GEOCODE_WGS84_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errCd": -401, "errMsg": "인증정보가 존재하지 않습니다"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server)
            .with_retry_budget(RetryBudget::new(200, Duration::ZERO).unwrap());
        let err = client.geocode("세종대로 110", 0, 5).await.unwrap_err();

        match err {
            AptMapError::RetryBudgetExhausted { attempts, last_error } => {
                assert_eq!(attempts, 200);
                assert!(last_error.contains("-401"));
            }
            other => panic!("expected exhausted retry budget, got {other:?}"),
        }
        // Exactly one geocode request per attempt, and a fresh
        // authentication between attempts after each invalidation.
        assert_eq!(requests_for(&server, GEOCODE_WGS84_PATH).await, 200);
        assert_eq!(requests_for(&server, AUTH_PATH).await, 200);
    }

    #[tokio::test]
    async fn geocode_does_not_absorb_transport_errors() {
        let server = MockServer::start().await;
        mount_auth(&server).await;
        Mock::given(method("GET"))
            .and(path(GEOCODE_WGS84_PATH))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)
            .with_retry_budget(RetryBudget::new(200, Duration::ZERO).unwrap());
        let err = client.geocode("세종대로 110", 0, 5).await.unwrap_err();

        assert!(matches!(err, AptMapError::Network(_)));
        assert_eq!(requests_for(&server, GEOCODE_WGS84_PATH).await, 1);
    }

    #[tokio::test]
    async fn geocode_utmk_is_single_shot() {
        let server = MockServer::start().await;
        mount_auth(&server).await;
        Mock::given(method("GET"))
            .and(path(GEOCODE_UTMK_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errCd": -100, "errMsg": "필수 파라미터 누락"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.geocode_utmk("세종대로 110", 0, 5).await.unwrap_err();

        assert_eq!(err.code(), Some("-100"));
        assert_eq!(requests_for(&server, GEOCODE_UTMK_PATH).await, 1);
    }

    #[tokio::test]
    async fn cancelled_client_aborts_before_requesting() {
        let server = MockServer::start().await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let client = client_for(&server).with_cancellation(cancel);
        let err = client.boundary(None, LowSearch::default(), "2023").await.unwrap_err();

        assert!(matches!(err, AptMapError::Cancelled));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn empty_credentials_are_rejected_at_construction() {
        assert!(SgisCredentials::new("", "secret").is_err());
        assert!(SgisCredentials::new("key", "").is_err());
    }
}
