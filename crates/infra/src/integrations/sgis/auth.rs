//! Authentication round trip for the geography service
//!
//! Exchanges the consumer key/secret for a bearer token. The service reports
//! the token's absolute expiry (`accessTimeout`, epoch millis); the token
//! cache in `aptmap-common` handles skew and refresh on top of this.

use aptmap_common::auth::{AccessToken, TokenAuthenticator};
use aptmap_domain::{AptMapError, Result, SgisCredentials};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::envelope;
use crate::http::{decode_response, HttpClient};
use crate::integrations::value_util::as_count;

/// Performs the `authentication.json` round trip.
pub struct SgisAuthenticator {
    http: HttpClient,
    credentials: SgisCredentials,
    auth_url: String,
}

impl SgisAuthenticator {
    pub(crate) fn new(http: HttpClient, credentials: SgisCredentials, auth_url: String) -> Self {
        Self { http, credentials, auth_url }
    }
}

#[async_trait]
impl TokenAuthenticator for SgisAuthenticator {
    type Error = AptMapError;

    async fn authenticate(&self) -> Result<AccessToken> {
        let query = [
            ("consumer_key", self.credentials.consumer_key.as_str()),
            ("consumer_secret", self.credentials.consumer_secret.as_str()),
        ];

        let body = self.http.get_text(&self.auth_url, &query).await?;
        let decoded = decode_response(&body)?;
        envelope::classify(&decoded)?;

        let result = decoded.get("result").ok_or_else(|| {
            AptMapError::MalformedResponse("authentication response has no result".to_string())
        })?;

        let value = result
            .get("accessToken")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AptMapError::MalformedResponse(
                    "authentication response carries no access token".to_string(),
                )
            })?;

        let expires_at_ms = result.get("accessTimeout").and_then(as_count).ok_or_else(|| {
            AptMapError::MalformedResponse(
                "authentication response carries no access timeout".to_string(),
            )
        })?;

        debug!(expires_at_ms, "obtained access token");
        Ok(AccessToken::new(value, expires_at_ms))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn authenticator_for(server: &MockServer) -> SgisAuthenticator {
        SgisAuthenticator::new(
            HttpClient::new().unwrap(),
            SgisCredentials::new("ck", "cs").unwrap(),
            server.uri(),
        )
    }

    #[tokio::test]
    async fn exchanges_credentials_for_a_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("consumer_key", "ck"))
            .and(query_param("consumer_secret", "cs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "API_0101",
                "errMsg": "Success",
                "errCd": 0,
                "result": {"accessTimeout": "1754400000000", "accessToken": "token-1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = authenticator_for(&server).authenticate().await.unwrap();
        assert_eq!(token.value, "token-1");
        assert_eq!(token.expires_at_ms, 1_754_400_000_000);
    }

    #[tokio::test]
    async fn classified_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errCd": -100, "errMsg": "잘못된 인증 파라미터"
            })))
            .mount(&server)
            .await;

        let err = authenticator_for(&server).authenticate().await.unwrap_err();
        assert_eq!(err.code(), Some("-100"));
    }

    #[tokio::test]
    async fn empty_token_in_success_shape_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errCd": 0,
                "result": {"accessTimeout": "1754400000000", "accessToken": ""}
            })))
            .mount(&server)
            .await;

        let err = authenticator_for(&server).authenticate().await.unwrap_err();
        assert!(matches!(err, AptMapError::MalformedResponse(_)));
    }
}
