//! Thin HTTP client wrapper
//!
//! Transport failures propagate immediately: the one place this system
//! retries (the geocoding bounded retry) owns its own loop, so the client
//! performs no retries of its own.

use std::time::Duration;

use aptmap_domain::{AptMapError, Result};
use reqwest::Client as ReqwestClient;
use serde::Serialize;
use tracing::debug;

/// HTTP client with configured timeout and user agent.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Issue a GET request and return the raw response body.
    ///
    /// # Errors
    /// `AptMapError::Network` for connection failures, timeouts, non-success
    /// status codes, and unreadable bodies.
    pub async fn get_text<Q: Serialize + ?Sized>(&self, url: &str, query: &Q) -> Result<String> {
        debug!(%url, "sending HTTP request");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| AptMapError::Network(format!("request to {url} failed: {err}")))?;

        let status = response.status();
        debug!(%url, status = status.as_u16(), "received HTTP response");

        if !status.is_success() {
            return Err(AptMapError::Network(format!("HTTP {status} from {url}")));
        }

        response
            .text()
            .await
            .map_err(|err| AptMapError::Network(format!("failed to read body from {url}: {err}")))
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder
            .build()
            .map_err(|err| AptMapError::Internal(format!("failed to build HTTP client: {err}")))?;

        Ok(HttpClient { client })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let body = client.get_text(&server.uri(), &[("page", "3")]).await.unwrap();

        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn non_success_status_is_a_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let err = client.get_text::<[(&str, &str)]>(&server.uri(), &[]).await.unwrap_err();

        assert!(matches!(err, AptMapError::Network(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn connection_failure_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so the request fails with ECONNREFUSED
        let url = format!("http://{}", addr);

        let client = HttpClient::new().unwrap();
        let err = client.get_text::<[(&str, &str)]>(&url, &[]).await.unwrap_err();

        assert!(matches!(err, AptMapError::Network(_)));
    }
}
