//! HTTP client for listing and spidered pages.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::error::classify_status;

/// Fetches a page body. The one seam every network-touching collaborator
/// goes through.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<String>;
}

/// Configuration for the HTTP collaborator. TLS verification is on by
/// default; disabling it is an explicit, named choice.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub verify_tls: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("pypi-show-urls/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            verify_tls: true,
        }
    }
}

impl ClientConfig {
    /// Builds the shared HTTP client from this configuration.
    pub fn build(&self) -> Result<HttpClient> {
        let client = Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.timeout)
            .danger_accept_invalid_certs(!self.verify_tls)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpClient::new(client))
    }
}

/// HTTP client wrapping a configured reqwest Client.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_page(&self, url: &Url) -> Result<String> {
        debug!("GET {}...", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .context("Failed to send request")?;

        let response = response.error_for_status().map_err(classify_status)?;

        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::error::{is_not_found, FetchError};

    fn server_url(server: &mockito::Server, path: &str) -> Url {
        Url::parse(&format!("{}{}", server.url(), path)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_page_success() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/simple/foo/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body><a href=\"foo-1.0.tar.gz\">foo</a></body></html>")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let body = client
            .fetch_page(&server_url(&server, "/simple/foo/"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(body.contains("foo-1.0.tar.gz"));
    }

    #[tokio::test]
    async fn test_fetch_page_not_found() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/simple/missing/")
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result = client
            .fetch_page(&server_url(&server, "/simple/missing/"))
            .await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(is_not_found(&err));
    }

    #[tokio::test]
    async fn test_fetch_page_server_error() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/simple/foo/")
            .with_status(500)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result = client.fetch_page(&server_url(&server, "/simple/foo/")).await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(!is_not_found(&err));
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::Status(500, _))
        ));
    }

    #[tokio::test]
    async fn test_client_config_sends_user_agent() {
        let mut server = mockito::Server::new_async().await;

        let expected = format!("pypi-show-urls/{}", env!("CARGO_PKG_VERSION"));
        let mock = server
            .mock("GET", "/")
            .match_header("user-agent", expected.as_str())
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let client = ClientConfig::default().build().unwrap();
        let body = client.fetch_page(&server_url(&server, "/")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body, "ok");
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert!(config.verify_tls);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("pypi-show-urls/"));
    }

    #[test]
    fn test_client_config_builds_without_tls_verification() {
        let config = ClientConfig {
            verify_tls: false,
            ..ClientConfig::default()
        };
        assert!(config.build().is_ok());
    }
}
