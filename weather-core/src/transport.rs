use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::error::ClientError;

/// HTTP capability handed to [`crate::WeatherApiClient`]. Base address,
/// timeouts and resilience are the implementation's business.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// GET `path` relative to the base address and return the body of a
    /// successful response.
    async fn get(&self, path: &str) -> Result<Vec<u8>, ClientError>;
}

/// Settings for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: Url,
    pub timeout: Duration,
    /// Retries of transient failures (connect errors, 5xx, 408, 429). Zero disables the middleware.
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl TransportConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(200),
        }
    }
}

/// reqwest-backed transport with an exponential-backoff retry layer.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: Url,
    http: ClientWithMiddleware,
}

impl ReqwestTransport {
    pub fn new(config: TransportConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::transport(None, format!("failed to build HTTP client: {e}")))?;

        let mut builder = ClientBuilder::new(client);
        if config.max_retries > 0 {
            let policy = ExponentialBackoff::builder()
                .retry_bounds(config.retry_base_delay, config.retry_base_delay * 10)
                .build_with_max_retries(config.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(policy));
        }

        Ok(Self {
            base_url: config.base_url,
            http: builder.build(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::transport(None, format!("invalid request path {path:?}: {e}")))?;

        tracing::debug!(%url, "sending GET");

        let res = self.http.get(url.clone()).send().await?;

        let status = res.status();
        tracing::debug!(%url, %status, "received response");

        if !status.is_success() {
            return Err(ClientError::transport(
                Some(status),
                format!("GET {url} failed with status {status}"),
            ));
        }

        let body = res.bytes().await?;
        Ok(body.to_vec())
    }
}
