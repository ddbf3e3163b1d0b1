//! HTTP client for the payment authority's REST API.
//!
//! Transient failures (network errors, non-2xx other than 404) are retried
//! with exponential backoff. When attempts run out the last error is
//! returned with its attempt count.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AuthorityConfig::new(access_token)
//!     .with_base_url("https://api.mercadopago.com")
//!     .with_max_retries(3);
//! let authority = HttpPaymentAuthority::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::subscription::{AuthorityPayment, AuthorityPreapproval};
use crate::ports::{AuthorityError, PaymentAuthority};

/// Configuration for the authority client.
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    /// Bearer token for the authority API.
    access_token: SecretString,
    /// Base URL, without trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub base_backoff: Duration,
}

impl AuthorityConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            base_url: "https://api.mercadopago.com".to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
            base_backoff: Duration::from_secs(1),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

/// Payment authority client over HTTP.
pub struct HttpPaymentAuthority {
    config: AuthorityConfig,
    client: Client,
}

impl HttpPaymentAuthority {
    pub fn new(config: AuthorityConfig) -> Result<Self, AuthorityError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthorityError::network(format!("failed to build client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn payment_url(&self, id: &str) -> String {
        format!("{}/v1/payments/{}", self.config.base_url, id)
    }

    fn preapproval_url(&self, id: &str) -> String {
        format!("{}/preapproval/{}", self.config.base_url, id)
    }

    async fn fetch_once<T: DeserializeOwned>(
        &self,
        url: &str,
        resource: &str,
    ) -> Result<T, AuthorityError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(self.config.access_token())
            .send()
            .await
            .map_err(|e| AuthorityError::network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AuthorityError::not_found(resource));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthorityError::provider(status.as_u16(), body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AuthorityError::invalid_response(e.to_string()))
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str, resource: &str) -> Result<T, AuthorityError> {
        let mut retry_count = 0;

        loop {
            match self.fetch_once(url, resource).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_retryable() || retry_count >= self.config.max_retries {
                        return Err(err.with_attempts(retry_count + 1));
                    }
                    tracing::warn!(
                        resource = %resource,
                        attempt = retry_count + 1,
                        error = %err.message,
                        "Payment authority request failed, retrying"
                    );
                }
            }

            // Exponential backoff: base, 2x base, 4x base, ...
            let delay = self.config.base_backoff * (1u32 << retry_count.min(16));
            sleep(delay).await;
            retry_count += 1;
        }
    }
}

#[async_trait]
impl PaymentAuthority for HttpPaymentAuthority {
    async fn get_payment(&self, payment_id: &str) -> Result<AuthorityPayment, AuthorityError> {
        let resource = format!("payment {}", payment_id);
        self.fetch(&self.payment_url(payment_id), &resource).await
    }

    async fn get_preapproval(
        &self,
        preapproval_id: &str,
    ) -> Result<AuthorityPreapproval, AuthorityError> {
        let resource = format!("preapproval {}", preapproval_id);
        self.fetch(&self.preapproval_url(preapproval_id), &resource)
            .await
    }
}
