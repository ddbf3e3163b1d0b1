//! Payment authority configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Payment authority configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Bearer token for the authority API
    pub access_token: SecretString,

    /// Authority base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries after the first attempt on transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds; doubles per retry
    #[serde(default = "default_backoff")]
    pub backoff_ms: u64,
}

impl PaymentConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    /// Validate payment configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.access_token.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__ACCESS_TOKEN"));
        }
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(ValidationError::InvalidAuthorityUrl);
        }
        if production && !self.base_url.starts_with("https://") {
            return Err(ValidationError::AuthorityMustBeHttps);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_retries > 10 {
            return Err(ValidationError::TooManyRetries);
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://api.mercadopago.com".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff() -> u64 {
    1000
}
