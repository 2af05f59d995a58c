//! Runtime configuration for the gate services.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors produced when validating a [`GateConfig`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for token lifetime, the expiry watch, and the simulated
/// submission latency.
///
/// Defaults reproduce the demo's behavior: 30-minute tokens, a one-second
/// expiry poll while the protected view is open, 1500 ms of fake network
/// delay on submission, and an `admin`/`password` seed account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateConfig {
    /// Access-token time-to-live.
    #[serde(with = "duration_millis")]
    pub token_ttl: Duration,
    /// Interval between session re-checks while the protected view is
    /// active.
    #[serde(with = "duration_millis")]
    pub expiry_poll_interval: Duration,
    /// Simulated network latency applied before a lead submission is
    /// processed.
    #[serde(with = "duration_millis")]
    pub submit_delay: Duration,
    /// Username seeded into an empty admin directory.
    pub default_admin_username: String,
    /// Password for the seed account.
    pub default_admin_password: String,
    /// Optional capacity for the bundled in-memory store, in bytes.
    /// `None` means unbounded.
    #[serde(default)]
    pub store_capacity_bytes: Option<usize>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::from_secs(30 * 60),
            expiry_poll_interval: Duration::from_secs(1),
            submit_delay: Duration::from_millis(1500),
            default_admin_username: "admin".to_string(),
            default_admin_password: "password".to_string(),
            store_capacity_bytes: None,
        }
    }
}

impl GateConfig {
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_expiry_poll_interval(mut self, interval: Duration) -> Self {
        self.expiry_poll_interval = interval;
        self
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    pub fn with_default_admin(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.default_admin_username = username.into();
        self.default_admin_password = password.into();
        self
    }

    pub fn with_store_capacity_bytes(mut self, capacity: usize) -> Self {
        self.store_capacity_bytes = Some(capacity);
        self
    }

    /// Validate the configuration before wiring services with it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_ttl.is_zero() {
            return Err(ConfigError::Invalid(
                "token_ttl must be greater than zero".into(),
            ));
        }
        if self.expiry_poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "expiry_poll_interval must be greater than zero".into(),
            ));
        }
        if self.default_admin_username.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_admin_username must not be empty".into(),
            ));
        }
        if self.default_admin_password.is_empty() {
            return Err(ConfigError::Invalid(
                "default_admin_password must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Serde representation of `Duration` as whole milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
