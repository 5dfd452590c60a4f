//! Coordinator configuration.
//!
//! `CoordinatorConfig` controls the defaults of an
//! [`HttpCoordinator`](crate::coordinator::HttpCoordinator) and of the reqwest-backed
//! [`HttpTransport`](crate::net::HttpTransport).
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use gosub_http::config::CoordinatorConfig;
//! let cfg = CoordinatorConfig::default();
//! assert_eq!(cfg.default_timeout.as_secs(), 30);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use std::time::Duration;
//! use gosub_http::config::CoordinatorConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = CoordinatorConfig::builder()
//!     .default_timeout(Duration::from_secs(10))
//!     .user_agent("Gosub/0.1")
//!     .connect_timeout(Duration::from_secs(3))
//!     .build()?; // returns Result<CoordinatorConfig, ConfigError>
//! # Ok(()) }
//! ```
//!
//! # Errors
//!
//! Builder validation returns [`ConfigError`] when the default timeout or the event capacity
//! is zero, or when the user agent is set to an empty string.

use std::fmt;
use std::time::Duration;

/// Timeout applied to a request when the caller supplies none (or a zero one).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default capacity of the coordinator event bus.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;

const DEFAULT_USER_AGENT: &str = "Gosub/1.0 (X11; Linux x86_64) Gecko/20250802 GosubBrowser/1.0";

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Timeout used for requests that do not define their own
    pub default_timeout: Duration,
    /// User agent sent by the HTTP transport. `None` lets reqwest decide.
    pub user_agent: Option<String>,
    /// Connect timeout of the HTTP transport
    pub connect_timeout: Option<Duration>,
    /// Capacity of the broadcast channel for coordinator events
    pub event_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            connect_timeout: None,
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl CoordinatorConfig {
    pub fn builder() -> CoordinatorConfigBuilder {
        CoordinatorConfigBuilder::default()
    }

    /// Returns the timeout to use for a request. A missing or zero timeout falls back to
    /// `default_timeout`.
    pub fn effective_timeout(&self, requested: Option<Duration>) -> Duration {
        match requested {
            Some(t) if !t.is_zero() => t,
            _ => self.default_timeout,
        }
    }
}

/// Builder for [`CoordinatorConfig`].
#[derive(Debug, Clone, Default)]
pub struct CoordinatorConfigBuilder {
    inner: CoordinatorConfig,
}

impl CoordinatorConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut CoordinatorConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn default_timeout(self, t: Duration) -> Self { self.map(|c| c.default_timeout = t) }
    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = Some(ua.into())) }
    pub fn no_user_agent(self) -> Self { self.map(|c| c.user_agent = None) }
    pub fn connect_timeout(self, t: Duration) -> Self { self.map(|c| c.connect_timeout = Some(t)) }
    pub fn event_capacity(self, n: usize) -> Self { self.map(|c| c.event_capacity = n) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut CoordinatorConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<CoordinatorConfig, ConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroTimeout,
    ZeroEventCapacity,
    EmptyUserAgent,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroTimeout => write!(f, "default_timeout must be greater than zero"),
            ConfigError::ZeroEventCapacity => write!(f, "event_capacity must be at least 1"),
            ConfigError::EmptyUserAgent => write!(f, "user_agent must not be empty"),
        }
    }
}
impl std::error::Error for ConfigError {}

fn validate(c: &CoordinatorConfig) -> Result<(), ConfigError> {
    if c.default_timeout.is_zero() {
        return Err(ConfigError::ZeroTimeout);
    }
    if c.event_capacity == 0 {
        return Err(ConfigError::ZeroEventCapacity);
    }
    if matches!(c.user_agent.as_deref(), Some(ua) if ua.trim().is_empty()) {
        return Err(ConfigError::EmptyUserAgent);
    }
    Ok(())
}
