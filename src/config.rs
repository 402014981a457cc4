//! Server Configuration
//!
//! All settings are read once at startup. Every value has a default, so the
//! server runs without any environment set up.

use axum::http::HeaderValue;
use std::{fmt, net::SocketAddr, str::FromStr};

// =============================================================================
// Constants
// =============================================================================

/// Selects development or production behaviour
pub const ENVIRONMENT_VAR: &str = "INVENTORYHUB_ENVIRONMENT";
/// Socket address the server binds to
pub const LISTEN_ADDR_VAR: &str = "INVENTORYHUB_LISTEN_ADDR";
/// The single origin allowed to make cross-origin calls
pub const ALLOWED_ORIGIN_VAR: &str = "INVENTORYHUB_ALLOWED_ORIGIN";

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";
/// Development origin of the companion web client
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5238";

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while reading configuration
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The runtime mode is neither `Development` nor `Production`.
    #[error("unknown environment '{0}'; expected 'Development' or 'Production'")]
    UnknownEnvironment(String),

    /// The listen address does not parse as `host:port`.
    #[error("invalid listen address '{value}': {source}")]
    InvalidListenAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// The allowed origin is a wildcard or cannot be used as a header value.
    #[error("invalid allowed origin '{0}'")]
    InvalidOrigin(String),
}

// =============================================================================
// Runtime Environment
// =============================================================================

/// Runtime mode of the server
///
/// Development exposes panic diagnostics and the API documentation;
/// production hides both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ConfigError::UnknownEnvironment(value.to_owned())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("Development"),
            Self::Production => f.write_str("Production"),
        }
    }
}

// =============================================================================
// Response Cache Limits
// =============================================================================

/// Bounds on what the response cache keeps in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseCacheOptions {
    /// Responses with larger bodies are never stored
    pub max_body_size: usize,

    /// Upper bound on stored responses
    pub max_entries: usize,
}

impl Default for ResponseCacheOptions {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024 * 1024,
            max_entries: 1024,
        }
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Everything the server needs to know before it starts accepting requests
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub environment: Environment,
    pub listen_addr: SocketAddr,
    pub allowed_origin: HeaderValue,
    pub response_cache: ResponseCacheOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            allowed_origin: HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN),
            response_cache: ResponseCacheOptions::default(),
        }
    }
}

impl ServerConfig {
    /// Production defaults with development mode switched on
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            ..Self::default()
        }
    }

    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// missing or blank keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a present value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = read(ENVIRONMENT_VAR)
            .map(|value| value.parse::<Environment>())
            .transpose()?
            .unwrap_or_default();

        let listen_addr_raw = read(LISTEN_ADDR_VAR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());
        let listen_addr = listen_addr_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidListenAddr {
                value: listen_addr_raw.clone(),
                source,
            })?;

        let allowed_origin = match read(ALLOWED_ORIGIN_VAR) {
            Some(origin) if origin.trim() == "*" => return Err(ConfigError::InvalidOrigin(origin)),
            Some(origin) => HeaderValue::from_str(origin.trim())
                .map_err(|_| ConfigError::InvalidOrigin(origin))?,
            None => HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN),
        };

        Ok(Self {
            environment,
            listen_addr,
            allowed_origin,
            response_cache: ResponseCacheOptions::default(),
        })
    }
}
