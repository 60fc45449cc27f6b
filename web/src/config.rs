//! Server configuration.
//!
//! Loaded from environment variables (after `.env`, if present) with
//! defaults suitable for local development.

use chrono::Duration;
use event_vibe_anthropic::AnthropicClient;
use event_vibe_auth::AuthConfig;
use event_vibe_recommend::{ClaudeRecommendationModel, Recommender, RecommenderConfig};
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `STORAGE_BACKEND` names an unknown backend.
    #[error("Unknown STORAGE_BACKEND {0:?}, expected \"memory\" or \"postgres\"")]
    UnknownBackend(String),

    /// A variable required by the chosen setup is missing.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// `HOST`/`PORT` or `METRICS_ADDR` is not a socket address.
    #[error("Invalid address {0:?}")]
    InvalidAddress(String),

    /// A lifetime in hours is not a whole number between 1 and [`MAX_TTL_HOURS`].
    #[error("{name} must be a whole number of hours between 1 and 87600, got {value:?}")]
    InvalidTtl {
        /// Variable name.
        name: &'static str,
        /// Value as given.
        value: String,
    },
}

/// Upper bound for session and verification code lifetimes (ten years).
pub const MAX_TTL_HOURS: u32 = 24 * 365 * 10;

/// Where accounts, profiles, events and registrations live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// In process memory.
    Memory,
    /// PostgreSQL at `DATABASE_URL`.
    Postgres,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Storage settings.
    pub storage: StorageConfig,
    /// Redis URL for sessions and rate limits; in memory when unset.
    pub redis_url: Option<String>,
    /// Language model settings.
    pub anthropic: AnthropicConfig,
    /// Auth flow settings.
    pub auth: AuthSettings,
    /// SMTP settings; console email when unset.
    pub smtp: Option<SmtpConfig>,
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Prometheus exporter address, disabled when unset.
    pub metrics_addr: Option<SocketAddr>,
    /// Graceful shutdown timeout in seconds.
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    /// `host:port` as a socket address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] when the host is not an IP
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}

/// Storage settings.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Selected backend.
    pub backend: StorageBackend,
    /// Connection URL, required for Postgres.
    pub database_url: Option<String>,
    /// Pool size.
    pub max_connections: u32,
}

/// Language model settings.
#[derive(Clone)]
pub struct AnthropicConfig {
    /// API key; recommendations fail cleanly when unset.
    pub api_key: Option<String>,
    /// Model override.
    pub model: Option<String>,
    /// API base URL override.
    pub base_url: Option<String>,
    /// Upper bound on one recommendation call, in seconds.
    pub timeout_secs: u64,
    /// Output token cap.
    pub max_tokens: u32,
}

impl fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl AnthropicConfig {
    /// The recommendation service these settings describe.
    ///
    /// Without an API key the model is unconfigured and every request
    /// fails with the generic recommendation error.
    #[must_use]
    pub fn recommender(&self) -> Recommender<ClaudeRecommendationModel> {
        let timeout = std::time::Duration::from_secs(self.timeout_secs);
        let model = match &self.api_key {
            Some(key) => {
                let mut client = AnthropicClient::new(key.clone()).with_timeout(timeout);
                if let Some(url) = &self.base_url {
                    client = client.with_base_url(url.clone());
                }
                let model = ClaudeRecommendationModel::new(client).with_max_tokens(self.max_tokens);
                match &self.model {
                    Some(name) => model.with_model(name.clone()),
                    None => model,
                }
            }
            None => {
                tracing::warn!("ANTHROPIC_API_KEY is not set; recommendations are disabled");
                ClaudeRecommendationModel::unconfigured()
            }
        };
        Recommender::new(model, RecommenderConfig::default().with_timeout(timeout))
    }
}

/// Auth flow settings.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Frontend URL for verification links.
    pub app_base_url: String,
    /// Session lifetime.
    pub session_ttl: Duration,
    /// Resends allowed per window.
    pub resend_limit: u32,
    /// Resend window in seconds.
    pub resend_window_secs: u64,
    /// Verification code lifetime.
    pub verification_code_ttl: Duration,
}

impl AuthSettings {
    /// The library-level auth config.
    #[must_use]
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::default()
            .with_app_base_url(self.app_base_url.clone())
            .with_session_ttl(self.session_ttl)
            .with_verification_code_ttl(self.verification_code_ttl)
            .with_resend_limit(
                self.resend_limit,
                std::time::Duration::from_secs(self.resend_window_secs),
            )
    }
}

/// SMTP relay settings.
#[derive(Clone)]
pub struct SmtpConfig {
    /// Relay host.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// Login.
    pub username: String,
    /// Password.
    pub password: String,
    /// Sender mailbox.
    pub from: String,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .finish()
    }
}

fn non_empty<F: Fn(&str) -> Option<String>>(lookup: &F, name: &str) -> Option<String> {
    lookup(name).filter(|value| !value.trim().is_empty())
}

fn parse<T: FromStr, F: Fn(&str) -> Option<String>>(lookup: &F, name: &str) -> Option<T> {
    non_empty(lookup, name).and_then(|value| value.trim().parse().ok())
}

/// A lifetime in hours, 24 when unset.
fn ttl_hours<F>(lookup: &F, name: &'static str) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(lookup, name) else {
        return Ok(Duration::hours(24));
    };
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|hours| (1..=MAX_TTL_HOURS).contains(hours))
        .and_then(|hours| Duration::try_hours(i64::from(hours)))
        .ok_or(ConfigError::InvalidTtl { name, value: raw })
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an unknown backend, a Postgres backend
    /// without `DATABASE_URL`, an SMTP host without `SMTP_FROM`, an
    /// unparseable `METRICS_ADDR` or a session or code lifetime out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any variable source.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| non_empty(&lookup, name);

        let backend = match var("STORAGE_BACKEND").as_deref().map(str::trim) {
            None | Some("memory") => StorageBackend::Memory,
            Some("postgres") => StorageBackend::Postgres,
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };
        let database_url = var("DATABASE_URL");
        if backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let metrics_addr = match var("METRICS_ADDR") {
            Some(addr) => Some(
                addr.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidAddress(addr.clone()))?,
            ),
            None => None,
        };

        let smtp = match var("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: parse(&lookup, "SMTP_PORT").unwrap_or(587),
                username: var("SMTP_USERNAME").unwrap_or_default(),
                password: var("SMTP_PASSWORD").unwrap_or_default(),
                from: var("SMTP_FROM").ok_or(ConfigError::Missing("SMTP_FROM"))?,
            }),
            None => None,
        };

        let session_ttl = ttl_hours(&lookup, "SESSION_TTL_HOURS")?;
        let verification_code_ttl = ttl_hours(&lookup, "VERIFICATION_CODE_TTL_HOURS")?;

        Ok(Self {
            server: ServerConfig {
                host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse(&lookup, "PORT").unwrap_or(8080),
                metrics_addr,
                shutdown_timeout: parse(&lookup, "SHUTDOWN_TIMEOUT").unwrap_or(10),
            },
            storage: StorageConfig {
                backend,
                database_url,
                max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS").unwrap_or(10),
            },
            redis_url: var("REDIS_URL"),
            anthropic: AnthropicConfig {
                api_key: var("ANTHROPIC_API_KEY"),
                model: var("ANTHROPIC_MODEL"),
                base_url: var("ANTHROPIC_BASE_URL"),
                timeout_secs: parse(&lookup, "RECOMMENDATION_TIMEOUT_SECS").unwrap_or(30),
                max_tokens: parse(&lookup, "RECOMMENDATION_MAX_TOKENS").unwrap_or(2048),
            },
            auth: AuthSettings {
                app_base_url: var("APP_BASE_URL")
                    .unwrap_or_else(|| "http://localhost:3000".to_string()),
                session_ttl,
                resend_limit: parse(&lookup, "VERIFICATION_RESEND_LIMIT").unwrap_or(3),
                resend_window_secs: parse(&lookup, "VERIFICATION_RESEND_WINDOW_SECS").unwrap_or(900),
                verification_code_ttl,
            },
            smtp,
        })
    }
}
