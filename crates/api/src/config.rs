//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SOUQ_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SOUQ_JWT_SECRET` - HS256 signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `SOUQ_HOST` - Bind address (default: 0.0.0.0)
//! - `SOUQ_PORT` - Listen port (default: 3000)
//! - `SOUQ_UPLOAD_DIR` - Directory uploaded images are written to (default: uploads)
//! - `SOUQ_MAX_UPLOAD_BYTES` - Upload size limit in bytes (default: 5242880)
//! - `SOUQ_JWT_TTL_SECS` - Access token lifetime (default: 86400)
//! - `SOUQ_CORS_ORIGINS` - Comma-separated allowed origins (default: any)
//! - `SOUQ_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.1)

use std::collections::HashMap;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Default upload limit: 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Default access token lifetime: one day.
pub const DEFAULT_JWT_TTL_SECS: i64 = 86_400;

const JWT_SECRET_VAR: &str = "SOUQ_JWT_SECRET";
const JWT_SECRET_MIN_LEN: usize = 32;
const JWT_SECRET_MIN_ENTROPY: f64 = 3.3;

/// Substrings that mark a secret as copied from a sample `.env`.
const SAMPLE_SECRET_MARKERS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
    #[error("{var} is not safe to sign tokens with: {reason}")]
    WeakSecret { var: &'static str, reason: String },
}

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// JWT settings
    pub jwt: JwtConfig,
    /// Upload storage settings
    pub uploads: UploadConfig,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// JWT signing configuration.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct JwtConfig {
    /// HS256 signing secret
    pub secret: SecretString,
    /// Access token lifetime in seconds
    pub ttl_secs: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

/// Where uploaded images go and how large they may be.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Root directory; each upload kind gets a subdirectory
    pub dir: PathBuf,
    /// Maximum accepted file size in bytes
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ApiConfig {
    /// Load configuration from the environment, reading `.env` first if one
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value does
    /// not parse, or the JWT secret looks guessable.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = env_var("SOUQ_DATABASE_URL")
            .or_else(|| env_var("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or(ConfigError::Missing("SOUQ_DATABASE_URL"))?;

        Ok(Self {
            database_url,
            host: env_parse("SOUQ_HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: env_parse("SOUQ_PORT", 3000)?,
            jwt: JwtConfig::from_env()?,
            uploads: UploadConfig::from_env()?,
            cors_origins: env_var("SOUQ_CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
            log_json: env_var("SOUQ_LOG_JSON").is_some(),
            sentry_dsn: env_var("SENTRY_DSN"),
            sentry_environment: env_var("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env_parse("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: env_parse("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// Address the listener binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_var(JWT_SECRET_VAR).ok_or(ConfigError::Missing(JWT_SECRET_VAR))?;
        check_jwt_secret(&secret)?;

        let ttl_secs = env_parse("SOUQ_JWT_TTL_SECS", DEFAULT_JWT_TTL_SECS)?;
        if ttl_secs <= 0 {
            return Err(invalid("SOUQ_JWT_TTL_SECS", "must be positive"));
        }
        Ok(Self {
            secret: SecretString::from(secret),
            ttl_secs,
        })
    }
}

impl UploadConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_bytes = env_parse("SOUQ_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        if max_bytes == 0 {
            return Err(invalid("SOUQ_MAX_UPLOAD_BYTES", "must be positive"));
        }
        Ok(Self {
            dir: env_var("SOUQ_UPLOAD_DIR").map_or_else(|| PathBuf::from("uploads"), PathBuf::from),
            max_bytes,
        })
    }
}

/// A set, non-blank environment variable.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse `key` if set, otherwise use `default`.
fn env_parse<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    env_var(key).map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|e: T::Err| invalid(key, e))
    })
}

fn invalid(var: &'static str, reason: impl Display) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

/// Shannon entropy of `s` in bits per character.
#[allow(clippy::cast_precision_loss)]
fn bits_per_char(s: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0_usize;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject JWT secrets that are short, copied from a sample file, or
/// repetitive.
fn check_jwt_secret(secret: &str) -> Result<(), ConfigError> {
    let weak = |reason: String| ConfigError::WeakSecret {
        var: JWT_SECRET_VAR,
        reason,
    };

    if secret.len() < JWT_SECRET_MIN_LEN {
        return Err(weak(format!(
            "{} characters, need at least {JWT_SECRET_MIN_LEN}",
            secret.len()
        )));
    }

    let lower = secret.to_lowercase();
    if let Some(marker) = SAMPLE_SECRET_MARKERS.iter().find(|m| lower.contains(**m)) {
        return Err(weak(format!("looks like a sample value (contains `{marker}`)")));
    }

    let entropy = bits_per_char(secret);
    if entropy < JWT_SECRET_MIN_ENTROPY {
        return Err(weak(format!(
            "{entropy:.2} bits of entropy per character, need {JWT_SECRET_MIN_ENTROPY}; \
             generate one with `openssl rand -base64 48`"
        )));
    }

    Ok(())
}

/// Expose the JWT secret bytes for key construction.
pub(crate) fn jwt_secret_bytes(config: &JwtConfig) -> &[u8] {
    config.secret.expose_secret().as_bytes()
}
