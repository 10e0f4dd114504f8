//! Runtime configuration read from the environment.

use std::env;

use thiserror::Error;
use url::Url;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DISPATCH_ENDPOINT: &str = "/api/send-email";
pub const DEFAULT_DISPATCH_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid number: {value}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("invalid dispatch URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Absolute URL the outbound message is POSTed to.
    pub dispatch_url: Url,
    pub max_upload_bytes: usize,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Defaults for everything except the relay URL.
    pub fn with_dispatch_url(dispatch_url: Url) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            dispatch_url,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
        }
    }

    /// Load `.env` (if any) and read every setting, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = parse_var("PORT", DEFAULT_PORT)?;
        let max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        let endpoint =
            env::var("DISPATCH_ENDPOINT").unwrap_or_else(|_| DEFAULT_DISPATCH_ENDPOINT.to_string());
        let base_url =
            env::var("DISPATCH_BASE_URL").unwrap_or_else(|_| DEFAULT_DISPATCH_BASE_URL.to_string());
        let dispatch_url = resolve_dispatch_url(&base_url, &endpoint)?;

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|raw| split_origins(&raw))
            .unwrap_or_else(|_| split_origins(DEFAULT_ALLOWED_ORIGINS));

        Ok(Self {
            host,
            port,
            dispatch_url,
            max_upload_bytes,
            allowed_origins,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        Err(_) => Ok(default),
    }
}

/// Absolute endpoints are used as-is; relative routes are joined onto the base.
pub fn resolve_dispatch_url(base_url: &str, endpoint: &str) -> Result<Url, ConfigError> {
    match Url::parse(endpoint) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(base_url)
            .and_then(|base| base.join(endpoint))
            .map_err(|source| ConfigError::InvalidUrl {
                value: format!("{}{}", base_url, endpoint),
                source,
            }),
        Err(source) => Err(ConfigError::InvalidUrl {
            value: endpoint.to_string(),
            source,
        }),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}
