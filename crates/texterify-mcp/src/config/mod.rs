//! Server configuration: credentials, default project and API location.

mod file;

use std::{fmt, path::Path, time::Duration};

use url::Url;

pub use file::ConfigFile;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://app.texterify.com/api";
pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const AUTH_EMAIL_ENV: &str = "TEXTERIFY_AUTH_EMAIL";
pub const AUTH_SECRET_ENV: &str = "TEXTERIFY_AUTH_SECRET";
pub const PROJECT_ID_ENV: &str = "TEXTERIFY_PROJECT_ID";
pub const API_BASE_URL_ENV: &str = "TEXTERIFY_API_BASE_URL";
pub const API_VERSION_ENV: &str = "TEXTERIFY_API_VERSION";
pub const REQUEST_TIMEOUT_ENV: &str = "TEXTERIFY_REQUEST_TIMEOUT_SECS";

/// Resolved, validated configuration handed to every component at construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub auth_email: String,
    pub auth_secret: String,
    /// Project used when a tool call does not name one.
    pub project_id: Option<String>,
    pub api_base_url: String,
    pub api_version: String,
    pub request_timeout: Duration,
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub project_id: Option<String>,
    pub api_base_url: Option<String>,
}

impl Config {
    /// Build from the process environment plus an optional config file.
    pub fn load(file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let file = file.map(ConfigFile::from_path).transpose()?.unwrap_or_default();
        Self::from_sources(file, |key| std::env::var(key).ok(), overrides)
    }

    /// Merge defaults, file, environment (through `lookup`) and overrides, in that order.
    pub fn from_sources(
        file: ConfigFile,
        lookup: impl Fn(&str) -> Option<String>,
        overrides: ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let env = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let auth_email = env(AUTH_EMAIL_ENV).or(file.auth_email);
        let auth_secret = env(AUTH_SECRET_ENV).or(file.auth_secret);

        let mut missing = Vec::new();
        if auth_email.is_none() {
            missing.push(AUTH_EMAIL_ENV);
        }
        if auth_secret.is_none() {
            missing.push(AUTH_SECRET_ENV);
        }
        let (Some(auth_email), Some(auth_secret)) = (auth_email, auth_secret) else {
            return Err(ConfigError::MissingCredentials { missing });
        };

        let project_id = non_empty(overrides.project_id)
            .or_else(|| env(PROJECT_ID_ENV))
            .or(file.project_id);
        let api_base_url = non_empty(overrides.api_base_url)
            .or_else(|| env(API_BASE_URL_ENV))
            .or(file.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_version = env(API_VERSION_ENV)
            .or(file.api_version)
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let request_timeout = match env(REQUEST_TIMEOUT_ENV) {
            Some(raw) => parse_timeout(&raw)?,
            None => match file.request_timeout_secs {
                Some(0) => return Err(ConfigError::InvalidTimeout { value: "0".into() }),
                Some(secs) => Duration::from_secs(secs),
                None => DEFAULT_REQUEST_TIMEOUT,
            },
        };

        let config = Self {
            auth_email,
            auth_secret,
            project_id,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_version: api_version.trim_matches('/').to_string(),
            request_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// `<api_base_url>/<api_version>/`, the root every resource path is joined onto.
    pub fn api_root(&self) -> Result<Url, ConfigError> {
        let raw = format!("{}/{}/", self.api_base_url, self.api_version);
        Url::parse(&raw).map_err(|source| ConfigError::InvalidBaseUrl { url: raw, source })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.api_base_url).map_err(|source| {
            ConfigError::InvalidBaseUrl { url: self.api_base_url.clone(), source }
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme { url: self.api_base_url.clone() });
        }
        self.api_root().map(|_| ())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("auth_email", &self.auth_email)
            .field("auth_secret", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout { value: raw.to_string() }),
    }
}
