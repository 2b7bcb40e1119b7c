use std::{io, path::PathBuf};

use thiserror::Error;
use toml_edit::de::Error as TomlDeError;
use url::ParseError as UrlParseError;

/// Failures while assembling the server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required settings: {}", missing.join(", "))]
    MissingCredentials { missing: Vec<&'static str> },

    #[error("failed to read config file {path}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: TomlDeError,
    },

    #[error("invalid API base URL '{url}'")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: UrlParseError,
    },

    #[error("API base URL '{url}' must use http or https")]
    UnsupportedScheme { url: String },

    #[error("{setting} contains characters that cannot be sent in an HTTP header")]
    InvalidHeaderValue { setting: &'static str },

    #[error("invalid request timeout '{value}', expected a positive number of seconds")]
    InvalidTimeout { value: String },

    #[error("failed to build HTTP client")]
    HttpClient {
        #[source]
        source: reqwest::Error,
    },
}

/// Failure of a single backend call, tagged with the operation that issued it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("{operation}: {detail}")]
    Status { operation: String, status: u16, status_text: String, body: String, detail: String },

    /// The request never produced a response (connect failure, timeout, ...).
    #[error("{operation}: Network error — {source}")]
    Network {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation}: invalid JSON response: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{operation}: cannot build a request URL from {url}")]
    InvalidUrl { operation: String, url: String },
}

impl ApiError {
    pub fn operation(&self) -> &str {
        match self {
            ApiError::Status { operation, .. }
            | ApiError::Network { operation, .. }
            | ApiError::Decode { operation, .. }
            | ApiError::InvalidUrl { operation, .. } => operation,
        }
    }

    /// HTTP status of the failed call, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network { .. } | ApiError::Decode { .. } | ApiError::InvalidUrl { .. } => {
                None
            }
        }
    }

    /// Message without the operation prefix, as rendered at the tool boundary.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Status { detail, .. } => detail.clone(),
            ApiError::Network { source, .. } => format!("Network error — {source}"),
            ApiError::Decode { source, .. } => format!("invalid JSON response: {source}"),
            ApiError::InvalidUrl { url, .. } => format!("cannot build a request URL from {url}"),
        }
    }
}

/// Terminal states of a key-with-translations run other than success.
#[derive(Debug, Error)]
pub enum CreateKeyError {
    /// Language resolution or key creation failed; nothing was left behind.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(
        "Unknown language code(s): {}. Available codes in this project: {}",
        unknown.join(", "),
        available.join(", ")
    )]
    UnknownLanguageCodes { unknown: Vec<String>, available: Vec<String> },

    /// The backend refused the key with a validation `errors` map.
    #[error("{message}")]
    KeyRejected { message: String },

    #[error("{operation}: response did not contain a key id")]
    MissingKeyId { operation: String },

    #[error("{source}. The key '{key_name}' (ID: {key_id}) has been rolled back (deleted).")]
    RolledBack {
        #[source]
        source: ApiError,
        key_name: String,
        key_id: String,
    },

    #[error(
        "Translation failed: {translation}. Additionally, rollback (key deletion) failed: {rollback}. \
         The key '{key_name}' (ID: {key_id}) was created but may have partial translations."
    )]
    RollbackFailed { translation: ApiError, rollback: ApiError, key_name: String, key_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display_carries_operation_and_detail() {
        let err = ApiError::Status {
            operation: "creating key".into(),
            status: 500,
            status_text: "Internal Server Error".into(),
            body: "boom".into(),
            detail: "500 Internal Server Error — boom".into(),
        };
        assert_eq!(err.to_string(), "creating key: 500 Internal Server Error — boom");
        assert_eq!(err.detail(), "500 Internal Server Error — boom");
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.operation(), "creating key");
    }

    #[test]
    fn missing_credentials_lists_every_setting() {
        let err = ConfigError::MissingCredentials {
            missing: vec!["TEXTERIFY_AUTH_EMAIL", "TEXTERIFY_AUTH_SECRET"],
        };
        assert_eq!(
            err.to_string(),
            "missing required settings: TEXTERIFY_AUTH_EMAIL, TEXTERIFY_AUTH_SECRET"
        );
    }

    #[test]
    fn unknown_codes_message_lists_both_sides() {
        let err = CreateKeyError::UnknownLanguageCodes {
            unknown: vec!["xx".into()],
            available: vec!["de".into(), "en".into(), "fr".into()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown language code(s): xx. Available codes in this project: de, en, fr"
        );
    }
}
