//! HTTP access to the Texterify REST API.
//!
//! [`ApiClient::send`] performs one request and hands back the raw status and
//! body; [`response::interpret`] turns that into a decoded body or an
//! [`ApiError`]. The resource modules pair the two for each endpoint.

pub mod keys;
pub mod languages;
pub mod projects;
pub mod response;
pub mod translations;

use reqwest::{
    Client as ReqwestClient, Method, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{
    config::{AUTH_EMAIL_ENV, AUTH_SECRET_ENV, Config},
    error::{ApiError, ConfigError},
};

/// Status and body text of a response, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Authenticated client bound to one API root.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: ReqwestClient,
    api_root: Url,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let api_root = config.api_root()?;
        let headers = build_header_map(config)?;
        let http = ReqwestClient::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| ConfigError::HttpClient { source })?;
        Ok(Self { http, api_root })
    }

    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    /// Absolute URL for a resource; each segment is percent-encoded on its own.
    pub fn resource_url(&self, segments: &[&str], operation: &str) -> Result<Url, ApiError> {
        let mut url = self.api_root.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl {
                operation: operation.to_string(),
                url: self.api_root.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue one request. JSON bodies are only attached to non-GET requests.
    pub async fn send<B>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&'static str, String)],
        body: Option<&B>,
        operation: &str,
    ) -> Result<RawResponse, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resource_url(segments, operation)?;
        debug!(%method, %url, operation, "sending API request");

        let mut request = self.http.request(method.clone(), url).query(query);
        if let Some(body) = body.filter(|_| method != Method::GET) {
            request = request.json(body);
        }

        let network =
            |source: reqwest::Error| ApiError::Network { operation: operation.to_string(), source };
        let response = request.send().await.map_err(network)?;
        let status = response.status();
        let body = response.text().await.map_err(network)?;
        debug!(status = status.as_u16(), operation, "received API response");
        Ok(RawResponse { status, body })
    }

    /// GET followed by interpretation.
    pub async fn get(
        &self,
        segments: &[&str],
        query: &[(&'static str, String)],
        operation: &str,
    ) -> Result<Option<Value>, ApiError> {
        let raw = self.send::<Value>(Method::GET, segments, query, None, operation).await?;
        response::interpret(raw, operation)
    }

    /// Request with a JSON body followed by interpretation.
    pub async fn send_json<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
        operation: &str,
    ) -> Result<Option<Value>, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let raw = self.send(method, segments, &[], Some(body), operation).await?;
        response::interpret(raw, operation)
    }
}

fn build_header_map(config: &Config) -> Result<HeaderMap, ConfigError> {
    let mut map = HeaderMap::new();
    map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    map.insert(ACCEPT, HeaderValue::from_static("application/json"));
    for (name, value, setting) in [
        ("auth-email", &config.auth_email, AUTH_EMAIL_ENV),
        ("auth-secret", &config.auth_secret, AUTH_SECRET_ENV),
    ] {
        let mut header_value = HeaderValue::from_str(value)
            .map_err(|_| ConfigError::InvalidHeaderValue { setting })?;
        header_value.set_sensitive(true);
        map.insert(HeaderName::from_static(name), header_value);
    }
    Ok(map)
}
