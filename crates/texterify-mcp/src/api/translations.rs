use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::ApiClient;
use crate::error::ApiError;

/// Translated text: `content` is the CLDR "other" form, the rest are optional overrides.
///
/// Forms that were not supplied are omitted from the payload, never sent as
/// `null` or `""`.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TranslationContent {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub few: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub many: Option<String>,
}

/// Body of `POST projects/{id}/translations` (an upsert on key + language).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateTranslationBody<'a> {
    pub key_id: &'a str,
    pub language_id: &'a str,
    pub translation: &'a TranslationContent,
}

pub async fn create_translation(
    client: &ApiClient,
    project_id: &str,
    body: &CreateTranslationBody<'_>,
    operation: &str,
) -> Result<Option<Value>, ApiError> {
    client.send_json(Method::POST, &["projects", project_id, "translations"], body, operation).await
}
