use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::ApiClient;
use crate::error::ApiError;

/// Body of `POST projects/{id}/keys`. Unset optional fields are left out entirely.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CreateKeyBody {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pluralization_enabled: Option<bool>,
}

/// Body of `PUT projects/{id}/keys/{key_id}`; only supplied fields change.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UpdateKeyBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pluralization_enabled: Option<bool>,
}

#[derive(Debug, Serialize)]
struct DeleteKeysBody<'a> {
    keys: &'a [String],
}

#[derive(Debug, Clone, Default)]
pub struct ListKeysOptions {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub only_untranslated: bool,
}

impl ListKeysOptions {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            query.push(("search", search.to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            query.push(("per_page", per_page.to_string()));
        }
        if self.only_untranslated {
            query.push(("only_untranslated", "true".to_string()));
        }
        query
    }
}

pub async fn list_keys(
    client: &ApiClient,
    project_id: &str,
    options: &ListKeysOptions,
    operation: &str,
) -> Result<Option<Value>, ApiError> {
    client.get(&["projects", project_id, "keys"], &options.query(), operation).await
}

pub async fn get_key(
    client: &ApiClient,
    project_id: &str,
    key_id: &str,
    operation: &str,
) -> Result<Option<Value>, ApiError> {
    client.get(&["projects", project_id, "keys", key_id], &[], operation).await
}

pub async fn create_key(
    client: &ApiClient,
    project_id: &str,
    body: &CreateKeyBody,
    operation: &str,
) -> Result<Option<Value>, ApiError> {
    client.send_json(Method::POST, &["projects", project_id, "keys"], body, operation).await
}

pub async fn update_key(
    client: &ApiClient,
    project_id: &str,
    key_id: &str,
    body: &UpdateKeyBody,
    operation: &str,
) -> Result<Option<Value>, ApiError> {
    client
        .send_json(Method::PUT, &["projects", project_id, "keys", key_id], body, operation)
        .await
}

pub async fn delete_keys(
    client: &ApiClient,
    project_id: &str,
    key_ids: &[String],
    operation: &str,
) -> Result<Option<Value>, ApiError> {
    let body = DeleteKeysBody { keys: key_ids };
    client.send_json(Method::DELETE, &["projects", project_id, "keys"], &body, operation).await
}
