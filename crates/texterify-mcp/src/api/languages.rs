use serde::Deserialize;
use serde_json::Value;

use super::{ApiClient, projects::ListOptions};
use crate::error::ApiError;

/// One page of `GET projects/{id}/languages`, reduced to what code resolution needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguagesPage {
    #[serde(default)]
    pub data: Vec<LanguageRecord>,
    #[serde(default)]
    pub included: Vec<IncludedRecord>,
    #[serde(default)]
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageRecord {
    pub id: String,
    #[serde(default)]
    pub relationships: LanguageRelationships,
}

impl LanguageRecord {
    /// Id of the referenced `language_code` record, if the language has one.
    pub fn language_code_ref(&self) -> Option<&str> {
        self.relationships.language_code.as_ref()?.data.as_ref().map(|r| r.id.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguageRelationships {
    #[serde(default)]
    pub language_code: Option<Relationship>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<ResourceRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceRef {
    pub id: String,
}

/// Sideloaded record. Only `language_code` records carry a `code` attribute we use.
#[derive(Debug, Clone, Deserialize)]
pub struct IncludedRecord {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub attributes: IncludedAttributes,
}

impl IncludedRecord {
    pub fn language_code(&self) -> Option<&str> {
        match self.kind.as_deref() {
            None | Some("language_code") => self.attributes.code.as_deref(),
            Some(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncludedAttributes {
    #[serde(default)]
    pub code: Option<String>,
}

pub async fn list_languages(
    client: &ApiClient,
    project_id: &str,
    options: &ListOptions,
    operation: &str,
) -> Result<Option<Value>, ApiError> {
    client.get(&["projects", project_id, "languages"], &options.query(), operation).await
}

/// Fetch one page and decode it into [`LanguagesPage`]. An empty body is an empty page.
pub async fn languages_page(
    client: &ApiClient,
    project_id: &str,
    page: u32,
    per_page: u32,
    operation: &str,
) -> Result<LanguagesPage, ApiError> {
    let options = ListOptions { search: None, page: Some(page), per_page: Some(per_page) };
    match list_languages(client, project_id, &options, operation).await? {
        Some(body) => serde_json::from_value(body)
            .map_err(|source| ApiError::Decode { operation: operation.to_string(), source }),
        None => Ok(LanguagesPage::default()),
    }
}
