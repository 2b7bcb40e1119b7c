use serde_json::Value;

use super::ApiClient;
use crate::error::ApiError;

/// Search and pagination shared by the project and language listings.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListOptions {
    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
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
        query
    }
}

pub async fn list_projects(
    client: &ApiClient,
    options: &ListOptions,
    operation: &str,
) -> Result<Option<Value>, ApiError> {
    client.get(&["projects"], &options.query(), operation).await
}
