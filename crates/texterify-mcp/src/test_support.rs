//! Fixtures shared by the unit tests of several modules.

use std::time::Duration;

use serde_json::{Value, json};

use crate::{api::ApiClient, config::Config};

pub(crate) fn test_config(base_url: &str) -> Config {
    Config {
        auth_email: "test@example.com".into(),
        auth_secret: "secret123".into(),
        project_id: Some("proj-1".into()),
        api_base_url: format!("{base_url}/api"),
        api_version: "v1".into(),
        request_timeout: Duration::from_secs(5),
    }
}

pub(crate) fn test_client(base_url: &str) -> ApiClient {
    ApiClient::new(&test_config(base_url)).unwrap()
}

/// A page of the languages listing: `(language id, code)` pairs plus the reported total.
pub(crate) fn languages_page(languages: &[(&str, &str)], total: usize) -> Value {
    let data: Vec<Value> = languages
        .iter()
        .map(|(id, code)| {
            json!({
                "id": id,
                "type": "language",
                "attributes": { "id": id, "name": code, "is_default": false, "progress": 0 },
                "relationships": {
                    "country_code": { "data": null },
                    "language_code": { "data": { "id": format!("lc-{code}"), "type": "language_code" } },
                    "parent": { "data": null }
                }
            })
        })
        .collect();
    let included: Vec<Value> = languages
        .iter()
        .map(|(_, code)| {
            json!({
                "id": format!("lc-{code}"),
                "type": "language_code",
                "attributes": { "id": format!("lc-{code}"), "name": code, "code": code }
            })
        })
        .collect();
    json!({ "data": data, "included": included, "meta": { "total": total } })
}
