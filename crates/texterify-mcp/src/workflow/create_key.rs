//! Create a key and its translations as one unit.
//!
//! The run is strictly sequential: resolve language codes, validate the
//! requested codes, create the key, then create each translation in order.
//! If a translation fails after the key exists, the key is deleted again so
//! the project is not left with a half-translated key. Translations created
//! before the failure are not deleted one by one; the backend drops them
//! together with their key.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::resolver::{self, LanguageCodeMap};
use crate::{
    api::{
        ApiClient,
        keys::{self, CreateKeyBody},
        response,
        translations::{self, CreateTranslationBody, TranslationContent},
    },
    error::{ApiError, CreateKeyError},
};

pub const CREATE_KEY_OPERATION: &str = "creating key";
pub const ROLLBACK_OPERATION: &str = "rolling back key";

/// Translation for one language, addressed by locale code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub language_code: String,
    pub translation: TranslationContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateKeyRequest {
    pub key: CreateKeyBody,
    pub translations: Vec<TranslationRequest>,
}

/// Decoded bodies of every successful call, translations in submission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateKeyOutcome {
    pub key: Value,
    pub translations: Vec<Value>,
}

/// Runs one key-with-translations request against one project.
#[derive(Debug, Clone, Copy)]
pub struct KeyWithTranslations<'a> {
    client: &'a ApiClient,
    project_id: &'a str,
}

impl<'a> KeyWithTranslations<'a> {
    pub fn new(client: &'a ApiClient, project_id: &'a str) -> Self {
        Self { client, project_id }
    }

    pub async fn run(&self, request: &CreateKeyRequest) -> Result<CreateKeyOutcome, CreateKeyError> {
        let languages = resolver::resolve(self.client, self.project_id).await?;
        let language_ids = match_language_codes(&languages, &request.translations)?;

        let key = keys::create_key(self.client, self.project_id, &request.key, CREATE_KEY_OPERATION)
            .await?;
        if response::has_embedded_error(key.as_ref()) {
            let message = key
                .as_ref()
                .map(|body| response::describe_embedded_error(body, CREATE_KEY_OPERATION))
                .unwrap_or_default();
            return Err(CreateKeyError::KeyRejected { message });
        }
        let key = key.unwrap_or(Value::Null);
        let key_id = key_id(&key).map(str::to_string).ok_or_else(|| {
            CreateKeyError::MissingKeyId { operation: CREATE_KEY_OPERATION.to_string() }
        })?;
        info!(project_id = self.project_id, %key_id, name = %request.key.name, "created key");

        match self.create_translations(&key_id, &request.translations, &language_ids).await {
            Ok(translations) => Ok(CreateKeyOutcome { key, translations }),
            Err(failure) => Err(self.roll_back(&request.key.name, &key_id, failure).await),
        }
    }

    async fn create_translations(
        &self,
        key_id: &str,
        requests: &[TranslationRequest],
        language_ids: &[&str],
    ) -> Result<Vec<Value>, ApiError> {
        let mut created = Vec::with_capacity(requests.len());
        for (request, language_id) in requests.iter().zip(language_ids) {
            let operation = format!("setting translation for '{}'", request.language_code);
            let body = CreateTranslationBody {
                key_id,
                language_id: *language_id,
                translation: &request.translation,
            };
            // An `errors` map in a successful translation response is passed through as-is.
            let decoded =
                translations::create_translation(self.client, self.project_id, &body, &operation)
                    .await?;
            debug!(key_id, language_code = %request.language_code, "created translation");
            created.push(decoded.unwrap_or(Value::Null));
        }
        Ok(created)
    }

    async fn roll_back(&self, key_name: &str, key_id: &str, failure: ApiError) -> CreateKeyError {
        warn!(key_id, error = %failure, "translation failed, deleting key");
        let ids = [key_id.to_string()];
        match keys::delete_keys(self.client, self.project_id, &ids, ROLLBACK_OPERATION).await {
            Ok(_) => CreateKeyError::RolledBack {
                source: failure,
                key_name: key_name.to_string(),
                key_id: key_id.to_string(),
            },
            Err(rollback) => {
                warn!(key_id, error = %rollback, "rollback failed, key left in place");
                CreateKeyError::RollbackFailed {
                    translation: failure,
                    rollback,
                    key_name: key_name.to_string(),
                    key_id: key_id.to_string(),
                }
            }
        }
    }
}

/// Language id for each request, or every unknown code (first occurrence order).
fn match_language_codes<'m>(
    languages: &'m LanguageCodeMap,
    requests: &[TranslationRequest],
) -> Result<Vec<&'m str>, CreateKeyError> {
    let mut ids = Vec::with_capacity(requests.len());
    let mut unknown: Vec<String> = Vec::new();
    for request in requests {
        match languages.get(&request.language_code) {
            Some(id) => ids.push(id),
            None if !unknown.contains(&request.language_code) => {
                unknown.push(request.language_code.clone());
            }
            None => {}
        }
    }
    if unknown.is_empty() {
        Ok(ids)
    } else {
        Err(CreateKeyError::UnknownLanguageCodes {
            unknown,
            available: languages.codes().map(str::to_string).collect(),
        })
    }
}

fn key_id(body: &Value) -> Option<&str> {
    body.get("data")?.get("id")?.as_str()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, body_partial_json, method, path},
    };

    use super::*;
    use crate::test_support::{languages_page, test_client};

    const KEYS_PATH: &str = "/api/v1/projects/proj-1/keys";
    const TRANSLATIONS_PATH: &str = "/api/v1/projects/proj-1/translations";

    fn request(name: &str, translations: &[(&str, &str)]) -> CreateKeyRequest {
        CreateKeyRequest {
            key: CreateKeyBody { name: name.into(), ..Default::default() },
            translations: translations
                .iter()
                .map(|(code, content)| TranslationRequest {
                    language_code: (*code).into(),
                    translation: TranslationContent { content: (*content).into(), ..Default::default() },
                })
                .collect(),
        }
    }

    async fn mount_languages(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/v1/projects/proj-1/languages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(languages_page(
                &[("lang-en", "en"), ("lang-de", "de"), ("lang-fr", "fr")],
                3,
            )))
            .mount(server)
            .await;
    }

    async fn mount_key_created(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path(KEYS_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "id": "key-new", "type": "key" } })),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_translation(server: &MockServer, language_id: &str, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(TRANSLATIONS_PATH))
            .and(body_partial_json(json!({ "language_id": language_id })))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn creates_key_and_translations_in_order() {
        let server = MockServer::start().await;
        mount_languages(&server).await;
        mount_key_created(&server).await;
        mount_translation(&server, "lang-en", 200, json!({ "data": { "id": "t-en" } })).await;
        mount_translation(&server, "lang-de", 200, json!({ "data": { "id": "t-de" } })).await;

        let client = test_client(&server.uri());
        let outcome = KeyWithTranslations::new(&client, "proj-1")
            .run(&request("greeting", &[("en", "Hello"), ("de", "Hallo")]))
            .await
            .unwrap();

        assert_eq!(outcome.key["data"]["id"], "key-new");
        assert_eq!(outcome.translations.len(), 2);
        assert_eq!(outcome.translations[0]["data"]["id"], "t-en");
        assert_eq!(outcome.translations[1]["data"]["id"], "t-de");
    }

    #[tokio::test]
    async fn rejects_unknown_codes_before_any_mutation() {
        let server = MockServer::start().await;
        mount_languages(&server).await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let client = test_client(&server.uri());
        let err = KeyWithTranslations::new(&client, "proj-1")
            .run(&request("greeting", &[("en", "Hello"), ("xx", "??"), ("xx", "!!")]))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Unknown language code(s): xx. Available codes in this project: de, en, fr"
        );
    }

    #[tokio::test]
    async fn key_validation_error_stops_before_translations() {
        let server = MockServer::start().await;
        mount_languages(&server).await;
        Mock::given(method("POST"))
            .and(path(KEYS_PATH))
            .and(body_json(json!({ "name": "greeting" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "errors": { "name": [{ "error": "TAKEN" }] } })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(TRANSLATIONS_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("DELETE")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let client = test_client(&server.uri());
        let err = KeyWithTranslations::new(&client, "proj-1")
            .run(&request("greeting", &[("en", "Hello")]))
            .await
            .unwrap_err();

        assert!(matches!(err, CreateKeyError::KeyRejected { .. }), "unexpected error: {err:?}");
        assert_eq!(err.to_string(), "Error creating key: name: TAKEN");
    }

    #[tokio::test]
    async fn key_response_without_id_stops_before_translations() {
        for body in [json!({ "data": { "type": "key" } }), json!({ "errors": ["TAKEN"] })] {
            let server = MockServer::start().await;
            mount_languages(&server).await;
            Mock::given(method("POST"))
                .and(path(KEYS_PATH))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .expect(1)
                .mount(&server)
                .await;
            Mock::given(method("POST"))
                .and(path(TRANSLATIONS_PATH))
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&server)
                .await;
            Mock::given(method("DELETE"))
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&server)
                .await;

            let client = test_client(&server.uri());
            let err = KeyWithTranslations::new(&client, "proj-1")
                .run(&request("greeting", &[("en", "Hello")]))
                .await
                .unwrap_err();

            assert!(matches!(err, CreateKeyError::MissingKeyId { .. }), "unexpected error: {err:?}");
            assert_eq!(err.to_string(), "creating key: response did not contain a key id");
            server.verify().await;
        }
    }

    #[tokio::test]
    async fn failed_translation_rolls_back_the_key() {
        let server = MockServer::start().await;
        mount_languages(&server).await;
        mount_key_created(&server).await;
        mount_translation(&server, "lang-en", 200, json!({ "data": { "id": "t-en" } })).await;
        mount_translation(&server, "lang-de", 500, json!({ "message": "boom" })).await;
        Mock::given(method("DELETE"))
            .and(path(KEYS_PATH))
            .and(body_json(json!({ "keys": ["key-new"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Deleted" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = KeyWithTranslations::new(&client, "proj-1")
            .run(&request("greeting", &[("en", "Hello"), ("de", "Hallo"), ("fr", "Bonjour")]))
            .await
            .unwrap_err();

        assert!(matches!(err, CreateKeyError::RolledBack { .. }), "unexpected error: {err:?}");
        let message = err.to_string();
        assert!(message.starts_with("setting translation for 'de': 500 Internal Server Error"), "{message}");
        assert!(
            message.ends_with("The key 'greeting' (ID: key-new) has been rolled back (deleted)."),
            "{message}"
        );
    }

    #[tokio::test]
    async fn failed_rollback_reports_both_failures() {
        let server = MockServer::start().await;
        mount_languages(&server).await;
        mount_key_created(&server).await;
        mount_translation(&server, "lang-en", 403, json!({ "error": "denied" })).await;
        Mock::given(method("DELETE"))
            .and(path(KEYS_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("delete failed"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = KeyWithTranslations::new(&client, "proj-1")
            .run(&request("greeting", &[("en", "Hello")]))
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Translation failed: setting translation for 'en': Authentication failed (403)"), "{message}");
        assert!(
            message.contains("Additionally, rollback (key deletion) failed: rolling back key: 500 Internal Server Error — delete failed"),
            "{message}"
        );
        assert!(
            message.ends_with("The key 'greeting' (ID: key-new) was created but may have partial translations."),
            "{message}"
        );
    }

    #[tokio::test]
    async fn embedded_error_in_translation_response_counts_as_success() {
        let server = MockServer::start().await;
        mount_languages(&server).await;
        mount_key_created(&server).await;
        mount_translation(
            &server,
            "lang-fr",
            200,
            json!({ "errors": { "content": [{ "error": "INVALID" }] } }),
        )
        .await;
        Mock::given(method("DELETE")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let client = test_client(&server.uri());
        let outcome = KeyWithTranslations::new(&client, "proj-1")
            .run(&request("greeting", &[("fr", "Bonjour")]))
            .await
            .unwrap();

        assert_eq!(outcome.translations, vec![json!({ "errors": { "content": [{ "error": "INVALID" }] } })]);
    }

    #[tokio::test]
    async fn language_lookup_failure_propagates_without_mutation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no project"))
            .mount(&server)
            .await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let client = test_client(&server.uri());
        let err = KeyWithTranslations::new(&client, "proj-1")
            .run(&request("greeting", &[("en", "Hello")]))
            .await
            .unwrap_err();

        match err {
            CreateKeyError::Api(api) => {
                assert_eq!(api.operation(), "fetching languages");
                assert_eq!(api.status(), Some(404));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
