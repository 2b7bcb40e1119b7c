//! Classification of backend responses.
//!
//! Texterify signals failures in two ways: a non-success HTTP status, or a
//! `200` whose body carries an `errors` map (`{ "errors": { "name": [{ "error":
//! "TAKEN" }] } }`). [`interpret`] handles the first, [`has_embedded_error`] and
//! [`describe_embedded_error`] the second.

use reqwest::StatusCode;
use serde_json::Value;

use super::RawResponse;
use crate::config::{AUTH_EMAIL_ENV, AUTH_SECRET_ENV};
use crate::error::ApiError;

/// Decode a response, or turn a non-success status into an [`ApiError::Status`].
///
/// A success with an empty (or `null`) body decodes to `None`.
pub fn interpret(response: RawResponse, operation: &str) -> Result<Option<Value>, ApiError> {
    let RawResponse { status, body } = response;
    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(&body)
            .map_err(|source| ApiError::Decode { operation: operation.to_string(), source })?;
        return Ok((!value.is_null()).then_some(value));
    }

    let (status_text, detail) = match status {
        StatusCode::FORBIDDEN => (
            "Forbidden".to_string(),
            format!(
                "Authentication failed (403). Check {AUTH_EMAIL_ENV} and {AUTH_SECRET_ENV}. Response: {body}"
            ),
        ),
        StatusCode::NOT_FOUND => (
            "Not Found".to_string(),
            format!("The requested resource was not found (404). Response: {body}"),
        ),
        other => {
            let text = other.canonical_reason().unwrap_or("Unknown").to_string();
            let detail = format!("{} {text} — {body}", other.as_u16());
            (text, detail)
        }
    };

    Err(ApiError::Status {
        operation: operation.to_string(),
        status: status.as_u16(),
        status_text,
        body,
        detail,
    })
}

/// True iff the body has an `errors` object with at least one field.
pub fn has_embedded_error(body: Option<&Value>) -> bool {
    body.and_then(|value| value.get("errors"))
        .and_then(Value::as_object)
        .is_some_and(|errors| !errors.is_empty())
}

/// `"Error <operation>: field: CODE, field: CODE"`, in backend field order.
pub fn describe_embedded_error(body: &Value, operation: &str) -> String {
    let mut parts = Vec::new();
    if let Some(errors) = body.get("errors").and_then(Value::as_object) {
        for (field, entries) in errors {
            match entries {
                Value::Array(entries) => {
                    parts.extend(entries.iter().map(|entry| format!("{field}: {}", error_code(entry))));
                }
                other => parts.push(format!("{field}: {}", error_code(other))),
            }
        }
    }
    format!("Error {operation}: {}", parts.join(", "))
}

fn error_code(entry: &Value) -> String {
    match entry.get("error") {
        Some(Value::String(code)) => code.clone(),
        Some(other) => other.to_string(),
        None => match entry {
            Value::String(code) => code.clone(),
            other => other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse { status: StatusCode::from_u16(status).unwrap(), body: body.to_string() }
    }

    #[test]
    fn success_decodes_json_body() {
        let decoded = interpret(raw(200, r#"{"data":{"id":"k1"}}"#), "getting key").unwrap();
        assert_eq!(decoded, Some(json!({ "data": { "id": "k1" } })));
    }

    #[test]
    fn success_with_empty_body_is_absent() {
        assert_eq!(interpret(raw(200, ""), "deleting keys").unwrap(), None);
        assert_eq!(interpret(raw(204, "  "), "deleting keys").unwrap(), None);
    }

    #[test]
    fn success_with_invalid_json_is_decode_error() {
        let err = interpret(raw(200, "<html>"), "listing keys").unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }), "unexpected error: {err:?}");
    }

    #[test]
    fn forbidden_names_both_credential_settings() {
        let err = interpret(raw(403, "denied"), "listing keys").unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(
            err.detail(),
            "Authentication failed (403). Check TEXTERIFY_AUTH_EMAIL and TEXTERIFY_AUTH_SECRET. Response: denied"
        );
        assert_eq!(err.to_string(), format!("listing keys: {}", err.detail()));
    }

    #[test]
    fn not_found_has_specialised_message() {
        let err = interpret(raw(404, "{}"), "getting key").unwrap_err();
        assert_eq!(err.detail(), "The requested resource was not found (404). Response: {}");
    }

    #[test]
    fn other_statuses_use_generic_message() {
        let err = interpret(raw(500, "boom"), "creating key").unwrap_err();
        match &err {
            ApiError::Status { status, status_text, body, .. } => {
                assert_eq!(*status, 500);
                assert_eq!(status_text, "Internal Server Error");
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.detail(), "500 Internal Server Error — boom");
    }

    #[test]
    fn unregistered_status_falls_back_to_unknown_text() {
        let err = interpret(raw(599, "late"), "listing keys").unwrap_err();
        assert_eq!(err.detail(), "599 Unknown — late");
    }

    #[test]
    fn embedded_error_requires_non_empty_map() {
        assert!(has_embedded_error(Some(&json!({ "errors": { "name": [{ "error": "TAKEN" }] } }))));
        assert!(!has_embedded_error(Some(&json!({ "errors": {} }))));
        assert!(!has_embedded_error(Some(&json!({ "errors": null }))));
        assert!(!has_embedded_error(Some(&json!({ "data": { "id": "k1" } }))));
        assert!(!has_embedded_error(None));
    }

    #[test]
    fn describes_every_field_and_code_in_order() {
        let body = json!({
            "errors": {
                "name": [{ "error": "TAKEN" }, { "error": "INVALID" }],
                "description": [{ "error": "BLANK" }]
            }
        });
        assert_eq!(
            describe_embedded_error(&body, "creating key"),
            "Error creating key: name: TAKEN, name: INVALID, description: BLANK"
        );
    }
}
