//! JSON Schema input definitions advertised in `tools/list`.

use rmcp::model::JsonObject;
use serde_json::{Value, json};

use super::ToolName;
use crate::config::PROJECT_ID_ENV;

pub const MAX_PER_PAGE: u32 = 50;

pub fn input_schema(tool: ToolName) -> JsonObject {
    let schema = match tool {
        ToolName::ListKeys => object(
            with_project(with_pagination(vec![
                (
                    "search",
                    string("Filter keys by name, description or translation content (case-insensitive substring match)"),
                ),
                (
                    "only_untranslated",
                    boolean("When true, only return keys missing a translation in at least one project language"),
                ),
            ])),
            &[],
        ),
        ToolName::GetKey => object(
            with_project(vec![("key_id", required_string("Id of the key, as found in `data[].id` of list_keys"))]),
            &["key_id"],
        ),
        ToolName::CreateKey => object(with_project(key_fields(true)), &["name"]),
        ToolName::UpdateKey => {
            let mut fields = vec![(
                "key_id",
                required_string("Id of the key to update, from list_keys or get_key"),
            )];
            fields.extend(key_fields(false));
            object(with_project(fields), &["key_id"])
        }
        ToolName::DeleteKeys => object(
            with_project(vec![(
                "key_ids",
                json!({
                    "type": "array",
                    "items": { "type": "string", "minLength": 1 },
                    "minItems": 1,
                    "description": "Ids of the keys to delete. Their translations in every language are removed with them"
                }),
            )]),
            &["key_ids"],
        ),
        ToolName::SetTranslation => {
            let mut fields = vec![
                ("key_id", required_string("Id of the key to translate")),
                ("language_id", required_string("Id of the target language, from `data[].id` of list_languages")),
            ];
            fields.extend(translation_fields());
            object(with_project(fields), &["key_id", "language_id", "content"])
        }
        ToolName::CreateKeyWithTranslations => {
            let mut entry = vec![(
                "language_code",
                required_string("Locale code of a language configured in the project, e.g. 'en' or 'de'"),
            )];
            entry.extend(translation_fields());
            let mut fields = key_fields(true);
            fields.push((
                "translations",
                json!({
                    "type": "array",
                    "minItems": 1,
                    "items": object(entry, &["language_code", "content"]),
                    "description": "Translations of the new key, one per language code. Codes are resolved to language ids from the project's languages"
                }),
            ));
            object(with_project(fields), &["name", "translations"])
        }
        ToolName::ListLanguages => object(
            with_project(with_pagination(vec![(
                "search",
                string("Filter languages by name (case-insensitive substring match)"),
            )])),
            &[],
        ),
        ToolName::ListProjects => object(
            with_pagination(vec![(
                "search",
                string("Filter projects by name (case-insensitive substring match)"),
            )]),
            &[],
        ),
    };

    match schema {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

fn object(properties: Vec<(&'static str, Value)>, required: &[&str]) -> Value {
    let properties: serde_json::Map<String, Value> =
        properties.into_iter().map(|(name, schema)| (name.to_string(), schema)).collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn with_project(mut fields: Vec<(&'static str, Value)>) -> Vec<(&'static str, Value)> {
    fields.insert(
        0,
        (
            "project_id",
            json!({
                "type": "string",
                "description": format!(
                    "Texterify project id. Defaults to {PROJECT_ID_ENV}; it is also the `project_id` field of the project's texterify.json"
                )
            }),
        ),
    );
    fields
}

fn with_pagination(mut fields: Vec<(&'static str, Value)>) -> Vec<(&'static str, Value)> {
    fields.push((
        "page",
        json!({
            "type": "integer",
            "minimum": 1,
            "description": "Page number starting at 1. Use `meta.total` of the response to find the page count"
        }),
    ));
    fields.push((
        "per_page",
        json!({
            "type": "integer",
            "minimum": 1,
            "maximum": MAX_PER_PAGE,
            "description": "Results per page (backend default 10, at most 50)"
        }),
    ));
    fields
}

fn key_fields(creating: bool) -> Vec<(&'static str, Value)> {
    let name = if creating {
        required_string(
            "Key name used as the i18n identifier in source code, e.g. 'auth.login.title'. Unique within the project",
        )
    } else {
        required_string("New key name, unique within the project. Omit to keep the current name")
    };
    vec![
        ("name", name),
        ("description", string("Context for translators about where the key is used")),
        ("html_enabled", boolean("Whether translations of this key may contain HTML markup")),
        (
            "pluralization_enabled",
            boolean("Whether this key uses CLDR plural forms (zero, one, two, few, many and `content` as other)"),
        ),
    ]
}

fn translation_fields() -> Vec<(&'static str, Value)> {
    vec![
        (
            "content",
            required_string("Translated text. Also the CLDR 'other' form when the key is pluralized"),
        ),
        ("zero", string("CLDR plural form for zero, e.g. 'No items'")),
        ("one", string("CLDR plural form for one, e.g. '1 item'")),
        ("two", string("CLDR plural form for two, for languages with a dual form")),
        ("few", string("CLDR plural form for few, for languages with a paucal form")),
        ("many", string("CLDR plural form for many")),
    ]
}

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn required_string(description: &str) -> Value {
    json!({ "type": "string", "minLength": 1, "description": description })
}

fn boolean(description: &str) -> Value {
    json!({ "type": "boolean", "description": description })
}
