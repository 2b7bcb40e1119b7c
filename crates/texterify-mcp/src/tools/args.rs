//! Typed tool arguments and the checks the input schemas promise.

use rmcp::model::JsonObject;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use super::schema::MAX_PER_PAGE;
use crate::{
    api::{
        keys::{CreateKeyBody, ListKeysOptions, UpdateKeyBody},
        projects::ListOptions,
        translations::TranslationContent,
    },
    workflow::{CreateKeyRequest, TranslationRequest},
};

/// Arguments that carry more constraints than their types express.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Deserialize and validate `arguments`; absent arguments are an empty object.
pub fn parse<T>(arguments: Option<JsonObject>) -> Result<T, String>
where
    T: DeserializeOwned + Validate,
{
    let value = Value::Object(arguments.unwrap_or_default());
    let parsed: T = serde_json::from_value(value).map_err(|err| err.to_string())?;
    parsed.validate()?;
    Ok(parsed)
}

fn non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() { Err(format!("`{field}` must not be empty")) } else { Ok(()) }
}

fn pagination(page: Option<u32>, per_page: Option<u32>) -> Result<(), String> {
    if page == Some(0) {
        return Err("`page` must be at least 1".into());
    }
    if per_page.is_some_and(|per_page| !(1..=MAX_PER_PAGE).contains(&per_page)) {
        return Err(format!("`per_page` must be between 1 and {MAX_PER_PAGE}"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListKeysArgs {
    pub project_id: Option<String>,
    pub search: Option<String>,
    pub only_untranslated: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl Validate for ListKeysArgs {
    fn validate(&self) -> Result<(), String> {
        pagination(self.page, self.per_page)
    }
}

impl ListKeysArgs {
    pub fn options(&self) -> ListKeysOptions {
        ListKeysOptions {
            search: self.search.clone(),
            page: self.page,
            per_page: self.per_page,
            only_untranslated: self.only_untranslated.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetKeyArgs {
    pub project_id: Option<String>,
    pub key_id: String,
}

impl Validate for GetKeyArgs {
    fn validate(&self) -> Result<(), String> {
        non_empty("key_id", &self.key_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateKeyArgs {
    pub project_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub html_enabled: Option<bool>,
    pub pluralization_enabled: Option<bool>,
}

impl Validate for CreateKeyArgs {
    fn validate(&self) -> Result<(), String> {
        non_empty("name", &self.name)
    }
}

impl CreateKeyArgs {
    pub fn body(&self) -> CreateKeyBody {
        CreateKeyBody {
            name: self.name.clone(),
            description: self.description.clone(),
            html_enabled: self.html_enabled,
            pluralization_enabled: self.pluralization_enabled,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateKeyArgs {
    pub project_id: Option<String>,
    pub key_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub html_enabled: Option<bool>,
    pub pluralization_enabled: Option<bool>,
}

impl Validate for UpdateKeyArgs {
    fn validate(&self) -> Result<(), String> {
        non_empty("key_id", &self.key_id)?;
        match self.name.as_deref() {
            Some(name) => non_empty("name", name),
            None => Ok(()),
        }
    }
}

impl UpdateKeyArgs {
    pub fn body(&self) -> UpdateKeyBody {
        UpdateKeyBody {
            name: self.name.clone(),
            description: self.description.clone(),
            html_enabled: self.html_enabled,
            pluralization_enabled: self.pluralization_enabled,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteKeysArgs {
    pub project_id: Option<String>,
    pub key_ids: Vec<String>,
}

impl Validate for DeleteKeysArgs {
    fn validate(&self) -> Result<(), String> {
        if self.key_ids.is_empty() {
            return Err("`key_ids` must contain at least one id".into());
        }
        self.key_ids.iter().try_for_each(|id| non_empty("key_ids[]", id))
    }
}

/// Translated text plus optional plural forms, shared by both translation tools.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationArgs {
    pub content: String,
    pub zero: Option<String>,
    pub one: Option<String>,
    pub two: Option<String>,
    pub few: Option<String>,
    pub many: Option<String>,
}

impl TranslationArgs {
    pub fn content(&self) -> TranslationContent {
        TranslationContent {
            content: self.content.clone(),
            zero: self.zero.clone(),
            one: self.one.clone(),
            two: self.two.clone(),
            few: self.few.clone(),
            many: self.many.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetTranslationArgs {
    pub project_id: Option<String>,
    pub key_id: String,
    pub language_id: String,
    #[serde(flatten)]
    pub translation: TranslationArgs,
}

impl Validate for SetTranslationArgs {
    fn validate(&self) -> Result<(), String> {
        non_empty("key_id", &self.key_id)?;
        non_empty("language_id", &self.language_id)?;
        non_empty("content", &self.translation.content)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationEntryArgs {
    pub language_code: String,
    #[serde(flatten)]
    pub translation: TranslationArgs,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateKeyWithTranslationsArgs {
    #[serde(flatten)]
    pub key: CreateKeyArgs,
    pub translations: Vec<TranslationEntryArgs>,
}

impl Validate for CreateKeyWithTranslationsArgs {
    fn validate(&self) -> Result<(), String> {
        self.key.validate()?;
        if self.translations.is_empty() {
            return Err("`translations` must contain at least one entry".into());
        }
        for entry in &self.translations {
            non_empty("translations[].language_code", &entry.language_code)?;
            non_empty("translations[].content", &entry.translation.content)?;
        }
        Ok(())
    }
}

impl CreateKeyWithTranslationsArgs {
    pub fn request(&self) -> CreateKeyRequest {
        CreateKeyRequest {
            key: self.key.body(),
            translations: self
                .translations
                .iter()
                .map(|entry| TranslationRequest {
                    language_code: entry.language_code.clone(),
                    translation: entry.translation.content(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListLanguagesArgs {
    pub project_id: Option<String>,
    #[serde(flatten)]
    pub list: ListArgs,
}

impl Validate for ListLanguagesArgs {
    fn validate(&self) -> Result<(), String> {
        self.list.validate()
    }
}

/// `search`, `page` and `per_page`, as taken by the plain listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListArgs {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl Validate for ListArgs {
    fn validate(&self) -> Result<(), String> {
        pagination(self.page, self.per_page)
    }
}

impl ListArgs {
    pub fn options(&self) -> ListOptions {
        ListOptions { search: self.search.clone(), page: self.page, per_page: self.per_page }
    }
}
