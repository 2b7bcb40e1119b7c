//! Language code resolution.
//!
//! Translations are addressed by language id, but callers think in locale
//! codes. [`resolve`] walks the whole paginated language listing of a project
//! and builds the code to id map; it is never consulted half-built.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::{
    api::{ApiClient, languages},
    error::ApiError,
};

pub const LANGUAGES_PER_PAGE: u32 = 50;
pub const FETCH_LANGUAGES_OPERATION: &str = "fetching languages";

/// Locale code to language id for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageCodeMap {
    ids_by_code: BTreeMap<String, String>,
}

impl LanguageCodeMap {
    pub fn get(&self, code: &str) -> Option<&str> {
        self.ids_by_code.get(code).map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.ids_by_code.contains_key(code)
    }

    /// Known codes in ascending order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.ids_by_code.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids_by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids_by_code.is_empty()
    }
}

impl FromIterator<(String, String)> for LanguageCodeMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self { ids_by_code: iter.into_iter().collect() }
    }
}

/// Fetch every language page of `project_id` and map codes to language ids.
///
/// Stops once the number of fetched languages reaches `meta.total`, or on the
/// first page without records. Any failed page aborts the whole resolution.
pub async fn resolve(client: &ApiClient, project_id: &str) -> Result<LanguageCodeMap, ApiError> {
    let mut code_refs: Vec<(String, String)> = Vec::new();
    let mut codes_by_ref: HashMap<String, String> = HashMap::new();
    let mut fetched: u64 = 0;
    let mut page_number = 1;

    loop {
        let page = languages::languages_page(
            client,
            project_id,
            page_number,
            LANGUAGES_PER_PAGE,
            FETCH_LANGUAGES_OPERATION,
        )
        .await?;

        for record in &page.included {
            if let Some(code) = record.language_code() {
                codes_by_ref.insert(record.id.clone(), code.to_string());
            }
        }
        for language in &page.data {
            if let Some(code_ref) = language.language_code_ref() {
                code_refs.push((code_ref.to_string(), language.id.clone()));
            }
        }

        let records = page.data.len() as u64;
        fetched += records;
        debug!(page = page_number, records, fetched, total = page.meta.total, "fetched languages page");
        if records == 0 || fetched >= page.meta.total {
            break;
        }
        page_number += 1;
    }

    Ok(code_refs
        .into_iter()
        .filter_map(|(code_ref, id)| codes_by_ref.get(&code_ref).map(|code| (code.clone(), id)))
        .collect())
}
