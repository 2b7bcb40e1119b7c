//! The tool catalogue exposed over MCP and its dispatch.

pub mod args;
pub mod handlers;
pub mod schema;

use std::{str::FromStr, sync::Arc};

use rmcp::model::{Tool, ToolAnnotations};

pub use handlers::ToolSet;

/// Every tool the server offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ListKeys,
    GetKey,
    CreateKey,
    UpdateKey,
    DeleteKeys,
    SetTranslation,
    CreateKeyWithTranslations,
    ListLanguages,
    ListProjects,
}

impl ToolName {
    pub const ALL: [ToolName; 9] = [
        ToolName::ListKeys,
        ToolName::GetKey,
        ToolName::CreateKey,
        ToolName::UpdateKey,
        ToolName::DeleteKeys,
        ToolName::SetTranslation,
        ToolName::CreateKeyWithTranslations,
        ToolName::ListLanguages,
        ToolName::ListProjects,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::ListKeys => "list_keys",
            ToolName::GetKey => "get_key",
            ToolName::CreateKey => "create_key",
            ToolName::UpdateKey => "update_key",
            ToolName::DeleteKeys => "delete_keys",
            ToolName::SetTranslation => "set_translation",
            ToolName::CreateKeyWithTranslations => "create_key_with_translations",
            ToolName::ListLanguages => "list_languages",
            ToolName::ListProjects => "list_projects",
        }
    }

    /// Label used in `"Error <operation>: ..."` messages.
    pub fn operation(self) -> &'static str {
        match self {
            ToolName::ListKeys => "listing keys",
            ToolName::GetKey => "getting key",
            ToolName::CreateKey => "creating key",
            ToolName::UpdateKey => "updating key",
            ToolName::DeleteKeys => "deleting keys",
            ToolName::SetTranslation => "setting translation",
            ToolName::CreateKeyWithTranslations => "creating key with translations",
            ToolName::ListLanguages => "listing languages",
            ToolName::ListProjects => "listing projects",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolName::ListKeys => {
                "Search and list translation keys of the Texterify project, with their translations, tags and \
                 pagination metadata (`meta.total`). Use it to find the key ids needed by get_key, update_key, \
                 delete_keys and set_translation."
            }
            ToolName::GetKey => {
                "Get one translation key with its translations in every project language, plus tags and \
                 placeholders. Requires a key_id from list_keys."
            }
            ToolName::CreateKey => {
                "Create a translation key (i18n identifier) without any translated content. Add translations \
                 afterwards with set_translation, or use create_key_with_translations. Duplicate names fail \
                 with the validation code TAKEN."
            }
            ToolName::UpdateKey => {
                "Update the name, description or HTML/pluralization flags of an existing key. Only supplied \
                 fields change; translations are not touched (use set_translation)."
            }
            ToolName::DeleteKeys => {
                "Permanently delete one or more keys together with all of their translations. This cannot be \
                 undone; check the ids with list_keys first."
            }
            ToolName::SetTranslation => {
                "Set the translated text of a key in one language, creating or replacing it. Needs a key_id \
                 and a language_id (from list_languages). Plural forms are only sent when given."
            }
            ToolName::CreateKeyWithTranslations => {
                "Create a key and its translations for several languages in one call. Languages are given by \
                 code (e.g. 'en', 'de') and resolved against the project's languages. If any translation \
                 fails after the key was created, the key is deleted again."
            }
            ToolName::ListLanguages => {
                "List the languages of the Texterify project with their ids, default flag, translation \
                 progress and supported plural forms. Language codes are in `included`."
            }
            ToolName::ListProjects => {
                "List the Texterify projects the configured user can access, to discover or verify project ids."
            }
        }
    }

    fn annotations(self) -> ToolAnnotations {
        let (read_only, destructive, idempotent) = match self {
            ToolName::ListKeys | ToolName::GetKey | ToolName::ListLanguages | ToolName::ListProjects => {
                (true, false, true)
            }
            ToolName::CreateKey | ToolName::CreateKeyWithTranslations => (false, false, false),
            ToolName::UpdateKey | ToolName::DeleteKeys | ToolName::SetTranslation => {
                (false, true, true)
            }
        };
        ToolAnnotations::new()
            .read_only(read_only)
            .destructive(destructive)
            .idempotent(idempotent)
            .open_world(true)
    }

    pub fn definition(self) -> Tool {
        let mut tool =
            Tool::new(self.as_str(), self.description(), Arc::new(schema::input_schema(self)));
        tool.annotations = Some(self.annotations());
        tool
    }
}

impl FromStr for ToolName {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == name)
            .ok_or_else(|| format!("unknown tool '{name}'"))
    }
}

/// Definitions of every tool, in catalogue order.
pub fn catalogue() -> Vec<Tool> {
    ToolName::ALL.into_iter().map(ToolName::definition).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>().unwrap(), tool);
        }
        assert!("translate_everything".parse::<ToolName>().is_err());
    }

    #[test]
    fn catalogue_lists_nine_tools_with_annotations() {
        let tools = catalogue();
        assert_eq!(tools.len(), 9);
        let delete = tools.iter().find(|tool| tool.name == "delete_keys").unwrap();
        let annotations = delete.annotations.as_ref().unwrap();
        assert_eq!(annotations.destructive_hint, Some(true));
        assert_eq!(annotations.read_only_hint, Some(false));
    }
}
