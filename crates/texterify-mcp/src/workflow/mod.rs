//! Multi-step operations built on top of the resource clients.

pub mod create_key;
pub mod resolver;

pub use create_key::{CreateKeyOutcome, CreateKeyRequest, KeyWithTranslations, TranslationRequest};
pub use resolver::LanguageCodeMap;
