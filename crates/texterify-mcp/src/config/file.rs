use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::ConfigError;

/// Settings that may be supplied through a TOML config file.
///
/// Every field is optional; environment variables and CLI flags override
/// whatever the file provides.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub auth_email: Option<String>,
    #[serde(default)]
    pub auth_secret: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Either a `[texterify]` table or the same keys at the top level.
///
/// A present `texterify` table wins over any top-level keys.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    texterify: Option<ConfigFile>,
    #[serde(flatten)]
    top_level: ConfigFile,
}

impl ConfigDocument {
    fn into_file(self) -> ConfigFile {
        self.texterify.unwrap_or(self.top_level)
    }
}

impl ConfigFile {
    /// Load from a TOML file, accepting either a `[texterify]` table or top-level keys.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadConfig { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&content, path)
    }

    fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let doc: ConfigDocument = toml_edit::de::from_str(content)
            .map_err(|source| ConfigError::ParseToml { path: PathBuf::from(path), source })?;
        let mut file = doc.into_file();
        for value in [
            &mut file.auth_email,
            &mut file.auth_secret,
            &mut file.project_id,
            &mut file.api_base_url,
            &mut file.api_version,
        ] {
            if let Some(raw) = value.take() {
                let trimmed = raw.trim().to_string();
                *value = (!trimmed.is_empty()).then_some(trimmed);
            }
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn parses_wrapped_toml_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("texterify.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[texterify]
auth_email = "dev@example.com"
auth_secret = "s3cret"
project_id = "proj-1"
request_timeout_secs = 10
"#
        )
        .unwrap();

        let config = ConfigFile::from_path(&path).unwrap();
        assert_eq!(config.auth_email.as_deref(), Some("dev@example.com"));
        assert_eq!(config.project_id.as_deref(), Some("proj-1"));
        assert_eq!(config.request_timeout_secs, Some(10));
        assert_eq!(config.api_base_url, None);
    }

    #[test]
    fn parses_top_level_keys_and_drops_blank_values() {
        let config = ConfigFile::from_toml_str(
            "api_base_url = \"https://texterify.internal/api\"\nproject_id = \"  \"\n",
            Path::new("inline.toml"),
        )
        .unwrap();
        assert_eq!(config.api_base_url.as_deref(), Some("https://texterify.internal/api"));
        assert_eq!(config.project_id, None);
    }

    #[test]
    fn mistyped_value_inside_table_is_a_parse_error() {
        let err = ConfigFile::from_toml_str(
            "[texterify]\nauth_email = \"a@b.c\"\nauth_secret = \"s\"\nrequest_timeout_secs = \"30\"\n",
            Path::new("typo.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }), "unexpected error: {err:?}");
    }

    #[test]
    fn mistyped_top_level_value_is_a_parse_error() {
        let err = ConfigFile::from_toml_str("request_timeout_secs = \"30\"\n", Path::new("typo.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }), "unexpected error: {err:?}");
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = ConfigFile::from_toml_str("auth_email = [", Path::new("broken.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("broken.toml"), "unexpected error: {err:?}");
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = ConfigFile::from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ReadConfig { .. }), "unexpected error: {err:?}");
    }
}
