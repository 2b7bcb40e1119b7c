use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content, JsonObject},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    ToolName,
    args::{self, Validate},
};
use crate::{
    api::{ApiClient, keys, languages, projects, response, translations},
    config::{Config, PROJECT_ID_ENV},
    error::{ApiError, ConfigError, CreateKeyError},
    workflow::KeyWithTranslations,
};

pub const RESOLVE_PROJECT_OPERATION: &str = "resolving project";

/// Executes tool calls against one backend with one default project.
#[derive(Debug, Clone)]
pub struct ToolSet {
    client: ApiClient,
    default_project_id: Option<String>,
}

impl ToolSet {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::with_client(ApiClient::new(config)?, config.project_id.clone()))
    }

    pub fn with_client(client: ApiClient, default_project_id: Option<String>) -> Self {
        Self { client, default_project_id }
    }

    pub fn default_project_id(&self) -> Option<&str> {
        self.default_project_id.as_deref()
    }

    /// Run one tool call.
    ///
    /// Unknown tools and malformed arguments are protocol errors; everything
    /// that goes wrong while talking to the backend is an error result.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let tool = name.parse::<ToolName>().map_err(|msg| McpError::invalid_params(msg, None))?;
        debug!(tool = tool.as_str(), "dispatching tool call");

        let result = match tool {
            ToolName::ListKeys => {
                let args: &args::ListKeysArgs = &parse(tool, arguments)?;
                self.scoped(tool, args.project_id.as_deref(), |project| async move {
                    keys::list_keys(&self.client, &project, &args.options(), tool.operation()).await
                })
                .await
            }
            ToolName::GetKey => {
                let args: &args::GetKeyArgs = &parse(tool, arguments)?;
                self.scoped(tool, args.project_id.as_deref(), |project| async move {
                    keys::get_key(&self.client, &project, &args.key_id, tool.operation()).await
                })
                .await
            }
            ToolName::CreateKey => {
                let args: &args::CreateKeyArgs = &parse(tool, arguments)?;
                self.scoped_checked(tool, args.project_id.as_deref(), |project| async move {
                    keys::create_key(&self.client, &project, &args.body(), tool.operation()).await
                })
                .await
            }
            ToolName::UpdateKey => {
                let args: &args::UpdateKeyArgs = &parse(tool, arguments)?;
                self.scoped_checked(tool, args.project_id.as_deref(), |project| async move {
                    keys::update_key(&self.client, &project, &args.key_id, &args.body(), tool.operation())
                        .await
                })
                .await
            }
            ToolName::DeleteKeys => {
                let args: &args::DeleteKeysArgs = &parse(tool, arguments)?;
                self.scoped(tool, args.project_id.as_deref(), |project| async move {
                    keys::delete_keys(&self.client, &project, &args.key_ids, tool.operation()).await
                })
                .await
            }
            ToolName::SetTranslation => {
                let args: &args::SetTranslationArgs = &parse(tool, arguments)?;
                self.scoped(tool, args.project_id.as_deref(), |project| async move {
                    let translation = args.translation.content();
                    let body = translations::CreateTranslationBody {
                        key_id: &args.key_id,
                        language_id: &args.language_id,
                        translation: &translation,
                    };
                    translations::create_translation(&self.client, &project, &body, tool.operation())
                        .await
                })
                .await
            }
            ToolName::CreateKeyWithTranslations => {
                let args: &args::CreateKeyWithTranslationsArgs = &parse(tool, arguments)?;
                match self.project_id(args.key.project_id.as_deref()) {
                    Ok(project) => self.create_key_with_translations(tool, &project, args).await,
                    Err(result) => result,
                }
            }
            ToolName::ListLanguages => {
                let args: &args::ListLanguagesArgs = &parse(tool, arguments)?;
                self.scoped(tool, args.project_id.as_deref(), |project| async move {
                    languages::list_languages(&self.client, &project, &args.list.options(), tool.operation())
                        .await
                })
                .await
            }
            ToolName::ListProjects => {
                let args: &args::ListArgs = &parse(tool, arguments)?;
                let outcome =
                    projects::list_projects(&self.client, &args.options(), tool.operation()).await;
                render(tool, outcome)
            }
        };
        Ok(result)
    }

    /// Project named in the arguments, else the configured default.
    fn project_id(&self, requested: Option<&str>) -> Result<String, CallToolResult> {
        requested
            .filter(|id| !id.trim().is_empty())
            .or(self.default_project_id.as_deref())
            .map(str::to_string)
            .ok_or_else(|| {
                error_result(
                    RESOLVE_PROJECT_OPERATION,
                    &format!(
                        "project_id is required. Pass it as an argument or set {PROJECT_ID_ENV}. \
                         It is the `project_id` field of the project's texterify.json file."
                    ),
                )
            })
    }

    async fn scoped<F, Fut>(&self, tool: ToolName, requested: Option<&str>, call: F) -> CallToolResult
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Option<Value>, ApiError>>,
    {
        match self.project_id(requested) {
            Ok(project) => render(tool, call(project).await),
            Err(result) => result,
        }
    }

    /// Like [`Self::scoped`], but a `200` carrying an `errors` map is reported as a failure.
    async fn scoped_checked<F, Fut>(
        &self,
        tool: ToolName,
        requested: Option<&str>,
        call: F,
    ) -> CallToolResult
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Option<Value>, ApiError>>,
    {
        match self.project_id(requested) {
            Ok(project) => match call(project).await {
                Ok(Some(body)) if response::has_embedded_error(Some(&body)) => {
                    let message = response::describe_embedded_error(&body, tool.operation());
                    warn!(tool = tool.as_str(), %message, "backend rejected the request");
                    CallToolResult::error(vec![Content::text(message)])
                }
                other => render(tool, other),
            },
            Err(result) => result,
        }
    }

    async fn create_key_with_translations(
        &self,
        tool: ToolName,
        project: &str,
        args: &args::CreateKeyWithTranslationsArgs,
    ) -> CallToolResult {
        match KeyWithTranslations::new(&self.client, project).run(&args.request()).await {
            Ok(outcome) => match serde_json::to_value(&outcome) {
                Ok(value) => success_result(&value),
                Err(err) => error_result(tool.operation(), &err.to_string()),
            },
            Err(CreateKeyError::KeyRejected { message }) => {
                warn!(tool = tool.as_str(), %message, "backend rejected the key");
                CallToolResult::error(vec![Content::text(message)])
            }
            Err(CreateKeyError::Api(err)) => {
                warn!(tool = tool.as_str(), error = %err, "tool call failed");
                error_result(tool.operation(), &err.detail())
            }
            Err(err) => {
                warn!(tool = tool.as_str(), error = %err, "tool call failed");
                error_result(tool.operation(), &err.to_string())
            }
        }
    }
}

fn parse<T>(tool: ToolName, arguments: Option<JsonObject>) -> Result<T, McpError>
where
    T: DeserializeOwned + Validate,
{
    args::parse(arguments).map_err(|msg| {
        McpError::invalid_params(format!("invalid arguments for {}: {msg}", tool.as_str()), None)
    })
}

fn render(tool: ToolName, outcome: Result<Option<Value>, ApiError>) -> CallToolResult {
    match outcome {
        Ok(body) => success_result(&body.unwrap_or(Value::Null)),
        Err(err) => {
            warn!(tool = tool.as_str(), error = %err, "tool call failed");
            error_result(tool.operation(), &err.detail())
        }
    }
}

/// Pretty-printed JSON body as the single text item.
pub fn success_result(body: &Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
    CallToolResult::success(vec![Content::text(text)])
}

/// `"Error <operation>: <message>"` flagged as an error.
pub fn error_result(operation: &str, message: &str) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!("Error {operation}: {message}"))])
}
