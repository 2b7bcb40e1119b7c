use std::{borrow::Cow, fmt, path::PathBuf, sync::Arc};

use anyhow::{Context, Result, anyhow};
use rmcp::{
    ErrorData as McpError, RoleClient,
    model::{
        CallToolRequestParam, CallToolResult, ClientResult, InitializeResult, JsonObject,
        ServerNotification, ServerRequest, Tool,
    },
    service::{
        NotificationContext, Peer, QuitReason, RequestContext, RunningService, Service, ServiceExt,
    },
    transport::{ConfigureCommandExt, child_process::TokioChildProcess},
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

/// Events emitted by [`TestClient`] while handling MCP traffic.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "payload")]
pub enum ClientEvent {
    Initialized(InitializeResult),
    Notification(ServerNotification),
    Request(ServerRequest),
    Warning { message: String },
}

/// Lightweight MCP client used for testing and debugging `texterify-mcp`.
pub struct TestClient {
    runtime: Option<RunningService<RoleClient, ClientService>>,
    events: broadcast::Sender<ClientEvent>,
}

impl fmt::Debug for TestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestClient")
            .field("events_buf_len", &self.events.receiver_count())
            .finish()
    }
}

impl TestClient {
    /// Spawns the server as a child process and completes the MCP handshake over its stdio.
    pub async fn connect_stdio(config: StdIoConfig) -> Result<Self> {
        let (service, events) = ClientService::with_channel();
        let mut command = tokio::process::Command::new(&config.command);
        command.args(&config.args);
        if config.clear_env {
            command.env_clear();
        }
        if !config.env.is_empty() {
            command.envs(config.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        command.kill_on_drop(true);

        let transport = TokioChildProcess::new(command.configure(|cmd| {
            cmd.stdin(std::process::Stdio::piped());
            cmd.stdout(std::process::Stdio::piped());
            cmd.stderr(std::process::Stdio::inherit());
        }))
        .with_context(|| format!("failed to spawn process {:?}", config.command))?;

        let runtime =
            service.serve(transport).await.context("failed to initialise MCP client")?;

        if let Some(info) = runtime.peer().peer_info().cloned() {
            let _ = events.send(ClientEvent::Initialized(info));
        }

        Ok(Self { runtime: Some(runtime), events })
    }

    fn peer(&self) -> Result<&Peer<RoleClient>> {
        self.runtime
            .as_ref()
            .map(|runtime| runtime.peer())
            .ok_or_else(|| anyhow!("client runtime is no longer available"))
    }

    /// Subscribes to live events produced by the client.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Returns the cached initialize result (if the handshake completed successfully).
    pub fn initialize_result(&self) -> Option<InitializeResult> {
        self.runtime.as_ref().and_then(|runtime| runtime.peer().peer_info().cloned())
    }

    /// Fetches all tools exposed by the connected MCP server.
    pub async fn list_all_tools(&self) -> Result<Vec<Tool>> {
        self.peer()?.list_all_tools().await.context("failed to list tools")
    }

    /// Calls a tool by name using the provided JSON arguments.
    pub async fn call_tool(
        &self,
        name: impl Into<String>,
        arguments: Option<Value>,
    ) -> Result<CallToolResult> {
        let arguments =
            arguments.map(json_to_object).transpose().context("invalid tool arguments")?;
        let params = CallToolRequestParam { name: Cow::Owned(name.into()), arguments };
        self.peer()?.call_tool(params).await.context("tool invocation failed")
    }

    /// Attempts to gracefully shut down the underlying transport task.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(runtime) = self.runtime.take() {
            match runtime.cancel().await {
                Ok(QuitReason::Cancelled) | Ok(QuitReason::Closed) => Ok(()),
                Ok(QuitReason::JoinError(err)) => Err(anyhow!(err)),
                Err(err) => Err(anyhow!(err)),
            }
        } else {
            Ok(())
        }
    }
}

impl Drop for TestClient {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            debug!("dropping TestClient; cancelling MCP runtime");
            runtime.cancellation_token().cancel();
        }
    }
}

#[derive(Clone)]
struct ClientService {
    inner: Arc<ClientServiceInner>,
}

struct ClientServiceInner {
    events: broadcast::Sender<ClientEvent>,
}

impl ClientService {
    fn with_channel() -> (Self, broadcast::Sender<ClientEvent>) {
        let (tx, _) = broadcast::channel(256);
        (Self { inner: Arc::new(ClientServiceInner { events: tx.clone() }) }, tx)
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.inner.events.send(event);
    }
}

impl Service<RoleClient> for ClientService {
    async fn handle_request(
        &self,
        request: <RoleClient as rmcp::service::ServiceRole>::PeerReq,
        _context: RequestContext<RoleClient>,
    ) -> Result<ClientResult, McpError> {
        self.emit(ClientEvent::Request(request.clone()));
        match request {
            ServerRequest::PingRequest(_) => Ok(ClientResult::empty(())),
            other => {
                self.emit(ClientEvent::Warning {
                    message: format!("unsupported server request: {other:?}"),
                });
                Err(McpError::internal_error("unsupported server-initiated request", None))
            }
        }
    }

    async fn handle_notification(
        &self,
        notification: <RoleClient as rmcp::service::ServiceRole>::PeerNot,
        _context: NotificationContext<RoleClient>,
    ) -> Result<(), McpError> {
        self.emit(ClientEvent::Notification(notification));
        Ok(())
    }

    fn get_info(&self) -> <RoleClient as rmcp::service::ServiceRole>::Info {
        Default::default()
    }
}

/// How to launch the server process.
#[derive(Debug, Clone)]
pub struct StdIoConfig {
    pub command: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    /// Start the child with an empty environment before applying `env`.
    pub clear_env: bool,
}

impl StdIoConfig {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self { command: command.into(), args: Vec::new(), env: Vec::new(), clear_env: false }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    pub fn with_clear_env(mut self, clear: bool) -> Self {
        self.clear_env = clear;
        self
    }
}

/// Text of every text content item in a tool result, joined by newlines.
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|content| content.as_text().map(|text| text.text.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn json_to_object(value: Value) -> Result<JsonObject> {
    match value {
        Value::Null => Ok(JsonObject::new()),
        Value::Object(map) => Ok(map),
        other => Err(anyhow!("tool arguments must be a JSON object, got {other}")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn null_arguments_become_empty_object() {
        assert!(json_to_object(Value::Null).unwrap().is_empty());
        assert_eq!(json_to_object(json!({ "a": 1 })).unwrap()["a"], 1);
        assert!(json_to_object(json!([1])).is_err());
    }

    #[test]
    fn stdio_config_builder_sets_fields() {
        let config = StdIoConfig::new("texterify-mcp")
            .with_args(vec!["serve".into()])
            .with_env(vec![("RUST_LOG".into(), "debug".into())])
            .with_clear_env(true);
        assert_eq!(config.args, ["serve"]);
        assert_eq!(config.env[0].1, "debug");
        assert!(config.clear_env);
    }
}
