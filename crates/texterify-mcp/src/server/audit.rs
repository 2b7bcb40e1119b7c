//! Append-only JSON-lines record of tool calls.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use serde::Serialize;
use serde_json::{Value, json};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

/// Argument names whose values are replaced before they reach the log.
const REDACTED_ARGUMENTS: &[&str] = &["auth_secret", "auth_email"];

/// Non-blocking append-only log sink backed by a single file.
#[derive(Clone)]
pub struct LogSink {
    inner: Arc<LogSinkInner>,
}

struct LogSinkInner {
    file: Mutex<tokio::fs::File>,
}

impl LogSink {
    pub async fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        Ok(Self { inner: Arc::new(LogSinkInner { file: Mutex::new(file) }) })
    }

    pub async fn append<T: Serialize>(&self, record: &T) -> Result<()> {
        let mut buffer = serde_json::to_vec(record).context("failed to serialise log record")?;
        buffer.push(b'\n');
        let mut file = self.inner.file.lock().await;
        file.write_all(&buffer).await.context("failed to write log record")?;
        file.flush().await.context("failed to flush log record")?;
        Ok(())
    }
}

/// Writes request/response pairs for every tool call.
#[derive(Clone)]
pub struct AuditLog {
    sink: LogSink,
}

impl AuditLog {
    pub async fn open(path: PathBuf) -> Result<Self> {
        Ok(Self { sink: LogSink::open(path).await? })
    }

    pub async fn tool_request(
        &self,
        call_id: &str,
        tool_name: &str,
        arguments: Option<&JsonObject>,
    ) -> Result<()> {
        let entry = AuditEntry {
            timestamp: now_timestamp(),
            level: AuditLevel::Info,
            category: AuditCategory::ToolRequest,
            message: format!("tool call started: {tool_name}"),
            tool: ToolContext::new(tool_name, call_id),
            duration_ms: None,
            details: arguments.map(redact),
        };
        self.sink.append(&entry).await
    }

    pub async fn tool_response(
        &self,
        call_id: &str,
        tool_name: &str,
        duration: Duration,
        result: &CallToolResult,
    ) -> Result<()> {
        let failed = result.is_error.unwrap_or(false);
        let entry = AuditEntry {
            timestamp: now_timestamp(),
            level: if failed { AuditLevel::Error } else { AuditLevel::Info },
            category: if failed { AuditCategory::ToolError } else { AuditCategory::ToolResponse },
            message: if failed {
                format!("tool call failed: {tool_name}")
            } else {
                format!("tool call completed: {tool_name}")
            },
            tool: ToolContext::new(tool_name, call_id),
            duration_ms: Some(duration.as_millis()),
            details: serde_json::to_value(result).ok(),
        };
        self.sink.append(&entry).await
    }

    pub async fn tool_rejected(
        &self,
        call_id: &str,
        tool_name: &str,
        duration: Duration,
        error: &McpError,
    ) -> Result<()> {
        let entry = AuditEntry {
            timestamp: now_timestamp(),
            level: AuditLevel::Error,
            category: AuditCategory::ToolError,
            message: format!("tool call rejected: {tool_name}"),
            tool: ToolContext::new(tool_name, call_id),
            duration_ms: Some(duration.as_millis()),
            details: Some(json!({ "error": error.message, "code": error.code.0 })),
        };
        self.sink.append(&entry).await
    }
}

#[derive(Copy, Clone, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditLevel {
    Info,
    Error,
}

#[derive(Copy, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AuditCategory {
    ToolRequest,
    ToolResponse,
    ToolError,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolContext {
    pub name: String,
    pub call_id: String,
}

impl ToolContext {
    fn new(name: &str, call_id: &str) -> Self {
        Self { name: name.to_string(), call_id: call_id.to_string() }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub timestamp: String,
    pub level: AuditLevel,
    pub category: AuditCategory,
    pub message: String,
    pub tool: ToolContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

fn now_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

fn redact(arguments: &JsonObject) -> Value {
    let mut arguments = arguments.clone();
    for name in REDACTED_ARGUMENTS {
        if let Some(value) = arguments.get_mut(*name) {
            *value = Value::String("[redacted]".into());
        }
    }
    Value::Object(arguments)
}
