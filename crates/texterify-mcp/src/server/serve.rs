//! `serve` command: MCP over stdio.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use rmcp::ServiceExt;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

use super::{audit::AuditLog, host::TexterifyServer};
use crate::{
    config::{Config, ConfigOverrides},
    tools::ToolSet,
};

#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Default project for tool calls that do not pass `project_id`.
    #[arg(long, global = true, value_name = "ID")]
    pub project_id: Option<String>,
    /// Texterify API base URL (without the version segment).
    #[arg(long, global = true, value_name = "URL")]
    pub api_base_url: Option<String>,
    /// Also write JSON logs to an hourly rotated file in this directory.
    #[arg(long, global = true, value_name = "DIR", env = "TEXTERIFY_MCP_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
    /// Append one JSON line per tool call request and response to this file.
    #[arg(long, global = true, value_name = "FILE", env = "TEXTERIFY_MCP_AUDIT_LOG")]
    pub audit_log: Option<PathBuf>,
}

impl ServeArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides { project_id: self.project_id.clone(), api_base_url: self.api_base_url.clone() }
    }
}

pub async fn run(args: ServeArgs, config_file: Option<&Path>) -> Result<()> {
    let _tracing_guard = init_tracing(args.log_dir.as_deref())?;

    if let Err(err) = run_impl(&args, config_file).await {
        error!(error = ?err, "server terminated with error");
        return Err(err);
    }
    info!("server exited cleanly");
    Ok(())
}

async fn run_impl(args: &ServeArgs, config_file: Option<&Path>) -> Result<()> {
    let config = Config::load(config_file, args.overrides()).context("invalid configuration")?;
    info!(
        api_base_url = %config.api_base_url,
        api_version = %config.api_version,
        default_project = config.project_id.as_deref().unwrap_or("<none>"),
        "configuration loaded"
    );

    let tools = ToolSet::new(&config).context("failed to initialise Texterify client")?;
    let audit = match &args.audit_log {
        Some(path) => Some(AuditLog::open(path.clone()).await?),
        None => None,
    };

    let service = TexterifyServer::new(tools, audit)
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to start MCP session on stdio")?;
    info!("MCP session established on stdio");

    let cancel = service.cancellation_token();
    let ctrl_c = tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                cancel.cancel();
            }
            Err(err) => warn!(error = ?err, "failed to listen for Ctrl+C"),
        }
    });

    let quit = service.waiting().await;
    ctrl_c.abort();
    let reason = quit.context("MCP session ended abnormally")?;
    info!(?reason, "MCP session closed");
    Ok(())
}

/// Stderr logging, plus an hourly JSON file when `log_dir` is given. Stdout carries the protocol.
fn init_tracing(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let file_appender = rolling::hourly(dir, "texterify-mcp.log");
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_writer(file_writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to initialise tracing")?;

    Ok(guard)
}
