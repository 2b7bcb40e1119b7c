use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Args, Parser, Subcommand};
use rmcp::model::InitializeResult;
use serde_json::Value;
use texterify_mcp_test_client::{ClientEvent, StdIoConfig, TestClient, result_text};
use tokio::signal;
use tracing::subscriber;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about = "Utility MCP client for testing texterify-mcp")]
struct Cli {
    /// Sets the log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lists tools exposed by the server.
    ListTools {
        #[command(flatten)]
        server: ServerArgs,

        /// Print tools as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Invokes a tool once with optional JSON arguments.
    CallTool {
        #[command(flatten)]
        server: ServerArgs,

        /// Tool name.
        #[arg(long)]
        name: String,

        /// JSON object passed as tool arguments (`@file.json` reads it from a file).
        #[arg(long = "args-json")]
        args_json: Option<String>,

        /// Print the full result as JSON instead of its text content.
        #[arg(long)]
        raw: bool,
    },
    /// Streams MCP events until interrupted.
    Watch {
        #[command(flatten)]
        server: ServerArgs,

        /// Output events as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Shows handshake information and exits.
    Info {
        #[command(flatten)]
        server: ServerArgs,

        /// Output in JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Clone)]
struct ServerArgs {
    /// Server command to spawn (defaults to `texterify-mcp`).
    #[arg(long = "cmd", default_value = "texterify-mcp")]
    command: PathBuf,

    /// Arguments forwarded to the command (defaults to `serve` when omitted).
    #[arg(long = "arg", value_name = "ARG", action = ArgAction::Append)]
    args: Vec<String>,

    /// Environment variables in KEY=VALUE form.
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    env: Vec<KeyVal>,
}

#[derive(Debug, Clone)]
struct KeyVal {
    key: String,
    value: String,
}

fn parse_key_val(input: &str) -> std::result::Result<KeyVal, String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE pair: {input}"))?;
    if key.trim().is_empty() {
        return Err("environment key cannot be empty".into());
    }
    Ok(KeyVal { key: key.trim().to_string(), value: value.to_string() })
}

impl ServerArgs {
    async fn connect(self) -> Result<TestClient> {
        let command =
            resolve_command(self.command).context("failed to locate texterify-mcp binary")?;
        let args = if self.args.is_empty() { vec!["serve".to_string()] } else { self.args };
        let env = self.env.into_iter().map(|kv| (kv.key, kv.value)).collect();
        TestClient::connect_stdio(StdIoConfig::new(command).with_args(args).with_env(env)).await
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Command::ListTools { server, json } => {
            let client = server.connect().await?;
            if let Some(info) = client.initialize_result() {
                print_info(&info, json)?;
            }
            let tools = client.list_all_tools().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tools)?);
            } else if tools.is_empty() {
                println!("No tools returned by server.");
            } else {
                println!("Tools ({}):", tools.len());
                for tool in tools {
                    let description = tool
                        .description
                        .as_ref()
                        .map(|d| d.trim())
                        .filter(|d| !d.is_empty())
                        .unwrap_or("-");
                    println!("  - {} :: {}", tool.name, description);
                }
            }
            client.shutdown().await?;
        }
        Command::CallTool { server, name, args_json, raw } => {
            let client = server.connect().await?;
            let arguments = args_json.as_deref().map(parse_json_arg).transpose()?;
            let result = client.call_tool(name, arguments).await?;
            if raw {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                if result.is_error.unwrap_or(false) {
                    eprintln!("tool reported an error:");
                }
                println!("{}", result_text(&result));
            }
            client.shutdown().await?;
        }
        Command::Watch { server, json } => {
            let client = server.connect().await?;
            let mut receiver = client.subscribe();
            if let Some(info) = client.initialize_result() {
                print_info(&info, json)?;
            }
            info!("watching events; press Ctrl+C to exit");

            loop {
                tokio::select! {
                    res = receiver.recv() => match res {
                        Ok(event) => print_event(&event, json)?,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            eprintln!("skipped {skipped} events (channel lag)");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                            println!("event stream closed");
                            break;
                        }
                    },
                    _ = signal::ctrl_c() => {
                        println!("received Ctrl+C, stopping watch");
                        break;
                    }
                }
            }
            client.shutdown().await?;
        }
        Command::Info { server, json } => {
            let client = server.connect().await?;
            if let Some(info) = client.initialize_result() {
                print_info(&info, json)?;
            } else {
                error!("server did not provide initialize result");
            }
            client.shutdown().await?;
        }
    }

    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    let _ = subscriber::set_global_default(subscriber);
}

fn print_event(event: &ClientEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(event)?);
    } else {
        println!("{event:#?}");
    }
    Ok(())
}

fn print_info(info: &InitializeResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(info)?);
    } else {
        println!(
            "Connected: {} v{} ({})",
            info.server_info.name,
            info.server_info.version.as_str(),
            info.instructions.as_deref().unwrap_or("no instructions")
        );
    }
    Ok(())
}

fn parse_json_arg(raw: &str) -> Result<Value> {
    if let Some(path) = raw.strip_prefix('@') {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
        serde_json::from_str(&content).with_context(|| format!("invalid JSON in file {path}"))
    } else {
        serde_json::from_str(raw).context("invalid JSON argument")
    }
}

fn resolve_command(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() || path.exists() {
        return Ok(path);
    }

    if let Some(value) = std::env::var_os("CARGO_BIN_EXE_texterify-mcp") {
        let candidate = PathBuf::from(value);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    if let Some(path_env) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&path_env) {
            let candidate = dir.join(&path);
            if candidate.exists() {
                return Ok(candidate);
            }
        }
    }

    Err(anyhow!("command '{}' not found in PATH; specify with --cmd", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_val_pairs_split_on_first_equals() {
        let kv = parse_key_val(" RUST_LOG =debug=1").unwrap();
        assert_eq!(kv.key, "RUST_LOG");
        assert_eq!(kv.value, "debug=1");
        assert!(parse_key_val("NO_SEPARATOR").is_err());
        assert!(parse_key_val("=value").is_err());
    }

    #[test]
    fn json_arguments_are_read_inline_or_from_file() {
        assert_eq!(parse_json_arg(r#"{"per_page": 5}"#).unwrap()["per_page"], 5);
        assert!(parse_json_arg("{not json").is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("args.json");
        std::fs::write(&path, r#"{"key_id": "k1"}"#).unwrap();
        let value = parse_json_arg(&format!("@{}", path.display())).unwrap();
        assert_eq!(value["key_id"], "k1");
    }

    #[test]
    fn absolute_commands_are_used_as_given() {
        let path = PathBuf::from("/opt/texterify/bin/texterify-mcp");
        assert_eq!(resolve_command(path.clone()).unwrap(), path);
    }
}
