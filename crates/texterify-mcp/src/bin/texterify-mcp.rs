use std::{path::PathBuf, process};

use anyhow::Result;
use clap::{Parser, Subcommand};
use texterify_mcp::{
    server::{self, ServeArgs},
    tools::catalogue,
};

#[derive(Parser, Debug)]
#[command(name = "texterify-mcp", version, about = "MCP server for the Texterify translation management API")]
struct Cli {
    /// TOML file with a `[texterify]` table (environment variables override it).
    #[arg(long, global = true, value_name = "FILE", env = "TEXTERIFY_MCP_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve MCP over stdin/stdout (the default).
    Serve,
    /// Print the tool catalogue and exit.
    Tools {
        /// Print the full tool definitions as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => server::run(cli.serve, cli.config.as_deref()).await,
        Command::Tools { json } => print_tools(json),
    }
}

fn print_tools(json: bool) -> Result<()> {
    let tools = catalogue();
    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }
    println!("Tools ({}):", tools.len());
    for tool in tools {
        let description = tool.description.as_deref().unwrap_or_default();
        println!("  - {} :: {}", tool.name, description);
    }
    Ok(())
}
