//! Kimi CLI - session management and MCP configuration for the Kimi agent.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod relative_time;

#[derive(Parser)]
#[command(name = "kimi")]
#[command(about = "Kimi, your next CLI agent", long_about = None)]
#[command(version)]
struct Cli {
    /// Working directory for the agent (defaults to the current directory)
    #[arg(short = 'w', long, global = true)]
    work_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new session for the working directory
    New {
        /// Enable thinking mode if supported (persisted as the default)
        #[arg(long)]
        thinking: Option<bool>,
    },
    /// Continue the previous session for the working directory
    Continue,
    /// List sessions for the working directory, most recent first
    Sessions,
    /// Show a session by id
    Show {
        /// Session id
        id: String,
    },
    /// Manage MCP server configurations in ~/.kimi/mcp.json
    Mcp {
        #[command(subcommand)]
        command: McpCommands,
    },
}

#[derive(Subcommand)]
enum McpCommands {
    /// Add an MCP server
    Add {
        /// Name of the MCP server to add
        name: String,
        /// Command to run the MCP server (for stdio transport)
        #[arg(short, long)]
        command: Option<String>,
        /// URL of the MCP server (for http/sse transport)
        #[arg(short, long)]
        url: Option<String>,
        /// Transport type: sse, http, or stdio (default: auto-detect)
        #[arg(short, long)]
        transport: Option<String>,
        /// Authentication type (e.g. 'oauth')
        #[arg(long)]
        auth: Option<String>,
        /// Arguments for the command (repeatable)
        #[arg(short = 'a', long = "arg")]
        args: Vec<String>,
        /// Environment variables in KEY=VALUE format (repeatable)
        #[arg(short = 'e', long = "env")]
        env: Vec<String>,
    },
    /// Remove an MCP server
    Remove {
        /// Name of the MCP server to remove
        name: String,
    },
    /// List all configured MCP servers
    List,
}

fn main() -> Result<()> {
    // Initialize tracing subscriber
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let work_dir = match cli.work_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::New { thinking } => commands::sessions::new(&work_dir, thinking),
        Commands::Continue => commands::sessions::continue_previous(&work_dir),
        Commands::Sessions => commands::sessions::list(&work_dir),
        Commands::Show { id } => commands::sessions::show(&work_dir, &id),
        Commands::Mcp { command } => match command {
            McpCommands::Add {
                name,
                command,
                url,
                transport,
                auth,
                args,
                env,
            } => commands::mcp::add(commands::mcp::AddArgs {
                name,
                command,
                url,
                transport,
                auth,
                args,
                env,
            }),
            McpCommands::Remove { name } => commands::mcp::remove(&name),
            McpCommands::List => commands::mcp::list(),
        },
    }
}
