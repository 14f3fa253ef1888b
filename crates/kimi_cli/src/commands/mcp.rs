//! MCP server configuration commands.

use anyhow::{bail, Result};
use kimi_core::{share_dir, McpConfigStore, McpServerConfig};
use std::collections::BTreeMap;

pub struct AddArgs {
    pub name: String,
    pub command: Option<String>,
    pub url: Option<String>,
    pub transport: Option<String>,
    pub auth: Option<String>,
    pub args: Vec<String>,
    pub env: Vec<String>,
}

pub fn add(args: AddArgs) -> Result<()> {
    if args.command.is_none() && args.url.is_none() {
        bail!("Either --command or --url must be provided.");
    }
    if args.command.is_some() && args.url.is_some() {
        bail!("Cannot specify both --command and --url.");
    }

    let mut server = McpServerConfig::default();
    if let Some(command) = args.command {
        server.command = Some(command);
        server.args = args.args;
    } else {
        server.url = args.url;
        server.transport = args.transport;
        server.auth = args.auth;
        if !args.args.is_empty() {
            eprintln!("Warning: --arg is ignored for URL-based servers.");
        }
    }
    server.env = parse_env(&args.env)?;

    let store = McpConfigStore::new(share_dir()?);
    let mut config = store.load()?;
    let action = if config.mcp_servers.contains_key(&args.name) {
        "Updated"
    } else {
        "Added"
    };
    config.mcp_servers.insert(args.name.clone(), server);
    store.save(&config)?;

    println!(
        "{action} MCP server '{}' in {}",
        args.name,
        store.path().display()
    );
    Ok(())
}

pub fn remove(name: &str) -> Result<()> {
    let store = McpConfigStore::new(share_dir()?);
    let mut config = store.load()?;

    if config.mcp_servers.remove(name).is_none() {
        bail!("MCP server '{name}' not found.");
    }
    store.save(&config)?;

    println!("Removed MCP server '{name}' from {}", store.path().display());
    Ok(())
}

pub fn list() -> Result<()> {
    let store = McpConfigStore::new(share_dir()?);
    let config = store.load()?;

    if config.mcp_servers.is_empty() {
        println!("No MCP servers configured.");
        return Ok(());
    }

    for (name, server) in &config.mcp_servers {
        let line = if let Some(command) = &server.command {
            format!("{name}: {command} {}", server.args.join(" "))
                .trim_end()
                .to_string()
        } else if let Some(url) = &server.url {
            match &server.auth {
                Some(auth) => format!("{name}: {url} (auth: {auth})"),
                None => format!("{name}: {url}"),
            }
        } else {
            format!("{name}: (unknown config)")
        };
        println!("  {line}");
    }
    Ok(())
}

/// Parses KEY=VALUE pairs into an environment map.
fn parse_env(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut env = BTreeMap::new();
    for item in pairs {
        let Some((key, value)) = item.split_once('=') else {
            bail!("Invalid env format: {item} (expected KEY=VALUE)");
        };
        if key.is_empty() {
            bail!("Invalid env format: {item} (empty key)");
        }
        env.insert(key.to_string(), value.to_string());
    }
    Ok(env)
}
