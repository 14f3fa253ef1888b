//! MCP server configuration document.
//!
//! A single JSON document (`~/.kimi/mcp.json`) holding named MCP server
//! entries, in the conventional `{"mcpServers": {...}}` shape so configs can
//! be shared with other MCP-aware tools.

use crate::error::{KimiError, Result};
use crate::share::write_atomic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File name of the MCP config document inside the share directory.
pub const MCP_CONFIG_FILE: &str = "mcp.json";

/// The MCP server configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpConfig {
    /// Named server entries, sorted for stable output.
    #[serde(default, rename = "mcpServers")]
    pub mcp_servers: BTreeMap<String, McpServerConfig>,
}

/// Configuration for one MCP server.
///
/// Either `command` (stdio transport) or `url` (http/sse transport) is set,
/// never both; the CLI enforces this on add.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpServerConfig {
    /// Command to run the server, for stdio transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Arguments for the command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// URL of the server, for http/sse transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Transport type override (sse, http, or stdio).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,

    /// Authentication type (e.g. "oauth").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,

    /// Environment variables for the server process.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

/// Loader and saver for the MCP config document.
pub struct McpConfigStore {
    path: PathBuf,
}

impl McpConfigStore {
    /// Creates a store for the MCP config document under `share_dir`.
    pub fn new(share_dir: impl AsRef<Path>) -> Self {
        Self {
            path: share_dir.as_ref().join(MCP_CONFIG_FILE),
        }
    }

    /// Returns the config document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the MCP config document.
    ///
    /// An absent file yields the default document; so does an unparsable one,
    /// with a warning. Same fallback policy as the metadata store.
    pub fn load(&self) -> Result<McpConfig> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(McpConfig::default()),
            Err(e) => return Err(KimiError::io(&self.path, e)),
        };

        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "MCP config is unparsable, falling back to defaults"
                );
                Ok(McpConfig::default())
            }
        }
    }

    /// Saves the full MCP config document atomically.
    pub fn save(&self, config: &McpConfig) -> Result<()> {
        let content = serde_json::to_string_pretty(config)
            .map_err(|e| KimiError::Serialization(format!("failed to encode MCP config: {e}")))?;
        write_atomic(&self.path, content.as_bytes())
    }
}
