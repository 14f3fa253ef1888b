//! CLI commands.

pub mod mcp;
pub mod sessions;
