//! Kimi Core Library
//!
//! Durable session and journal persistence for the Kimi CLI agent:
//! - Per-working-directory session storage with crash-safe journals
//! - Title derivation from conversation content
//! - Cross-session metadata ("continue previous session")
//! - MCP server configuration
//!
//! # Quick Start
//!
//! ```
//! use kimi_core::SessionStore;
//! use tempfile::TempDir;
//!
//! let share = TempDir::new().unwrap();
//! let work = TempDir::new().unwrap();
//! let store = SessionStore::new(share.path());
//!
//! // Create a session for a working directory
//! let session = store.create(work.path()).unwrap();
//! assert!(session.title.starts_with("Untitled ("));
//!
//! // It shows up in the listing
//! let sessions = store.list(work.path()).unwrap();
//! assert_eq!(sessions[0].id, session.id);
//! ```
//!
//! # Storage layout
//!
//! All state lives under a per-user share directory (`~/.kimi` by default):
//! one directory per session, keyed by a BLAKE3 hash of the working
//! directory, plus a single metadata document updated with atomic renames.
//! Journals are append-only JSONL; a torn trailing line from a crash
//! mid-append is dropped on the next read, never treated as corruption.

mod error;
mod journal;
mod mcp;
mod metadata;
mod session;
mod share;
mod title;

pub use error::{KimiError, Result};
pub use journal::{ContentPart, JournalIter, JournalLog, JournalRecord, WireMessage, JOURNAL_FILE};
pub use mcp::{McpConfig, McpConfigStore, McpServerConfig, MCP_CONFIG_FILE};
pub use metadata::{Metadata, MetadataStore, WorkDirMeta, METADATA_FILE};
pub use session::{Session, SessionStore, CONTEXT_FILE};
pub use share::{
    canonicalize_work_dir, sessions_root, share_dir, work_dir_key, SESSIONS_DIR, SHARE_DIR_NAME,
};
pub use title::{derive_title, fallback_title, MAX_TITLE_LEN};
