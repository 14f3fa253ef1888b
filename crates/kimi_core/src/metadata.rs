//! Cross-session metadata document.
//!
//! A single JSON document (`~/.kimi/metadata.json`) recording the last-used
//! session per working directory plus global preferences. It is loaded fully
//! into memory and written back fully; concurrent writers are last-writer-wins
//! at document granularity, but the atomic-rename save guarantees no reader
//! ever observes a torn document.

use crate::error::{KimiError, Result};
use crate::share::{work_dir_key, write_atomic};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File name of the metadata document inside the share directory.
pub const METADATA_FILE: &str = "metadata.json";

/// The global persisted metadata document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Last-used thinking-mode preference, global across work dirs.
    #[serde(default)]
    pub thinking: bool,

    /// Per-working-directory bookkeeping, keyed by work dir key.
    #[serde(default)]
    pub work_dirs: HashMap<String, WorkDirMeta>,
}

/// Per-working-directory bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkDirMeta {
    /// Last session id marked as current for this working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session_id: Option<String>,
}

impl Metadata {
    /// Looks up the bookkeeping entry for a working directory.
    pub fn get_work_dir_meta(&self, work_dir: &Path) -> Option<&WorkDirMeta> {
        self.work_dirs.get(&work_dir_key(work_dir))
    }

    /// Returns the bookkeeping entry for a working directory, creating a
    /// default one in the in-memory map if absent. No I/O happens here;
    /// call [`MetadataStore::save`] to persist.
    pub fn new_work_dir_meta(&mut self, work_dir: &Path) -> &mut WorkDirMeta {
        self.work_dirs.entry(work_dir_key(work_dir)).or_default()
    }
}

/// Owner of the single metadata document. No other component writes it.
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    /// Creates a store for the metadata document under `share_dir`.
    pub fn new(share_dir: impl AsRef<Path>) -> Self {
        Self {
            path: share_dir.as_ref().join(METADATA_FILE),
        }
    }

    /// Returns the metadata document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the metadata document.
    ///
    /// An absent file yields the default document. An unparsable file is
    /// logged and also yields the default: the document only holds
    /// convenience state, so losing it must never block the CLI. This is the
    /// same policy the MCP config loader uses.
    pub fn load(&self) -> Result<Metadata> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Metadata::default()),
            Err(e) => return Err(KimiError::io(&self.path, e)),
        };

        match serde_json::from_str(&content) {
            Ok(metadata) => Ok(metadata),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "metadata document is unparsable, falling back to defaults"
                );
                Ok(Metadata::default())
            }
        }
    }

    /// Saves the full metadata document atomically.
    ///
    /// Uses temp file + fsync + rename so a crash or concurrent reader never
    /// observes a partially written document.
    pub fn save(&self, metadata: &Metadata) -> Result<()> {
        let content = serde_json::to_string_pretty(metadata)
            .map_err(|e| KimiError::Serialization(format!("failed to encode metadata: {e}")))?;
        write_atomic(&self.path, content.as_bytes())
    }
}
