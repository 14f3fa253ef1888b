//! Session creation, lookup, listing, and resumption.
//!
//! A session is one durable conversation scoped to a working directory. Its
//! storage location is a pure function of `(work_dir, id)`, so independent
//! processes compute the same paths without coordination.

use crate::error::{KimiError, Result};
use crate::journal::JournalLog;
use crate::metadata::MetadataStore;
use crate::share::{self, canonicalize_work_dir};
use crate::title::{derive_title, fallback_title};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;
use uuid::Uuid;

/// File name of the conversation content log inside a session directory.
///
/// The file is owned and written by the orchestration layer; this crate only
/// creates it empty and reads its modification time.
pub const CONTEXT_FILE: &str = "context.jsonl";

/// Bound on unique-id generation attempts before giving up.
const MAX_ID_ATTEMPTS: u32 = 5;

/// One durable conversation instance scoped to a working directory.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque unique id, stable for the session's lifetime.
    pub id: String,
    /// Canonical working directory the session is scoped to.
    pub work_dir: PathBuf,
    /// Storage directory, derived from `(work_dir, id)`.
    pub dir: PathBuf,
    /// Path of the conversation content log.
    pub context_file: PathBuf,
    /// When the session was created.
    pub created_at: SystemTime,
    /// Last modification time of the content log.
    pub updated_at: SystemTime,
    /// Human-readable title, derived from journal content on each access.
    pub title: String,
}

impl Session {
    /// Returns the journal for this session.
    pub fn journal(&self) -> JournalLog {
        JournalLog::new(&self.dir)
    }
}

/// Creates, locates, enumerates, and resumes sessions under a share root.
pub struct SessionStore {
    share_dir: PathBuf,
}

impl SessionStore {
    /// Creates a store rooted at the given share directory.
    pub fn new(share_dir: impl AsRef<Path>) -> Self {
        Self {
            share_dir: share_dir.as_ref().to_path_buf(),
        }
    }

    /// Creates a store rooted at the default per-user share directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(share::share_dir()?))
    }

    /// Returns the share root this store operates under.
    pub fn share_dir(&self) -> &Path {
        &self.share_dir
    }

    /// Returns the storage directory for `(work_dir, id)`.
    ///
    /// Pure path computation, no I/O.
    pub fn session_dir(&self, work_dir: &Path, id: &str) -> PathBuf {
        share::sessions_root(&self.share_dir, work_dir).join(id)
    }

    /// Creates a new session for a working directory.
    ///
    /// Generates a probabilistically-unique id, retrying on the (vanishing)
    /// chance of a collision with an existing session, creates the session
    /// directory and an empty content log. Safe under concurrent calls from
    /// independent processes: each caller lands in its own directory.
    pub fn create(&self, work_dir: &Path) -> Result<Session> {
        let work_dir = canonicalize_work_dir(work_dir);

        let (id, dir) = self.generate_session_dir(&work_dir)?;
        fs::create_dir_all(&dir).map_err(|e| KimiError::io(&dir, e))?;

        let context_file = dir.join(CONTEXT_FILE);
        File::create(&context_file).map_err(|e| KimiError::io(&context_file, e))?;

        let now = SystemTime::now();
        Ok(Session {
            title: fallback_title(&id),
            id,
            work_dir,
            dir,
            context_file,
            created_at: now,
            updated_at: now,
        })
    }

    /// Finds a session by id under a working directory.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` if the session directory does not exist.
    pub fn find(&self, work_dir: &Path, id: &str) -> Result<Session> {
        let work_dir = canonicalize_work_dir(work_dir);
        let dir = self.session_dir(&work_dir, id);

        if !dir.is_dir() {
            return Err(KimiError::SessionNotFound { id: id.to_string() });
        }

        self.build_session(&work_dir, id, dir)
    }

    /// Lists all sessions for a working directory, most recently updated
    /// first.
    ///
    /// Entries that fail structural validation (e.g. a missing content log)
    /// are skipped rather than aborting the listing. Ties on `updated_at`
    /// break by reverse id order so repeated calls return a stable ordering.
    pub fn list(&self, work_dir: &Path) -> Result<Vec<Session>> {
        let work_dir = canonicalize_work_dir(work_dir);
        let root = share::sessions_root(&self.share_dir, &work_dir);
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut sessions = Vec::new();
        let entries = fs::read_dir(&root).map_err(|e| KimiError::io(&root, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| KimiError::io(&root, e))?;
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let Some(id) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if !dir.join(CONTEXT_FILE).is_file() {
                debug!(dir = %dir.display(), "skipping session without content log");
                continue;
            }

            match self.build_session(&work_dir, id, dir.clone()) {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "skipping unreadable session");
                }
            }
        }

        sessions.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(sessions)
    }

    /// Resumes the last session recorded for a working directory.
    ///
    /// Returns `Ok(None)` when there is nothing to resume: no metadata entry
    /// for the work dir, no last-session pointer, or a pointer to a session
    /// that no longer exists on disk. None of these are errors.
    pub fn continue_previous(&self, work_dir: &Path) -> Result<Option<Session>> {
        let metadata = MetadataStore::new(&self.share_dir).load()?;
        let Some(meta) = metadata.get_work_dir_meta(work_dir) else {
            return Ok(None);
        };
        let Some(last_id) = meta.last_session_id.as_deref() else {
            return Ok(None);
        };

        match self.find(work_dir, last_id) {
            Ok(session) => Ok(Some(session)),
            Err(KimiError::SessionNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Picks an unused session id and its directory, retrying on collision.
    fn generate_session_dir(&self, work_dir: &Path) -> Result<(String, PathBuf)> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = Uuid::new_v4().to_string();
            let dir = self.session_dir(work_dir, &id);
            if !dir.exists() {
                return Ok((id, dir));
            }
        }
        Err(KimiError::SessionIdExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    /// Builds a `Session` from an existing session directory.
    fn build_session(&self, work_dir: &Path, id: &str, dir: PathBuf) -> Result<Session> {
        let context_file = dir.join(CONTEXT_FILE);

        let dir_meta = fs::metadata(&dir).map_err(|e| KimiError::io(&dir, e))?;
        let created_at = dir_meta
            .created()
            .or_else(|_| dir_meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        // updated_at tracks the content log; the directory's own mtime is a
        // fallback for sessions whose log the orchestration layer removed.
        let updated_at = fs::metadata(&context_file)
            .and_then(|m| m.modified())
            .unwrap_or(created_at);

        let title = derive_title(&JournalLog::new(&dir), id)?;

        Ok(Session {
            id: id.to_string(),
            work_dir: work_dir.to_path_buf(),
            dir,
            context_file,
            created_at,
            updated_at,
            title,
        })
    }
}
