//! Share directory layout and work directory keys.
//!
//! All durable state lives under a per-user share directory (`~/.kimi`):
//!
//! ```text
//! ~/.kimi/sessions/<work_dir_key>/<session_id>/context.jsonl
//! ~/.kimi/sessions/<work_dir_key>/<session_id>/wire.jsonl
//! ~/.kimi/metadata.json
//! ~/.kimi/mcp.json
//! ```

use crate::error::{KimiError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the share directory under the user's home directory.
pub const SHARE_DIR_NAME: &str = ".kimi";

/// Subdirectory of the share directory holding all session state.
pub const SESSIONS_DIR: &str = "sessions";

/// Number of hex characters in a work directory key (128 bits of BLAKE3).
const WORK_DIR_KEY_LEN: usize = 32;

/// Returns the per-user share directory, creating it if needed.
///
/// # Errors
///
/// Returns `HomeDirNotFound` if the home directory cannot be determined.
pub fn share_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(KimiError::HomeDirNotFound)?;
    let share = home.join(SHARE_DIR_NAME);
    fs::create_dir_all(&share).map_err(|e| KimiError::io(&share, e))?;
    Ok(share)
}

/// Computes the stable key for a working directory.
///
/// The key is a truncated BLAKE3 hash of the canonicalized path, so two
/// processes (or two runs on different days) independently compute the same
/// key for the same directory without coordination. Hashing tolerates path
/// spellings that canonicalize to the same location.
pub fn work_dir_key(work_dir: &Path) -> String {
    let canonical = canonicalize_work_dir(work_dir);
    let hash = blake3::hash(canonical.to_string_lossy().as_bytes());
    hex::encode(&hash.as_bytes()[..WORK_DIR_KEY_LEN / 2])
}

/// Canonicalizes a working directory path.
///
/// Falls back to the path as given if it cannot be resolved (e.g. it was
/// deleted since the session was created); the key stays deterministic
/// either way.
pub fn canonicalize_work_dir(work_dir: &Path) -> PathBuf {
    fs::canonicalize(work_dir).unwrap_or_else(|_| work_dir.to_path_buf())
}

/// Returns the sessions namespace for a working directory under a share root.
pub fn sessions_root(share_dir: &Path, work_dir: &Path) -> PathBuf {
    share_dir.join(SESSIONS_DIR).join(work_dir_key(work_dir))
}

/// Writes a document atomically: temp file in the same directory, fsync,
/// then rename over the destination. A crash or concurrent reader never
/// observes a partially written document.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    use std::fs::File;
    use std::io::Write;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| KimiError::io(parent, e))?;
    }

    let tmp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp_path).map_err(|e| KimiError::io(&tmp_path, e))?;
        file.write_all(content)
            .map_err(|e| KimiError::io(&tmp_path, e))?;
        file.sync_all().map_err(|e| KimiError::io(&tmp_path, e))?;
    }

    fs::rename(&tmp_path, path).map_err(|e| KimiError::io(path, e))?;

    // fsync parent directory (Unix-specific for crash safety)
    #[cfg(unix)]
    {
        if let Some(parent) = path.parent() {
            if let Ok(dir_file) = File::open(parent) {
                let _ = dir_file.sync_all();
            }
        }
    }

    Ok(())
}
