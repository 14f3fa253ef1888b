//! Append-only, per-session journal of turn events.
//!
//! The journal is a newline-delimited JSON file (`wire.jsonl`) owned by this
//! crate. Records are ordered by write sequence; timestamps are wall-clock
//! and only meant for display, never for replay ordering.

use crate::error::{KimiError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// File name of the journal inside a session directory.
pub const JOURNAL_FILE: &str = "wire.jsonl";

/// One entry in a session's journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRecord {
    /// Wall-clock time of the event as epoch seconds.
    pub timestamp: f64,
    /// The event payload produced by the orchestration layer.
    pub message: WireMessage,
}

impl JournalRecord {
    /// Creates a record stamped with the current wall-clock time.
    pub fn now(message: WireMessage) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        Self { timestamp, message }
    }
}

/// A journaled wire message, keyed by its `type` discriminator.
///
/// Only the "turn begins with user input" shape is interpreted (for title
/// derivation); every other message type round-trips through the `Other`
/// variant untouched, so records written by a newer version never fail the
/// scan for an older reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireMessage {
    /// A turn begins with the user's input.
    TurnBegin {
        /// Content parts composing the user input.
        user_input: Vec<ContentPart>,
    },
    /// Any message type this version does not interpret.
    #[serde(untagged)]
    Other(Value),
}

/// One part of a user input, keyed by its `type` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
    /// Any part type this version does not interpret.
    #[serde(untagged)]
    Other(Value),
}

/// Append-only log of [`JournalRecord`]s for one session.
pub struct JournalLog {
    path: PathBuf,
}

impl JournalLog {
    /// Creates a handle for the journal inside `session_dir`.
    ///
    /// The file itself is created lazily on first append; an absent journal
    /// is a valid empty one.
    pub fn new(session_dir: impl AsRef<Path>) -> Self {
        Self {
            path: session_dir.as_ref().join(JOURNAL_FILE),
        }
    }

    /// Returns the journal file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record as a single self-contained JSON line.
    ///
    /// Never rewrites or truncates existing content. The write is synced so
    /// the line is durable once this returns.
    pub fn append(&self, record: &JournalRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| KimiError::Serialization(format!("failed to encode journal record: {e}")))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| KimiError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| KimiError::io(&self.path, e))?;
        file.sync_data().map_err(|e| KimiError::io(&self.path, e))?;
        Ok(())
    }

    /// Returns a lazy iterator over all records, in write order.
    ///
    /// Each call starts a fresh scan from the beginning of the file. A
    /// missing journal yields an empty iterator. A torn trailing line (crash
    /// mid-append) is dropped silently; a malformed non-trailing line is
    /// skipped with a warning.
    pub fn read_all(&self) -> Result<JournalIter> {
        let reader = match File::open(&self.path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(KimiError::io(&self.path, e)),
        };

        Ok(JournalIter {
            reader,
            path: self.path.clone(),
            line_number: 0,
            buf: String::new(),
        })
    }
}

/// Iterator over journal records. See [`JournalLog::read_all`].
pub struct JournalIter {
    reader: Option<BufReader<File>>,
    path: PathBuf,
    line_number: usize,
    buf: String,
}

impl Iterator for JournalIter {
    type Item = JournalRecord;

    fn next(&mut self) -> Option<JournalRecord> {
        loop {
            let reader = self.reader.as_mut()?;
            self.buf.clear();

            let bytes = match reader.read_line(&mut self.buf) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        line = self.line_number + 1,
                        error = %e,
                        "I/O error while scanning journal, stopping"
                    );
                    self.reader = None;
                    return None;
                }
            };
            if bytes == 0 {
                self.reader = None;
                return None;
            }

            self.line_number += 1;
            let terminated = self.buf.ends_with('\n');
            let line = self.buf.trim_end();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<JournalRecord>(line) {
                Ok(record) => return Some(record),
                Err(e) if terminated => {
                    warn!(
                        path = %self.path.display(),
                        line = self.line_number,
                        error = %e,
                        "skipping malformed journal line"
                    );
                }
                Err(_) => {
                    // Unterminated and unparsable: a torn trailing line left
                    // behind by a crash mid-append. Expected, not corruption.
                    self.reader = None;
                    return None;
                }
            }
        }
    }
}
