//! Title derivation for sessions.
//!
//! A session's title is never persisted; it is recomputed from journal
//! content on each access, with a deterministic fallback for sessions that
//! have no user-authored text yet.

use crate::error::Result;
use crate::journal::{ContentPart, JournalLog, WireMessage};

/// Maximum display length of a derived title, in characters.
pub const MAX_TITLE_LEN: usize = 50;

/// Number of session id characters used in the fallback title.
const FALLBACK_ID_LEN: usize = 8;

/// Derives a human-readable title for a session from its journal.
///
/// Scans for the first turn-begin record carrying non-empty user text and
/// uses its first line, truncated to [`MAX_TITLE_LEN`]. Falls back to
/// [`fallback_title`] when no such record exists. Never mutates the journal.
pub fn derive_title(journal: &JournalLog, session_id: &str) -> Result<String> {
    for record in journal.read_all()? {
        let WireMessage::TurnBegin { user_input } = record.message else {
            continue;
        };
        for part in user_input {
            let ContentPart::Text { text } = part else {
                continue;
            };
            let first_line = text.lines().next().unwrap_or("").trim();
            if !first_line.is_empty() {
                return Ok(truncate_title(first_line));
            }
        }
    }

    Ok(fallback_title(session_id))
}

/// Returns the deterministic fallback title for a session without user text.
pub fn fallback_title(session_id: &str) -> String {
    let short: String = session_id.chars().take(FALLBACK_ID_LEN).collect();
    format!("Untitled ({short})")
}

/// Truncates a title to [`MAX_TITLE_LEN`] characters with an ellipsis marker.
fn truncate_title(text: &str) -> String {
    if text.chars().count() <= MAX_TITLE_LEN {
        return text.to_string();
    }
    let truncated: String = text.chars().take(MAX_TITLE_LEN).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::JournalRecord;
    use serde_json::json;
    use tempfile::TempDir;

    fn append_turn(journal: &JournalLog, text: &str) {
        journal
            .append(&JournalRecord {
                timestamp: 1700000000.0,
                message: WireMessage::TurnBegin {
                    user_input: vec![ContentPart::Text {
                        text: text.to_string(),
                    }],
                },
            })
            .unwrap();
    }

    #[test]
    fn test_title_from_first_user_turn() {
        let tmp = TempDir::new().unwrap();
        let journal = JournalLog::new(tmp.path());
        append_turn(&journal, "fix the flaky test");
        append_turn(&journal, "second turn ignored");

        let title = derive_title(&journal, "abc").unwrap();
        assert_eq!(title, "fix the flaky test");
    }

    #[test]
    fn test_title_uses_first_line_only() {
        let tmp = TempDir::new().unwrap();
        let journal = JournalLog::new(tmp.path());
        append_turn(&journal, "first line\nsecond line");

        assert_eq!(derive_title(&journal, "abc").unwrap(), "first line");
    }

    #[test]
    fn test_long_title_is_truncated_with_ellipsis() {
        let tmp = TempDir::new().unwrap();
        let journal = JournalLog::new(tmp.path());
        let long = "x".repeat(MAX_TITLE_LEN + 20);
        append_turn(&journal, &long);

        let title = derive_title(&journal, "abc").unwrap();
        assert_eq!(title.chars().count(), MAX_TITLE_LEN + 3);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_empty_journal_falls_back() {
        let tmp = TempDir::new().unwrap();
        let journal = JournalLog::new(tmp.path());

        let title = derive_title(&journal, "0123456789abcdef").unwrap();
        assert_eq!(title, "Untitled (01234567)");
    }

    #[test]
    fn test_tool_only_journal_falls_back() {
        let tmp = TempDir::new().unwrap();
        let journal = JournalLog::new(tmp.path());
        journal
            .append(&JournalRecord {
                timestamp: 1700000000.0,
                message: WireMessage::Other(json!({"type": "tool_result", "ok": true})),
            })
            .unwrap();

        assert!(derive_title(&journal, "abc").unwrap().starts_with("Untitled ("));
    }

    #[test]
    fn test_whitespace_only_text_falls_back() {
        let tmp = TempDir::new().unwrap();
        let journal = JournalLog::new(tmp.path());
        append_turn(&journal, "   \n\t");

        assert!(derive_title(&journal, "abc").unwrap().starts_with("Untitled ("));
    }

    #[test]
    fn test_fallback_is_stable() {
        assert_eq!(fallback_title("deadbeef-1"), fallback_title("deadbeef-1"));
    }
}
