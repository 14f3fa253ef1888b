//! End-to-end tests for session persistence against a real share directory.

use kimi_core::{
    ContentPart, JournalLog, JournalRecord, MetadataStore, SessionStore, WireMessage,
};
use std::fs::{self, File};
use std::path::Path;
use std::thread;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn write_wire_turn(session_dir: &Path, text: &str) {
    JournalLog::new(session_dir)
        .append(&JournalRecord::now(WireMessage::TurnBegin {
            user_input: vec![ContentPart::Text {
                text: text.to_string(),
            }],
        }))
        .unwrap();
}

fn set_mtime(path: &Path, time: SystemTime) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(time).unwrap();
}

#[test]
fn create_sets_fallback_title_and_content_file() {
    let share = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let store = SessionStore::new(share.path());

    let session = store.create(work.path()).unwrap();

    assert!(session.title.starts_with("Untitled ("));
    assert!(session.context_file.exists());
    assert!(session.dir.is_dir());
}

#[test]
fn find_uses_wire_title() {
    let share = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let store = SessionStore::new(share.path());

    let session = store.create(work.path()).unwrap();
    write_wire_turn(&session.dir, "hello world from wire file");

    let found = store.find(work.path(), &session.id).unwrap();
    assert!(found.title.starts_with("hello world from wire file"));
}

#[test]
fn list_sorts_by_updated_descending() {
    let share = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let store = SessionStore::new(share.path());

    let first = store.create(work.path()).unwrap();
    let second = store.create(work.path()).unwrap();

    write_wire_turn(&first.dir, "old session title");
    write_wire_turn(&second.dir, "new session title that is slightly longer");

    let now = SystemTime::now();
    set_mtime(&first.context_file, now - Duration::from_secs(10));
    set_mtime(&second.context_file, now);

    let sessions = store.list(work.path()).unwrap();
    let ids: Vec<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    assert!(sessions[0].title.starts_with("new session title"));
    assert!(sessions[1].title.starts_with("old session title"));
}

#[test]
fn list_without_sessions_is_empty() {
    let share = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let store = SessionStore::new(share.path());

    assert!(store.list(work.path()).unwrap().is_empty());
}

#[test]
fn list_is_idempotent() {
    let share = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let store = SessionStore::new(share.path());

    let a = store.create(work.path()).unwrap();
    let b = store.create(work.path()).unwrap();
    write_wire_turn(&a.dir, "session a");
    write_wire_turn(&b.dir, "session b");

    let once: Vec<(String, String)> = store
        .list(work.path())
        .unwrap()
        .into_iter()
        .map(|s| (s.id, s.title))
        .collect();
    let twice: Vec<(String, String)> = store
        .list(work.path())
        .unwrap()
        .into_iter()
        .map(|s| (s.id, s.title))
        .collect();

    assert_eq!(once, twice);
    assert_eq!(once.len(), 2);
}

#[test]
fn list_skips_sessions_missing_content_file() {
    let share = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let store = SessionStore::new(share.path());

    let keep = store.create(work.path()).unwrap();
    let broken = store.create(work.path()).unwrap();
    fs::remove_file(&broken.context_file).unwrap();

    let sessions = store.list(work.path()).unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, keep.id);
}

#[test]
fn continue_without_last_returns_none() {
    let share = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let store = SessionStore::new(share.path());

    assert!(store.continue_previous(work.path()).unwrap().is_none());
}

#[test]
fn continue_resumes_recorded_session() {
    let share = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let store = SessionStore::new(share.path());
    let metadata_store = MetadataStore::new(share.path());

    let session = store.create(work.path()).unwrap();
    let mut metadata = metadata_store.load().unwrap();
    metadata.new_work_dir_meta(work.path()).last_session_id = Some(session.id.clone());
    metadata_store.save(&metadata).unwrap();

    let resumed = store.continue_previous(work.path()).unwrap().unwrap();
    assert_eq!(resumed.id, session.id);
}

#[test]
fn continue_with_dangling_pointer_returns_none() {
    let share = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let store = SessionStore::new(share.path());
    let metadata_store = MetadataStore::new(share.path());

    let mut metadata = metadata_store.load().unwrap();
    metadata.new_work_dir_meta(work.path()).last_session_id =
        Some("deleted-session-id".to_string());
    metadata_store.save(&metadata).unwrap();

    assert!(store.continue_previous(work.path()).unwrap().is_none());
}

#[test]
fn concurrent_creates_yield_distinct_sessions() {
    let share = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let share_path = share.path().to_path_buf();
        let work_path = work.path().to_path_buf();
        handles.push(thread::spawn(move || {
            SessionStore::new(share_path).create(&work_path).unwrap()
        }));
    }
    let sessions: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_ne!(sessions[0].id, sessions[1].id);
    let store = SessionStore::new(share.path());
    for session in &sessions {
        let found = store.find(work.path(), &session.id).unwrap();
        assert!(found.context_file.exists());
    }
    assert_eq!(store.list(work.path()).unwrap().len(), 2);
}

#[test]
fn sessions_are_namespaced_per_work_dir() {
    let share = TempDir::new().unwrap();
    let work_a = TempDir::new().unwrap();
    let work_b = TempDir::new().unwrap();
    let store = SessionStore::new(share.path());

    let session = store.create(work_a.path()).unwrap();

    assert!(store.list(work_b.path()).unwrap().is_empty());
    assert!(matches!(
        store.find(work_b.path(), &session.id),
        Err(kimi_core::KimiError::SessionNotFound { .. })
    ));
}

#[test]
fn truncated_journal_still_titles_session() {
    let share = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let store = SessionStore::new(share.path());

    let session = store.create(work.path()).unwrap();
    write_wire_turn(&session.dir, "survives a crash");

    // Crash mid-append: torn trailing line in the journal.
    let journal_path = session.dir.join(kimi_core::JOURNAL_FILE);
    let mut content = fs::read_to_string(&journal_path).unwrap();
    content.push_str("{\"timestamp\": 17000");
    fs::write(&journal_path, content).unwrap();

    let found = store.find(work.path(), &session.id).unwrap();
    assert!(found.title.starts_with("survives a crash"));
}
