//! Session management commands.

use crate::relative_time::format_relative_time;
use anyhow::Result;
use console::style;
use kimi_core::{KimiError, MetadataStore, SessionStore};
use std::path::Path;
use tracing::info;

pub fn new(work_dir: &Path, thinking: Option<bool>) -> Result<()> {
    let store = SessionStore::open_default()?;
    let session = store.create(work_dir)?;
    info!(session_id = %session.id, "created new session");

    mark_current(&store, work_dir, &session.id, thinking)?;

    println!("Created session: {}", session.id);
    println!("  Title: {}", session.title);
    println!("  Context file: {}", session.context_file.display());
    Ok(())
}

pub fn continue_previous(work_dir: &Path) -> Result<()> {
    let store = SessionStore::open_default()?;

    let Some(session) = store.continue_previous(work_dir)? else {
        return Err(anyhow::anyhow!(
            "No previous session found for the working directory"
        ));
    };

    info!(session_id = %session.id, "continuing previous session");
    println!("Continuing session: {}", session.id);
    println!("  Title: {}", session.title);
    println!("  Context file: {}", session.context_file.display());
    Ok(())
}

pub fn list(work_dir: &Path) -> Result<()> {
    let store = SessionStore::open_default()?;
    let sessions = store.list(work_dir)?;

    if sessions.is_empty() {
        println!("No sessions for this working directory.");
        return Ok(());
    }

    for session in sessions {
        let short_id: String = session.id.chars().take(8).collect();
        println!(
            "{}  {:<53}  {}",
            style(short_id).dim(),
            session.title,
            style(format_relative_time(session.updated_at)).dim()
        );
    }
    Ok(())
}

pub fn show(work_dir: &Path, id: &str) -> Result<()> {
    let store = SessionStore::open_default()?;

    let session = match store.find(work_dir, id) {
        Ok(session) => session,
        Err(KimiError::SessionNotFound { .. }) => {
            return Err(anyhow::anyhow!("Session '{id}' not found"));
        }
        Err(e) => return Err(e.into()),
    };

    println!("Session: {}", session.id);
    println!("  Title: {}", session.title);
    println!("  Work dir: {}", session.work_dir.display());
    println!("  Updated: {}", format_relative_time(session.updated_at));
    println!("  Context file: {}", session.context_file.display());
    Ok(())
}

/// Records the session as the work dir's current one and persists the
/// thinking preference when given. Last-writer-wins by design.
fn mark_current(
    store: &SessionStore,
    work_dir: &Path,
    session_id: &str,
    thinking: Option<bool>,
) -> Result<()> {
    let metadata_store = MetadataStore::new(store.share_dir());
    let mut metadata = metadata_store.load()?;

    metadata.new_work_dir_meta(work_dir).last_session_id = Some(session_id.to_string());
    if let Some(thinking) = thinking {
        metadata.thinking = thinking;
    }

    metadata_store.save(&metadata)?;
    Ok(())
}
