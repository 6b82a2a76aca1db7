//! History and likes command handlers

use anyhow::{anyhow, Context, Result};

use tonesmith_core::Store;

use crate::commands::{resolve_project, resolve_session_id, select_version};
use crate::output::Output;

/// List the sessions of a project
pub fn list(store: &Store, project: Option<String>, output: &Output) -> Result<()> {
    let project = resolve_project(store, project)?;
    output.print_sessions(&project, &store.list_sessions(&project));
    Ok(())
}

/// Show every version in one session
pub fn show(
    store: &Store,
    project: Option<String>,
    session: String,
    output: &Output,
) -> Result<()> {
    let project = resolve_project(store, project)?;
    let session_id = resolve_session_id(store, &project, &session)?;
    let session = store
        .session(&project, &session_id)
        .ok_or_else(|| anyhow!("Session not found: {}", session_id))?;
    output.print_session(&session);
    Ok(())
}

/// Like a version of a session (the latest by default)
///
/// The liked copy is added to the project's likes; the history entry
/// itself is left as it was.
pub fn like(
    store: &Store,
    project: Option<String>,
    session: String,
    version: Option<usize>,
    output: &Output,
) -> Result<()> {
    let project = resolve_project(store, project)?;
    let session_id = resolve_session_id(store, &project, &session)?;
    let session = store
        .session(&project, &session_id)
        .ok_or_else(|| anyhow!("Session not found: {}", session_id))?;

    let (number, item) = select_version(&session, version)?;

    store
        .like_item(&project, &item.as_liked())
        .context("Failed to save like")?;

    output.success(&format!("Liked v{} of session {}", number, session_id));
    Ok(())
}

/// List liked items of a project
pub fn likes(store: &Store, project: Option<String>, output: &Output) -> Result<()> {
    let project = resolve_project(store, project)?;
    output.print_likes(&project, &store.list_likes(&project));
    Ok(())
}
