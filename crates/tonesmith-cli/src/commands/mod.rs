//! Command handlers

use anyhow::{anyhow, bail, Result};

use tonesmith_core::{HistoryItem, Session, Store};

pub mod config;
pub mod generate;
pub mod history;
pub mod project;
pub mod status;
pub mod tone;

/// Use the given project, or fall back to the active one
pub fn resolve_project(store: &Store, project: Option<String>) -> Result<String> {
    if let Some(name) = project {
        return Ok(name);
    }
    match store.get_active_project() {
        Some(name) => Ok(name),
        None => bail!(
            "No active project. Create one with:\n  \
             tonesmith project create <name>"
        ),
    }
}

/// Resolve a session id (supports full id or unique prefix)
pub fn resolve_session_id(store: &Store, project: &str, id: &str) -> Result<String> {
    let sessions = store.list_sessions(project);

    if sessions.iter().any(|s| s.id == id) {
        return Ok(id.to_string());
    }

    let matches: Vec<_> = sessions.iter().filter(|s| s.id.starts_with(id)).collect();

    match matches.len() {
        0 => bail!("No session in '{}' matching: {}", project, id),
        1 => Ok(matches[0].id.clone()),
        _ => {
            eprintln!("Multiple sessions match '{}':", id);
            for session in &matches {
                eprintln!("  {} ({} version(s))", session.id, session.items.len());
            }
            bail!("Ambiguous session ID. Please provide more characters.");
        }
    }
}

/// Pick a 1-based version of a session, defaulting to the latest
///
/// Returns the version number along with the item.
pub fn select_version(
    session: &Session,
    version: Option<usize>,
) -> Result<(usize, &HistoryItem)> {
    match version {
        Some(n) => session.version(n).map(|item| (n, item)).ok_or_else(|| {
            anyhow!(
                "Session {} has {} version(s); v{} does not exist",
                session.id,
                session.items.len(),
                n
            )
        }),
        None => session
            .latest()
            .map(|item| (session.items.len(), item))
            .ok_or_else(|| anyhow!("Session {} is empty", session.id)),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{item, temp_store};
    use super::*;

    #[test]
    fn test_resolve_project_prefers_explicit() {
        let (_dir, store) = temp_store();
        store.create_project("Active").unwrap();

        assert_eq!(
            resolve_project(&store, Some("Other".to_string())).unwrap(),
            "Other"
        );
        assert_eq!(resolve_project(&store, None).unwrap(), "Active");
    }

    #[test]
    fn test_resolve_project_without_active() {
        let (_dir, store) = temp_store();
        let err = resolve_project(&store, None).unwrap_err();
        assert!(err.to_string().contains("No active project"));
    }

    #[test]
    fn test_resolve_session_id_prefix() {
        let (_dir, store) = temp_store();
        store.append_history_item("Acme", "abc123", item("a")).unwrap();
        store.append_history_item("Acme", "abd456", item("b")).unwrap();

        assert_eq!(resolve_session_id(&store, "Acme", "abc").unwrap(), "abc123");
        assert_eq!(resolve_session_id(&store, "Acme", "abd456").unwrap(), "abd456");
        assert!(resolve_session_id(&store, "Acme", "ab").is_err());
        assert!(resolve_session_id(&store, "Acme", "zz").is_err());
        assert!(resolve_session_id(&store, "Nope", "abc").is_err());
    }

    #[test]
    fn test_select_version() {
        let mut session = Session::new("s1", item("first"));
        session.items.push(item("second"));

        let (n, latest) = select_version(&session, None).unwrap();
        assert_eq!((n, latest.output.as_str()), (2, "second"));
        let (n, first) = select_version(&session, Some(1)).unwrap();
        assert_eq!((n, first.output.as_str()), (1, "first"));

        let err = select_version(&session, Some(3)).unwrap_err();
        assert!(err.to_string().contains("v3 does not exist"));
        assert!(select_version(&session, Some(0)).is_err());

        session.items.clear();
        assert!(select_version(&session, None).is_err());
    }

    #[test]
    fn test_exact_id_wins_over_longer_prefix_match() {
        let (_dir, store) = temp_store();
        store.append_history_item("Acme", "s1", item("a")).unwrap();
        store.append_history_item("Acme", "s10", item("b")).unwrap();

        assert_eq!(resolve_session_id(&store, "Acme", "s1").unwrap(), "s1");
    }
}
