//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use tonesmith_core::{HistoryItem, Session};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in JSON mode
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print project names, marking the active one
    pub fn print_projects(&self, projects: &[String], active: Option<&str>) {
        match self.format {
            OutputFormat::Human => {
                if projects.is_empty() {
                    println!("No projects yet. Create one with: tonesmith project create <name>");
                    return;
                }
                for name in projects {
                    let marker = if Some(name.as_str()) == active { "*" } else { " " };
                    println!("{} {}", marker, name);
                }
                println!("\n{} project(s)", projects.len());
            }
            OutputFormat::Json => {
                print_json(&serde_json::json!({
                    "projects": projects,
                    "active_project": active,
                }));
            }
            OutputFormat::Quiet => {
                for name in projects {
                    println!("{}", name);
                }
            }
        }
    }

    /// Print session summaries, newest first
    pub fn print_sessions(&self, project: &str, sessions: &[Session]) {
        match self.format {
            OutputFormat::Human => {
                println!("Sessions in {}", project);
                println!();
                if sessions.is_empty() {
                    println!("No sessions yet.");
                    return;
                }
                for session in sessions.iter().rev() {
                    let preview = session
                        .latest()
                        .map(|item| truncate_line(&item.output, 50))
                        .unwrap_or_default();
                    println!(
                        "{} | {:>3} version(s) | {}",
                        short_id(&session.id),
                        session.items.len(),
                        preview
                    );
                }
                println!("\n{} session(s)", sessions.len());
            }
            OutputFormat::Json => print_json(&sessions),
            OutputFormat::Quiet => {
                for session in sessions.iter().rev() {
                    println!("{}", session.id);
                }
            }
        }
    }

    /// Print every version in one session
    pub fn print_session(&self, session: &Session) {
        match self.format {
            OutputFormat::Human => {
                println!("Session {}", session.id);
                for (idx, item) in session.items.iter().enumerate() {
                    println!("────────────────────────────────────────");
                    println!(
                        "v{} · {}, {}{}",
                        idx + 1,
                        item.params.length,
                        item.params.strength,
                        if item.liked { "  ♥" } else { "" }
                    );
                    println!();
                    println!("{}", item.output);
                    println!();
                }
                println!("{} version(s)", session.items.len());
            }
            OutputFormat::Json => print_json(session),
            OutputFormat::Quiet => {
                if let Some(item) = session.latest() {
                    println!("{}", item.output);
                }
            }
        }
    }

    /// Print liked items, most recent first
    pub fn print_likes(&self, project: &str, likes: &[HistoryItem]) {
        match self.format {
            OutputFormat::Human => {
                println!("Likes in {}", project);
                println!();
                if likes.is_empty() {
                    println!("No liked items yet.");
                    return;
                }
                for (idx, item) in likes.iter().enumerate().rev() {
                    println!("────────────────────────────────────────");
                    println!(
                        "#{} · {}, {}",
                        idx + 1,
                        item.params.length,
                        item.params.strength
                    );
                    println!();
                    println!("{}", item.output);
                    println!();
                }
                println!("{} like(s)", likes.len());
            }
            OutputFormat::Json => print_json(&likes),
            OutputFormat::Quiet => {
                for item in likes.iter().rev() {
                    println!("{}", item.output);
                }
            }
        }
    }

    /// Print the result of a generation
    pub fn print_generation(&self, session_id: &str, version: usize, item: &HistoryItem) {
        match self.format {
            OutputFormat::Human => {
                println!("{}", item.output);
                println!();
                println!(
                    "Session {} · v{} · {}, {}",
                    short_id(session_id),
                    version,
                    item.params.length,
                    item.params.strength
                );
            }
            OutputFormat::Json => {
                print_json(&serde_json::json!({
                    "session_id": session_id,
                    "version": version,
                    "item": item,
                }));
            }
            OutputFormat::Quiet => println!("{}", item.output),
        }
    }

    /// Print a block of text as-is (prompt preview, tone of voice)
    pub fn print_text(&self, key: &str, text: &str) {
        match self.format {
            OutputFormat::Json => print_json(&serde_json::json!({ key: text })),
            OutputFormat::Human | OutputFormat::Quiet => println!("{}", text),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                print_json(&serde_json::json!({"status": "success", "message": message}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr
    pub fn warning(&self, message: &str) {
        if self.format != OutputFormat::Quiet {
            eprintln!("⚠ {}", message);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => print_json(&serde_json::json!({"message": msg})),
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON output: {}", e),
    }
}

/// First eight characters of an id, for display
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        // Multi-byte characters are never split
        assert_eq!(truncate("héllo wörld, schön", 8), "héllo...");
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("single line", 20), "single line");
        assert_eq!(truncate_line("line one\nline two", 20), "line one");
        assert_eq!(truncate_line("very long single line here", 10), "very lo...");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0f8fad5b-d9cb-469f-a165-70867728950e"), "0f8fad5b");
        assert_eq!(short_id("s1"), "s1");
        assert_eq!(short_id("12345678"), "12345678");
    }
}
