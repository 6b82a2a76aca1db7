//! Status command handler

use anyhow::Result;

use tonesmith_core::{OpenAiGenerator, Store};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let stats = store.storage_stats();
    let config = store.config();
    let state = store.get_state();
    let api_key_configured = OpenAiGenerator::new(config.generation.clone()).has_api_key();

    let sessions: usize = state.projects.values().map(|p| p.sessions.len()).sum();
    let likes: usize = state.projects.values().map(|p| p.likes.len()).sum();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "state_path": store.path(),
                    "active_project": state.active_project,
                    "storage": {
                        "document_exists": stats.document_exists,
                        "document_size": stats.document_size,
                    },
                    "counts": {
                        "projects": state.projects.len(),
                        "sessions": sessions,
                        "likes": likes,
                    },
                    "tone_of_voice_chars": state.tone_of_voice.chars().count(),
                    "generation": {
                        "model": config.generation.model,
                        "api_key_configured": api_key_configured,
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.path().display());
        }
        OutputFormat::Human => {
            println!("Tonesmith Status");
            println!("================");
            println!();
            println!("Storage:");
            println!("  Location: {}", store.path().display());
            if stats.document_exists {
                println!("  Size:     {}", stats.document_size_human());
            } else {
                println!("  Size:     (not written yet)");
            }
            println!();
            println!("Contents:");
            println!(
                "  Active project: {}",
                state.active_project.as_deref().unwrap_or("(none)")
            );
            println!("  Projects:       {}", state.projects.len());
            println!("  Sessions:       {}", sessions);
            println!("  Likes:          {}", likes);
            if state.tone_of_voice.is_empty() {
                println!("  Tone of voice:  (not set)");
            } else {
                println!(
                    "  Tone of voice:  {} characters",
                    state.tone_of_voice.chars().count()
                );
            }
            println!();
            println!("Generation:");
            println!("  Model:   {}", config.generation.model);
            println!(
                "  API key: {}",
                if api_key_configured {
                    "configured"
                } else {
                    "missing (set OPENAI_API_KEY)"
                }
            );
        }
    }

    Ok(())
}
