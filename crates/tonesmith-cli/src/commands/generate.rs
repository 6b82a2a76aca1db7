//! Generation command handlers
//!
//! Reads the tone of voice, builds the prompt, calls the generator and
//! records the result as the next version of a session.

use std::io::Read;

use anyhow::{anyhow, bail, Context, Result};
use uuid::Uuid;

use tonesmith_core::{
    build_prompt, is_diagnostic, GenerationParams, Generator, HistoryItem, Length, StorageResult,
    Store, Strength,
};

use crate::commands::{resolve_project, resolve_session_id, select_version};
use crate::output::Output;

/// Options for a fresh generation
#[derive(Debug, Default)]
pub struct GenerateArgs {
    pub input: Option<String>,
    pub instructions: Option<String>,
    pub length: Length,
    pub strength: Strength,
    pub project: Option<String>,
    pub session: Option<String>,
    pub dry_run: bool,
}

/// Generate a rewrite and append it to a session
pub fn generate(
    store: &Store,
    generator: &dyn Generator,
    args: GenerateArgs,
    output: &Output,
) -> Result<()> {
    let input = read_arg(args.input)?;
    let instructions = args.instructions.unwrap_or_default();
    if input.trim().is_empty() && instructions.trim().is_empty() {
        bail!("Nothing to generate from. Provide --input and/or --instructions.");
    }

    let project = resolve_project(store, args.project)?;
    let params = GenerationParams::new(args.length, args.strength);
    let prompt = build_prompt(
        &store.get_tone_of_voice(),
        &input,
        &instructions,
        &params,
        &store.config().generation,
    );

    if args.dry_run {
        output.print_text("prompt", &prompt);
        return Ok(());
    }

    let text = generator.generate(&prompt, &params);
    let session_id = args
        .session
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let item = HistoryItem::new(input, instructions, text, params);

    record(store, &project, &session_id, item, output)
}

/// Options for rerunning an earlier version
#[derive(Debug, Default)]
pub struct RegenerateArgs {
    pub session: String,
    /// 1-based version to rerun; the latest when unset
    pub version: Option<usize>,
    pub length: Option<Length>,
    pub strength: Option<Strength>,
    pub project: Option<String>,
}

/// Rerun a version of a session with the current tone of voice
///
/// The new item is appended as the session's next version.
pub fn regenerate(
    store: &Store,
    generator: &dyn Generator,
    args: RegenerateArgs,
    output: &Output,
) -> Result<()> {
    let project = resolve_project(store, args.project)?;
    let session_id = resolve_session_id(store, &project, &args.session)?;

    let session = store
        .session(&project, &session_id)
        .ok_or_else(|| anyhow!("Session not found: {}", session_id))?;
    let (_, source) = select_version(&session, args.version)?;

    let params = GenerationParams::new(
        args.length.unwrap_or(source.params.length),
        args.strength.unwrap_or(source.params.strength),
    );
    let prompt = build_prompt(
        &store.get_tone_of_voice(),
        &source.input,
        &source.instructions,
        &params,
        &store.config().generation,
    );

    let text = generator.generate(&prompt, &params);
    let item = HistoryItem::new(
        source.input.clone(),
        source.instructions.clone(),
        text,
        params,
    );

    record(store, &project, &session_id, item, output)
}

/// Append the item and report which version it became
fn record(
    store: &Store,
    project: &str,
    session_id: &str,
    item: HistoryItem,
    output: &Output,
) -> Result<()> {
    let version = store
        .transaction(|s| -> StorageResult<usize> {
            s.append_history_item(project, session_id, item.clone())?;
            Ok(s.session(project, session_id)
                .map(|session| session.items.len())
                .unwrap_or(1))
        })
        .context("Failed to save generation")?;

    output.print_generation(session_id, version, &item);
    if is_diagnostic(&item.output) {
        output.warning("Generation did not succeed; the diagnostic was saved to history.");
    }
    Ok(())
}

/// `-` reads the value from stdin
fn read_arg(value: Option<String>) -> Result<String> {
    match value.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read input from stdin")?;
            Ok(buf)
        }
        _ => Ok(value.unwrap_or_default()),
    }
}
