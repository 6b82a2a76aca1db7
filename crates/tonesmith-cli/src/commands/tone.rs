//! Tone of voice command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use tonesmith_core::Store;

use crate::editor::{edit_text, strip_comment_lines};
use crate::output::Output;

const EDITOR_HINT: &str =
    "<!-- Tone of voice guidelines, applied to every generation in every project -->\n\
     <!-- Lines starting with <!-- are removed. Save and close to apply. -->\n\n";

/// Show the current tone of voice
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let tone = store.get_tone_of_voice();
    if tone.is_empty() && !output.is_json() {
        output.message("No tone of voice set. Set one with: tonesmith tone set");
        return Ok(());
    }
    output.print_text("tone_of_voice", &tone);
    Ok(())
}

/// Replace the tone of voice from an argument, a file, or $EDITOR
pub fn set(
    store: &Store,
    text: Option<String>,
    file: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let tone = match (text, file) {
        (Some(_), Some(_)) => bail!("Give the tone of voice as text or --file, not both"),
        (Some(text), None) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read tone of voice from {:?}", path))?,
        (None, None) => {
            let initial = format!("{}{}", EDITOR_HINT, store.get_tone_of_voice());
            let edited = edit_text(&initial).context("Failed to edit tone of voice")?;
            strip_comment_lines(&edited)
        }
    };

    store
        .set_tone_of_voice(&tone)
        .context("Failed to save tone of voice")?;

    output.success(&format!(
        "Tone of voice updated ({} characters)",
        tone.chars().count()
    ));
    Ok(())
}
