//! Prompt construction
//!
//! Turns the tone of voice, the user's copy and instructions, and the
//! length/strength controls into the text sent to the language model.

use crate::config::GenerationSettings;
use crate::models::{GenerationParams, Strength};

/// Style guidance for each rewrite strength
pub fn style_hint(strength: Strength) -> &'static str {
    match strength {
        Strength::Subtle => "Make minimal changes while aligning with tone of voice.",
        Strength::Balanced => "Balance clarity and tone; improve structure and persuasiveness.",
        Strength::Strong => "Boldly rewrite to maximize impact, while preserving core meaning.",
    }
}

/// Build the rewrite prompt
///
/// Tone and input are trimmed. The instructions line is left out entirely
/// when the instructions are blank.
pub fn build_prompt(
    tone: &str,
    input_text: &str,
    instructions: &str,
    params: &GenerationParams,
    settings: &GenerationSettings,
) -> String {
    let instructions = instructions.trim();
    let instructions_block = if instructions.is_empty() {
        String::new()
    } else {
        format!("Specific instructions: {}", instructions)
    };

    format!(
        "You are a senior marketing copywriter. Follow the Tone of Voice (TOV) and constraints strictly.\n\
         Tone of Voice (TOV):\n{tone}\n\n\
         Task: Rewrite or generate the marketing text. Preserve factual accuracy.\n\
         Constraints: Output length target: {length}. You may use up to {max_tokens} tokens. {hint}\n\
         Provide only the rewritten text; do not include explanations.\n\n\
         Initial Text:\n{input}\n\n\
         Desired Output:\n{instructions_block}\n",
        tone = tone.trim(),
        length = params.length,
        max_tokens = settings.max_tokens(params.length),
        hint = style_hint(params.strength),
        input = input_text.trim(),
        instructions_block = instructions_block,
    )
}
