//! Language model client
//!
//! Sends a built prompt to an OpenAI-compatible chat completions endpoint.
//! Generation never fails from the caller's point of view: any problem is
//! returned as a bracketed diagnostic string, so there is always plain text
//! to record in history.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::GenerationSettings;
use crate::models::GenerationParams;

/// System message sent with every request
const SYSTEM_PROMPT: &str = "You rewrite marketing copy.";

/// Returned when no API key is configured
pub const MISSING_KEY_MESSAGE: &str = "[Missing or invalid OPENAI_API_KEY] Cannot generate output.";

/// Produces rewritten copy for a prompt
pub trait Generator: Send + Sync {
    /// Generate text; failures come back as a diagnostic beginning with `[`
    fn generate(&self, prompt: &str, params: &GenerationParams) -> String;
}

/// Check whether generated text is a failure diagnostic
pub fn is_diagnostic(text: &str) -> bool {
    text.starts_with('[')
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// Chat completions client using blocking HTTP
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    settings: GenerationSettings,
}

impl OpenAiGenerator {
    pub fn new(settings: GenerationSettings) -> Self {
        Self { settings }
    }

    /// Whether an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.api_base.trim_end_matches('/')
        )
    }

    fn generate_inner(
        &self,
        api_key: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.settings.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        let request = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.settings.temperature(params.strength),
            max_tokens: self.settings.max_tokens(params.length),
        };

        let response = client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            bail!("HTTP {}: {}", status, api_error_message(&body));
        }

        parse_reply(&body)
    }
}

impl Generator for OpenAiGenerator {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> String {
        let Some(api_key) = self.api_key() else {
            return MISSING_KEY_MESSAGE.to_string();
        };

        info!(
            "Generating with {} (length={}, strength={})",
            self.settings.model, params.length, params.strength
        );

        match self.generate_inner(api_key, prompt, params) {
            Ok(text) => {
                info!("Generation complete, {} chars", text.chars().count());
                text
            }
            Err(e) => {
                warn!("Generation failed: {:#}", e);
                format!("[Generation error: {:#}]", e)
            }
        }
    }
}

/// Extract the first choice's text from a chat completions response
fn parse_reply(body: &str) -> Result<String> {
    let response: ChatResponse =
        serde_json::from_str(body).context("unexpected response format")?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();

    Ok(content.trim().to_string())
}

/// Best-effort error message from a failed response body
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => "empty response".to_string(),
        Err(_) => body.trim().chars().take(200).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Length, Strength};

    fn settings_with_key(key: Option<&str>) -> GenerationSettings {
        GenerationSettings {
            api_key: key.map(str::to_string),
            // Nothing listens on the discard port
            api_base: "http://127.0.0.1:9/v1/".to_string(),
            timeout_secs: 2,
            ..GenerationSettings::default()
        }
    }

    #[test]
    fn test_missing_key_returns_diagnostic() {
        let generator = OpenAiGenerator::new(settings_with_key(None));
        assert!(!generator.has_api_key());

        let out = generator.generate("prompt", &GenerationParams::default());
        assert_eq!(out, MISSING_KEY_MESSAGE);
        assert!(is_diagnostic(&out));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let generator = OpenAiGenerator::new(settings_with_key(Some("   ")));
        assert!(!generator.has_api_key());
        assert_eq!(
            generator.generate("prompt", &GenerationParams::default()),
            MISSING_KEY_MESSAGE
        );
    }

    #[test]
    fn test_transport_failure_returns_diagnostic() {
        let generator = OpenAiGenerator::new(settings_with_key(Some("sk-test")));

        let out = generator.generate(
            "prompt",
            &GenerationParams::new(Length::Short, Strength::Subtle),
        );

        assert!(out.starts_with("[Generation error: "));
        assert!(out.ends_with(']'));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let generator = OpenAiGenerator::new(settings_with_key(Some("sk-test")));
        assert_eq!(generator.endpoint(), "http://127.0.0.1:9/v1/chat/completions");
    }

    #[test]
    fn test_parse_reply() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  Fresh copy.\n"}}]}"#;
        assert_eq!(parse_reply(body).unwrap(), "Fresh copy.");
    }

    #[test]
    fn test_parse_reply_null_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert_eq!(parse_reply(body).unwrap(), "");
        assert_eq!(parse_reply(r#"{"choices":[]}"#).unwrap(), "");
    }

    #[test]
    fn test_parse_reply_garbage() {
        assert!(parse_reply("<html>bad gateway</html>").is_err());
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(api_error_message(body), "Incorrect API key provided");
        assert_eq!(api_error_message(""), "empty response");
        assert_eq!(api_error_message("upstream timeout"), "upstream timeout");
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: "hello",
                },
            ],
            temperature: 0.5,
            max_tokens: 150,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["max_tokens"], 150);
    }

    #[test]
    fn test_is_diagnostic() {
        assert!(is_diagnostic("[Generation error: boom]"));
        assert!(!is_diagnostic("Hello!"));
        assert!(!is_diagnostic(""));
    }
}
