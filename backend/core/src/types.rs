use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Where the conversation text of a request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    /// Text recognized from an uploaded chat screenshot.
    Screenshot,
    /// Conversation text typed or pasted by the user.
    DirectText,
}

impl InputSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputSource::Screenshot => "screenshot",
            InputSource::DirectText => "direct_text",
        }
    }
}

/// An uploaded screenshot, owned by exactly one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage(Bytes);

impl UploadedImage {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self(data.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Languages the OCR engine should load, in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageHints(Vec<String>);

impl LanguageHints {
    /// The product's two target languages.
    pub const DEFAULT: [&'static str; 2] = ["kor", "eng"];

    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: Vec<String> = codes
            .into_iter()
            .map(Into::into)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if codes.is_empty() {
            Self::default()
        } else {
            Self(codes)
        }
    }

    /// Tesseract-style language spec, e.g. `kor+eng`.
    pub fn to_spec(&self) -> String {
        self.0.join("+")
    }
}

impl Default for LanguageHints {
    fn default() -> Self {
        Self(Self::DEFAULT.iter().map(|c| c.to_string()).collect())
    }
}

// ---------------------------------------------------------------------------
// Prompting
// ---------------------------------------------------------------------------

/// A fully built prompt: the fixed persona plus the framed conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationPrompt {
    system_persona: String,
    user_instruction: String,
}

impl ConversationPrompt {
    pub fn new(system_persona: impl Into<String>, user_instruction: impl Into<String>) -> Self {
        Self {
            system_persona: system_persona.into(),
            user_instruction: user_instruction.into(),
        }
    }

    pub fn system_persona(&self) -> &str {
        &self.system_persona
    }

    pub fn user_instruction(&self) -> &str {
        &self.user_instruction
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Sampling parameters, fixed per process.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            max_tokens: 100,
            temperature: 0.7,
        }
    }
}

/// Request to an LLM provider.
///
/// Only constructible from a [`ConversationPrompt`], so the message list is
/// always exactly `[system, user]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    messages: [ChatMessage; 2],
}

impl LlmRequest {
    pub fn from_prompt(prompt: &ConversationPrompt, params: &GenerationParams) -> Self {
        Self {
            model: params.model.clone(),
            max_tokens: params.max_tokens,
            temperature: params.temperature.clamp(0.0, 1.0),
            messages: [
                ChatMessage::system(prompt.system_persona()),
                ChatMessage::user(prompt.user_instruction()),
            ],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn system_content(&self) -> &str {
        &self.messages[0].content
    }

    pub fn user_content(&self) -> &str {
        &self.messages[1].content
    }
}

/// Response from an LLM provider, before any choice is selected.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub choices: Vec<String>,
    pub provider: String,
    pub model: String,
    pub tokens_used: u64,
    pub latency_ms: u64,
}

// ---------------------------------------------------------------------------
// Outward contract
// ---------------------------------------------------------------------------

/// JSON body returned to callers: `{"message": ..}` or `{"error": ..}`, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestionResponse {
    Message { message: String },
    Error { error: String },
}

impl SuggestionResponse {
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message { message: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Error { error: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_from_prompt_orders_system_then_user() {
        let prompt = ConversationPrompt::new("persona", "instruction");
        let req = LlmRequest::from_prompt(&prompt, &GenerationParams::default());
        let roles: Vec<Role> = req.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User]);
        assert_eq!(req.system_content(), "persona");
        assert_eq!(req.user_content(), "instruction");
        assert_eq!(req.model, "gpt-4");
    }

    #[test]
    fn temperature_is_clamped_to_unit_range() {
        let prompt = ConversationPrompt::new("p", "u");
        let params = GenerationParams { temperature: 1.8, ..Default::default() };
        assert_eq!(LlmRequest::from_prompt(&prompt, &params).temperature, 1.0);
    }

    #[test]
    fn response_serializes_exactly_one_field() {
        let ok = serde_json::to_value(SuggestionResponse::message("hi")).unwrap();
        assert_eq!(ok, json!({ "message": "hi" }));

        let err = serde_json::to_value(SuggestionResponse::error("no file")).unwrap();
        assert_eq!(err, json!({ "error": "no file" }));
    }

    #[test]
    fn language_hints_default_and_blank_fallback() {
        assert_eq!(LanguageHints::default().to_spec(), "kor+eng");
        assert_eq!(LanguageHints::new(["", "  "]).to_spec(), "kor+eng");
        assert_eq!(LanguageHints::new(["jpn"]).to_spec(), "jpn");
    }

    #[test]
    fn chat_message_role_serializes_lowercase() {
        let v = serde_json::to_value(ChatMessage::system("x")).unwrap();
        assert_eq!(v["role"], "system");
    }
}
