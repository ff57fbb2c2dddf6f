//! Log Redaction Layer
//!
//! Scrubs API keys, bearer tokens, and phone numbers from backend error text
//! before it is written to the logs.

use regex::Regex;
use std::sync::LazyLock;

static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{2,3}\)?[-.\s]?\d{3,4}[-.\s]?\d{4}").unwrap()
});
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9_\-]{16,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]");
    TELEPHONE_RE
        .replace_all(&redacted, "[REDACTED_PHONE]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_openai_keys() {
        let raw = "Incorrect API key provided: sk-proj-abcdefghijklmnopqrstuvwx";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("sk-proj-abcdefghijklmnopqrstuvwx"));
        assert!(clean.contains("[REDACTED_TOKEN]"));
    }

    #[test]
    fn redacts_bearer_and_phone() {
        let raw = "call 010-1234-5678 with Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("010-1234-5678"));
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
    }

    #[test]
    fn leaves_ordinary_text_alone() {
        assert_eq!(redact_sensitive_data("model overloaded"), "model overloaded");
    }
}
