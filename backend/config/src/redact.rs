//! Config redaction: produce safe-to-log config snapshots by masking secrets.

use serde_json::Value;

/// Keys whose string values are secrets.
static SENSITIVE_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "apikey",
    "token",
    "accessToken",
    "access_token",
    "secret",
    "password",
];

/// Redact a config JSON value, masking every sensitive field.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_string(s: &str, key: &str) -> Value {
    if !is_sensitive_key(key) || s.is_empty() {
        return Value::String(s.to_string());
    }
    // Preserve a short prefix hint (e.g. `sk-p***`) for debugging which key is loaded.
    let hint: String = s.chars().take(4).collect();
    if s.chars().count() > 8 {
        Value::String(format!("{hint}***"))
    } else {
        Value::String("***".to_string())
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_api_key_with_hint() {
        let v = json!({"generation": {"apiKey": "sk-proj-0123456789", "model": "gpt-4"}});
        let r = redact(&v);
        assert_eq!(r["generation"]["apiKey"], "sk-p***");
        assert_eq!(r["generation"]["model"], "gpt-4");
    }

    #[test]
    fn short_secrets_are_fully_masked() {
        let r = redact(&json!({"password": "hunter2"}));
        assert_eq!(r["password"], "***");
    }
}
