//! Size limits and secret masking for tool results.
//!
//! Workspace tools can return arbitrarily large file contents or command
//! output, occasionally with credentials in it. Their results pass through
//! [`ToolOutputPolicy`] before reaching the MCP client. Store tools opt out
//! via [`Tool::applies_output_policy`](crate::Tool::applies_output_policy).

use keeper_rs_config::ToolOutputPolicyConfig;
use serde_json::{Map, Value};

const DEFAULT_MAX_STRING_BYTES: usize = 32 * 1024;
const DEFAULT_MAX_ITEMS: usize = 256;
const DEFAULT_REPLACEMENT: &str = "[REDACTED]";

#[derive(Debug, Clone)]
pub struct ToolOutputPolicy {
    /// Strings longer than this are cut at the last char boundary that fits.
    pub max_string_bytes: usize,
    /// Arrays keep their first `max_array_len` items.
    pub max_array_len: usize,
    /// Objects keep their first `max_object_entries` keys.
    pub max_object_entries: usize,
    /// Keys (case-insensitive) whose values are masked wholesale.
    pub redact_keys: Vec<String>,
    /// Substrings (case-insensitive) that mask any string containing them.
    pub redact_values: Vec<String>,
    pub replacement: String,
}

impl Default for ToolOutputPolicy {
    fn default() -> Self {
        Self {
            max_string_bytes: DEFAULT_MAX_STRING_BYTES,
            max_array_len: DEFAULT_MAX_ITEMS,
            max_object_entries: DEFAULT_MAX_ITEMS,
            redact_keys: Vec::new(),
            redact_values: Vec::new(),
            replacement: DEFAULT_REPLACEMENT.to_string(),
        }
    }
}

impl From<&ToolOutputPolicyConfig> for ToolOutputPolicy {
    fn from(config: &ToolOutputPolicyConfig) -> Self {
        Self {
            max_string_bytes: config.max_string_bytes,
            max_array_len: config.max_array_len,
            max_object_entries: config.max_object_entries,
            redact_keys: lowercase_all(&config.redact_keys),
            redact_values: lowercase_all(&config.redact_values),
            replacement: config.replacement.clone(),
        }
    }
}

impl ToolOutputPolicy {
    /// Mask and trim a tool result.
    pub fn apply(&self, value: Value) -> Value {
        match value {
            Value::String(text) => Value::String(self.render_text(text)),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .take(self.max_array_len)
                    .map(|item| self.apply(item))
                    .collect(),
            ),
            Value::Object(entries) => Value::Object(self.render_object(entries)),
            scalar => scalar,
        }
    }

    fn render_object(&self, entries: Map<String, Value>) -> Map<String, Value> {
        let mut rendered = Map::new();
        for (key, value) in entries.into_iter().take(self.max_object_entries) {
            let value = if self.is_secret_key(&key) {
                Value::String(self.masked())
            } else {
                self.apply(value)
            };
            rendered.insert(key, value);
        }
        rendered
    }

    fn render_text(&self, text: String) -> String {
        if self.is_secret_text(&text) {
            return self.masked();
        }
        clip_to_bytes(text, self.max_string_bytes)
    }

    fn masked(&self) -> String {
        clip_to_bytes(self.replacement.clone(), self.max_string_bytes)
    }

    fn is_secret_key(&self, key: &str) -> bool {
        self.redact_keys
            .iter()
            .any(|secret| secret.eq_ignore_ascii_case(key))
    }

    fn is_secret_text(&self, text: &str) -> bool {
        if self.redact_values.is_empty() {
            return false;
        }
        let lowered = text.to_lowercase();
        self.redact_values
            .iter()
            .filter(|needle| !needle.is_empty())
            .any(|needle| lowered.contains(&needle.to_lowercase()))
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|value| value.to_lowercase()).collect()
}

/// Cut `text` to at most `limit` bytes without splitting a character.
fn clip_to_bytes(mut text: String, limit: usize) -> String {
    if text.len() <= limit {
        return text;
    }
    let end = text
        .char_indices()
        .map(|(start, ch)| start + ch.len_utf8())
        .take_while(|end| *end <= limit)
        .last()
        .unwrap_or(0);
    text.truncate(end);
    text
}

#[cfg(test)]
mod tests {
    use super::{ToolOutputPolicy, clip_to_bytes};
    use keeper_rs_config::ToolOutputPolicyConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn secrets_in_command_output_are_masked() {
        let policy = ToolOutputPolicy {
            redact_keys: vec!["api_key".to_string()],
            redact_values: vec!["ghp_".to_string()],
            replacement: "***".to_string(),
            ..ToolOutputPolicy::default()
        };
        let output = policy.apply(json!({
            "status_code": 0,
            "env": { "API_KEY": "abc123", "HOME": "/home/dev" },
            "stdout": "pushed with GHP_deadbeef",
        }));
        assert_eq!(
            output,
            json!({
                "status_code": 0,
                "env": { "API_KEY": "***", "HOME": "/home/dev" },
                "stdout": "***",
            })
        );
    }

    #[test]
    fn builds_from_config() {
        let config = ToolOutputPolicyConfig {
            max_string_bytes: 10,
            redact_keys: vec!["password".to_string()],
            ..ToolOutputPolicyConfig::default()
        };
        let policy = ToolOutputPolicy::from(&config);
        assert_eq!(policy.max_string_bytes, 10);
        assert_eq!(policy.max_array_len, 256);
        let output = policy.apply(json!({ "Password": "hunter2", "note": "a long sentence" }));
        assert_eq!(output, json!({ "Password": "[REDACTED]", "note": "a long sen" }));
    }

    #[test]
    fn nested_records_keep_utf8_boundaries() {
        let policy = ToolOutputPolicy {
            max_string_bytes: 5,
            ..ToolOutputPolicy::default()
        };
        let output = policy.apply(json!({ "records": [{ "title": "héllo wörld" }] }));
        assert_eq!(output, json!({ "records": [{ "title": "héll" }] }));
    }

    #[test]
    fn long_result_lists_are_cut() {
        let policy = ToolOutputPolicy {
            max_array_len: 2,
            max_object_entries: 1,
            ..ToolOutputPolicy::default()
        };
        let output = policy.apply(json!({
            "results": [{ "score": 50 }, { "score": 40 }, { "score": 10 }],
            "zzz": true,
        }));
        assert_eq!(output, json!({ "results": [{ "score": 50 }, { "score": 40 }] }));
    }

    #[test]
    fn zero_limit_empties_strings() {
        assert_eq!(clip_to_bytes("abc".to_string(), 0), "");
        assert_eq!(clip_to_bytes("abc".to_string(), 3), "abc");
    }
}
