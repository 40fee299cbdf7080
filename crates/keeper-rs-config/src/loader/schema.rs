//! Shape check for a single `keeper.json5` layer.
//!
//! Layers are checked one by one before merging so an error names the file
//! that introduced it. The accepted shape is a static table; unknown keys are
//! rejected at every level.

use crate::ConfigError;
use serde_json::Value;

/// Expected JSON shape of one config entry.
#[derive(Debug, Clone, Copy)]
enum Shape {
    Text,
    TextOrNull,
    Flag,
    /// Non-negative integer (limits and byte sizes).
    Count,
    OneOf(&'static [&'static str]),
    TextList,
    Section(&'static [Field]),
}

type Field = (&'static str, Shape);

const STORAGE: &[Field] = &[("data_dir", Shape::TextOrNull)];

const MEMORY: &[Field] = &[("default_limit", Shape::Count)];

const RULES: &[Field] = &[
    ("default_limit", Shape::Count),
    ("id_strategy", Shape::OneOf(&["monotonic", "count_based"])),
    ("seed_defaults", Shape::Flag),
];

const OUTPUT_POLICY: &[Field] = &[
    ("max_string_bytes", Shape::Count),
    ("max_array_len", Shape::Count),
    ("max_object_entries", Shape::Count),
    ("redact_keys", Shape::TextList),
    ("redact_values", Shape::TextList),
    ("replacement", Shape::Text),
];

const TOOLS: &[Field] = &[
    ("workspace_root", Shape::TextOrNull),
    ("shell_enabled", Shape::Flag),
    ("output_policy", Shape::Section(OUTPUT_POLICY)),
];

const ROOT: &[Field] = &[
    ("$schema", Shape::Text),
    ("storage", Shape::Section(STORAGE)),
    ("memory", Shape::Section(MEMORY)),
    ("rules", Shape::Section(RULES)),
    ("tools", Shape::Section(TOOLS)),
];

/// Check one layer; `layer` labels errors, e.g. `user(/home/me/.keeper/keeper.json5)`.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    Checker { layer }.check(value, Shape::Section(ROOT), "")
}

struct Checker<'a> {
    layer: &'a str,
}

impl Checker<'_> {
    fn check(&self, value: &Value, shape: Shape, path: &str) -> Result<(), ConfigError> {
        let ok = match shape {
            Shape::Text => value.is_string(),
            Shape::TextOrNull => value.is_string() || value.is_null(),
            Shape::Flag => value.is_boolean(),
            Shape::Count => value.is_u64(),
            Shape::OneOf(allowed) => value.as_str().is_some_and(|text| allowed.contains(&text)),
            Shape::TextList => return self.check_list(value, path),
            Shape::Section(fields) => return self.check_section(value, fields, path),
        };
        if ok {
            Ok(())
        } else {
            Err(self.fail(path, &expected(shape)))
        }
    }

    fn check_section(&self, value: &Value, fields: &[Field], path: &str) -> Result<(), ConfigError> {
        let Value::Object(map) = value else {
            return Err(self.fail(path, "expected object"));
        };
        for (key, entry) in map {
            let child = child_path(path, key);
            match fields.iter().find(|(name, _)| *name == key.as_str()) {
                Some((_, shape)) => self.check(entry, *shape, &child)?,
                None => return Err(self.fail(&child, "unknown key")),
            }
        }
        Ok(())
    }

    fn check_list(&self, value: &Value, path: &str) -> Result<(), ConfigError> {
        let Value::Array(items) = value else {
            return Err(self.fail(path, "expected array"));
        };
        match items.iter().position(|item| !item.is_string()) {
            Some(index) => Err(self.fail(&format!("{path}[{index}]"), "expected string")),
            None => Ok(()),
        }
    }

    fn fail(&self, path: &str, message: &str) -> ConfigError {
        let path = if path.is_empty() { "root" } else { path };
        ConfigError::InvalidField {
            path: format!("{}:{path}", self.layer),
            message: message.to_string(),
        }
    }
}

fn expected(shape: Shape) -> String {
    match shape {
        Shape::Text => "expected string".to_string(),
        Shape::TextOrNull => "expected string or null".to_string(),
        Shape::Flag => "expected bool".to_string(),
        Shape::Count => "expected non-negative integer".to_string(),
        Shape::OneOf(allowed) => format!("expected one of {}", allowed.join(", ")),
        Shape::TextList => "expected array".to_string(),
        Shape::Section(_) => "expected object".to_string(),
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::validate_layer_schema;
    use crate::ConfigError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn failure(value: serde_json::Value) -> (String, String) {
        match validate_layer_schema(&value, "cwd") {
            Err(ConfigError::InvalidField { path, message }) => (path, message),
            other => panic!("expected invalid field, got {other:?}"),
        }
    }

    #[test]
    fn full_layer_is_accepted() {
        let layer = json!({
            "$schema": "keeper.schema.json",
            "storage": { "data_dir": null },
            "memory": { "default_limit": 5 },
            "rules": { "default_limit": 5, "id_strategy": "count_based", "seed_defaults": false },
            "tools": {
                "workspace_root": "~/src",
                "shell_enabled": true,
                "output_policy": { "redact_keys": ["token"], "replacement": "***" }
            }
        });
        validate_layer_schema(&layer, "cwd").expect("valid");
    }

    #[test]
    fn errors_carry_layer_and_dotted_path() {
        assert_eq!(
            failure(json!({ "tools": { "output_policy": { "max_array_len": -1 } } })),
            (
                "cwd:tools.output_policy.max_array_len".to_string(),
                "expected non-negative integer".to_string()
            )
        );
        assert_eq!(
            failure(json!({ "rules": { "id_strategy": "random" } })).1,
            "expected one of monotonic, count_based"
        );
        assert_eq!(
            failure(json!({ "tools": { "output_policy": { "redact_values": ["a", 1] } } })).0,
            "cwd:tools.output_policy.redact_values[1]"
        );
    }

    #[test]
    fn unknown_keys_and_non_objects_are_rejected() {
        assert_eq!(
            failure(json!({ "memory": { "limit": 3 } })),
            ("cwd:memory.limit".to_string(), "unknown key".to_string())
        );
        assert_eq!(
            failure(json!([])),
            ("cwd:root".to_string(), "expected object".to_string())
        );
    }
}
