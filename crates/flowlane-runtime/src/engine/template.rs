//! Placeholder resolution for task configurations.
//!
//! A configuration string may reference another task's collected output
//! through a `{{selector}}` placeholder, e.g. `{{manual.content}}` or
//! `{{files.report-2024}}`. Resolution happens right before a task's action
//! runner is invoked, against the outputs collected so far in the run.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{WorkflowError, WorkflowResult};
use crate::graph::TaskConfig;

/// Matches `{{ selector }}` with an optional inner whitespace.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_][A-Za-z0-9_.\-]*)\s*\}\}").expect("placeholder regex")
});

/// How to treat a placeholder whose selector has no collected output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderPolicy {
    /// Leave the literal `{{selector}}` text in place.
    #[default]
    KeepLiteral,
    /// Substitute an empty string.
    Empty,
    /// Fail the task with [`WorkflowError::UnresolvedPlaceholder`].
    Error,
}

/// Resolves all placeholders in a single string.
pub fn resolve_str(
    input: &str,
    outputs: &HashMap<String, String>,
    policy: PlaceholderPolicy,
) -> WorkflowResult<String> {
    let mut resolved = String::with_capacity(input.len());
    let mut last_end = 0;

    for captures in PLACEHOLDER.captures_iter(input) {
        let whole = captures.get(0).expect("capture group 0");
        let key = &captures[1];

        resolved.push_str(&input[last_end..whole.start()]);
        match outputs.get(key) {
            Some(value) => resolved.push_str(value),
            None => match policy {
                PlaceholderPolicy::KeepLiteral => resolved.push_str(whole.as_str()),
                PlaceholderPolicy::Empty => {}
                PlaceholderPolicy::Error => {
                    return Err(WorkflowError::UnresolvedPlaceholder { key: key.into() });
                }
            },
        }
        last_end = whole.end();
    }

    resolved.push_str(&input[last_end..]);
    Ok(resolved)
}

/// Resolves all placeholders in a task configuration.
///
/// Walks the configuration recursively; only string values are rewritten,
/// including strings nested in arrays and objects.
pub fn resolve_config(
    config: &TaskConfig,
    outputs: &HashMap<String, String>,
    policy: PlaceholderPolicy,
) -> WorkflowResult<TaskConfig> {
    let mut resolved = serde_json::Map::new();
    for (key, value) in config.iter() {
        resolved.insert(key.clone(), resolve_value(value, outputs, policy)?);
    }
    Ok(TaskConfig::from(resolved))
}

fn resolve_value(
    value: &Value,
    outputs: &HashMap<String, String>,
    policy: PlaceholderPolicy,
) -> WorkflowResult<Value> {
    match value {
        Value::String(s) => Ok(Value::String(resolve_str(s, outputs, policy)?)),
        Value::Array(items) => items
            .iter()
            .map(|item| resolve_value(item, outputs, policy))
            .collect::<WorkflowResult<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| Ok((k.clone(), resolve_value(v, outputs, policy)?)))
            .collect::<WorkflowResult<serde_json::Map<_, _>>>()
            .map(Value::Object),
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs() -> HashMap<String, String> {
        HashMap::from([
            ("manual.content".to_string(), "hello".to_string()),
            ("files.f1".to_string(), "https://files/f1".to_string()),
        ])
    }

    #[test]
    fn test_resolves_known_selector() {
        let resolved =
            resolve_str("say: {{manual.content}}", &outputs(), PlaceholderPolicy::KeepLiteral)
                .unwrap();
        assert_eq!(resolved, "say: hello");
    }

    #[test]
    fn test_resolves_multiple_selectors() {
        let resolved = resolve_str(
            "{{manual.content}} -> {{files.f1}}",
            &outputs(),
            PlaceholderPolicy::KeepLiteral,
        )
        .unwrap();
        assert_eq!(resolved, "hello -> https://files/f1");
    }

    #[test]
    fn test_tolerates_inner_whitespace() {
        let resolved =
            resolve_str("{{ manual.content }}", &outputs(), PlaceholderPolicy::KeepLiteral)
                .unwrap();
        assert_eq!(resolved, "hello");
    }

    #[test]
    fn test_missing_selector_keep_literal() {
        let resolved =
            resolve_str("{{missing.key}}", &outputs(), PlaceholderPolicy::KeepLiteral).unwrap();
        assert_eq!(resolved, "{{missing.key}}");
    }

    #[test]
    fn test_missing_selector_empty() {
        let resolved =
            resolve_str("a{{missing.key}}b", &outputs(), PlaceholderPolicy::Empty).unwrap();
        assert_eq!(resolved, "ab");
    }

    #[test]
    fn test_missing_selector_error() {
        let result = resolve_str("{{missing.key}}", &outputs(), PlaceholderPolicy::Error);
        assert!(matches!(
            result,
            Err(WorkflowError::UnresolvedPlaceholder { key }) if key == "missing.key"
        ));
    }

    #[test]
    fn test_plain_string_untouched() {
        let resolved =
            resolve_str("no placeholders here", &outputs(), PlaceholderPolicy::Error).unwrap();
        assert_eq!(resolved, "no placeholders here");
    }

    #[test]
    fn test_resolve_config_walks_nested_values() {
        let config = TaskConfig::new()
            .with("message", "{{manual.content}}")
            .with(
                "attachments",
                serde_json::json!([{ "url": "{{files.f1}}" }, 42]),
            );

        let resolved =
            resolve_config(&config, &outputs(), PlaceholderPolicy::KeepLiteral).unwrap();
        assert_eq!(resolved.get_str("message"), Some("hello"));
        assert_eq!(
            resolved.get("attachments").unwrap()[0]["url"],
            "https://files/f1"
        );
        assert_eq!(resolved.get("attachments").unwrap()[1], 42);
    }
}
