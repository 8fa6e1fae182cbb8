//! Scan string parameters for code-injection payloads.

use std::sync::LazyLock;

use regex::Regex;

use super::Context;
use super::report::{Category, Severity, ValidationError};

static SUSPICIOUS_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("eval(", r"(?i)eval\s*\("),
        ("exec(", r"(?i)exec\s*\("),
        ("system(", r"(?i)system\s*\("),
        ("import os", r"(?i)import\s+os"),
        ("subprocess", r"(?i)subprocess"),
        ("__import__", r"(?i)__import__"),
        ("script>", r"(?i)script\s*>"),
        ("javascript:", r"(?i)javascript\s*:"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("static pattern compiles")))
    .collect()
});

/// First suspicious pattern found in `text`.
pub fn suspicious_pattern(text: &str) -> Option<&'static str> {
    SUSPICIOUS_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(name, _)| *name)
}

pub fn check_security(ctx: &Context) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for node in &ctx.workflow.nodes {
        for (key, value) in node.parameters_json() {
            let mut strings = Vec::new();
            collect_strings(&key, &value, &mut strings);
            for (path, text) in strings {
                let Some(pattern) = suspicious_pattern(text) else {
                    continue;
                };
                errors.push(
                    ValidationError::error(
                        "suspicious_parameter",
                        Category::Security,
                        Severity::High,
                        format!(
                            "Parameter '{}' of node '{}' contains suspicious content ({})",
                            path,
                            node.id(),
                            pattern
                        ),
                    )
                    .on_node(node.id())
                    .with_suggestion("Remove executable code from node parameters"),
                );
            }
        }
    }

    errors
}

/// Flatten string leaves of `value`, keyed by a dotted/indexed path.
fn collect_strings<'v>(path: &str, value: &'v serde_json::Value, out: &mut Vec<(String, &'v str)>) {
    match value {
        serde_json::Value::String(s) => out.push((path.to_string(), s.as_str())),
        serde_json::Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_strings(&format!("{}[{}]", path, i), item, out);
            }
        }
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                collect_strings(&format!("{}.{}", path, k), v, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_patterns_case_insensitively() {
        assert_eq!(suspicious_pattern("EVAL (x)"), Some("eval("));
        assert_eq!(suspicious_pattern("<SCRIPT>alert(1)"), Some("script>"));
        assert_eq!(suspicious_pattern("import   os"), Some("import os"));
        assert_eq!(suspicious_pattern("JavaScript:void(0)"), Some("javascript:"));
        assert_eq!(suspicious_pattern("RSI crosses 70"), None);
        assert_eq!(suspicious_pattern("evaluate"), None);
    }

    #[test]
    fn collects_nested_strings() {
        let value = serde_json::json!({ "rules": ["ok", { "expr": "exec(1)" }], "n": 3 });
        let mut out = Vec::new();
        collect_strings("root", &value, &mut out);
        let paths: Vec<&str> = out.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["root.rules[0]", "root.rules[1].expr"]);
    }
}
