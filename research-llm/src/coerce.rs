//! Best-effort coercion of free-text model replies into JSON values
//!
//! Each strategy is total: it either produces a value or `None`. Strategies are
//! tried from strictest to most permissive and the first hit wins.

use serde_json::{json, Value};

type Strategy = fn(&str) -> Option<Value>;

/// Strategies for replies that are expected to be a JSON object
const OBJECT_STRATEGIES: &[(&str, Strategy)] = &[
    ("strict", parse_strict),
    ("fenced", parse_fenced),
    ("brace_span", parse_brace_span),
    ("numbered_list", parse_numbered_list),
];

/// Strategies for replies that are expected to carry a markdown report
const REPORT_STRATEGIES: &[(&str, Strategy)] = &[
    ("strict", parse_strict),
    ("report_markdown", wrap_report_markdown),
];

/// Coerce a model reply into a JSON value.
///
/// With `expects_report` set, a reply that is not itself a JSON document is
/// taken verbatim as `{"reportMarkdown": <reply>}`.
pub fn coerce_object(content: &str, expects_report: bool) -> Option<(&'static str, Value)> {
    let strategies = if expects_report {
        REPORT_STRATEGIES
    } else {
        OBJECT_STRATEGIES
    };

    strategies
        .iter()
        .find_map(|(name, strategy)| strategy(content).map(|value| (*name, value)))
}

fn parse_json_document(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text.trim()).ok()? {
        value @ (Value::Object(_) | Value::Array(_)) => Some(value),
        _ => None,
    }
}

fn parse_strict(content: &str) -> Option<Value> {
    parse_json_document(content)
}

fn parse_fenced(content: &str) -> Option<Value> {
    let start = content.find("```json")? + 7;
    let end = content[start..].find("```")?;
    parse_json_document(&content[start..start + end])
}

fn parse_brace_span(content: &str) -> Option<Value> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_json_document(&content[start..=end])
}

fn parse_numbered_list(content: &str) -> Option<Value> {
    let pattern = regex::Regex::new(r"(?m)^\s*\d+\.\s*(.*)$").ok()?;
    let items: Vec<&str> = pattern
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(json!({ "questions": items }))
    }
}

fn wrap_report_markdown(content: &str) -> Option<Value> {
    Some(json!({ "reportMarkdown": content }))
}
