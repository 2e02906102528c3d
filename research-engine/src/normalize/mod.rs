//! Reconciliation of loosely-typed generation output into canonical data
//!
//! The generation service does not guarantee that its reply matches the
//! requested schema. Everything here is total: any input produces some output.

mod report;

pub use report::{normalize_report, ReportShape};

use research_core::ResearchQuery;
use serde_json::Value;

const LEARNING_KEYS: &[&str] = &["learnings", "findings"];
const FOLLOW_UP_KEYS: &[&str] = &["followUpQuestions", "follow_up_questions", "questions"];
const QUERY_LIST_KEYS: &[&str] = &["queries", "serpQueries", "serp_queries"];
const QUERY_TEXT_KEYS: &[&str] = &["query", "text", "search_query", "searchQuery"];
const QUERY_GOAL_KEYS: &[&str] = &["researchGoal", "research_goal", "goal"];

/// Render any JSON value as plain text: strings verbatim, null as empty,
/// everything else as compact JSON.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Normalize one learning into a single string
pub fn normalize_learning(raw: &Value) -> String {
    if let Value::Object(map) = raw {
        if let Some(title) = map.get("title") {
            if let Some(details) = map.get("details").or_else(|| map.get("description")) {
                return format!("{}: {}", value_text(title), value_text(details));
            }
        }
    }
    value_text(raw)
}

/// Normalize a list of learnings, preserving length and order.
///
/// Duplicates are kept; deduplication happens when branch results are merged.
pub fn normalize_learnings(raw: &[Value]) -> Vec<String> {
    raw.iter().map(normalize_learning).collect()
}

/// First array found under one of `keys`, or the value itself if it is an array
fn probe_array<'a>(raw: &'a Value, keys: &[&str]) -> &'a [Value] {
    if let Value::Array(items) = raw {
        return items;
    }
    keys.iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Raw learning elements of an extraction reply
pub fn learning_items(raw: &Value) -> &[Value] {
    probe_array(raw, LEARNING_KEYS)
}

/// Follow-up (or clarifying) questions of a reply, as non-empty strings
pub fn question_items(raw: &Value) -> Vec<String> {
    normalize_learnings(probe_array(raw, FOLLOW_UP_KEYS))
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect()
}

fn first_text(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .map(value_text)
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

/// Search queries of an expansion reply, in reply order.
///
/// Elements may be objects with drifting key names or bare strings; elements
/// without any query text are skipped.
pub fn normalize_queries(raw: &Value) -> Vec<ResearchQuery> {
    probe_array(raw, QUERY_LIST_KEYS)
        .iter()
        .filter_map(|item| match item {
            Value::String(text) if !text.trim().is_empty() => {
                Some(ResearchQuery::new(text.trim(), ""))
            }
            Value::Object(map) => {
                let text = first_text(map, QUERY_TEXT_KEYS)?;
                let goal = first_text(map, QUERY_GOAL_KEYS).unwrap_or_default();
                Some(ResearchQuery::new(text, goal))
            }
            _ => None,
        })
        .collect()
}

/// Turn a `snake_case`, `kebab-case` or `camelCase` key into a Title Case heading
pub fn title_case(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
