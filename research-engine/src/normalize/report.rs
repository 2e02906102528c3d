//! Report normalization: dispatch on the shape of the generated report

use serde_json::{Map, Value};

use super::{title_case, value_text};

const DEFAULT_TITLE: &str = "Research Report";

/// Deepest heading level used when rendering nested objects (`####`)
const MAX_HEADING_LEVEL: usize = 4;

/// Recognized shapes of a generated report, probed in declaration order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportShape<'a> {
    /// `{"content": ...}`
    Content(&'a Value),
    /// `{"reportMarkdown": "..."}`, the requested shape
    Markdown(&'a Value),
    /// Flat object titled by `reportTitle`, every other key a section
    Titled(&'a Map<String, Value>),
    /// `{"final_report": "..." | {...}}`
    FinalReport(&'a Value),
    /// `{"report": "..." | {...}}`
    Report(&'a Value),
    /// `{"title": ..., "sections": [{"section_title", "content"}]}`
    Sections(&'a Map<String, Value>),
    /// `{"title": ..., "pages": [{"pageNumber", "content"}]}`
    Pages(&'a Map<String, Value>),
    /// The reply is itself a string
    Text(&'a str),
    /// Nothing recognizable
    Unrecognized,
}

impl<'a> ReportShape<'a> {
    /// Identify the shape of `raw` by its most distinctive key
    pub fn detect(raw: &'a Value) -> Self {
        let map = match raw {
            Value::Object(map) => map,
            Value::String(text) => return ReportShape::Text(text),
            _ => return ReportShape::Unrecognized,
        };

        if let Some(v) = map.get("content") {
            ReportShape::Content(v)
        } else if let Some(v) = map.get("reportMarkdown") {
            ReportShape::Markdown(v)
        } else if map.contains_key("reportTitle") {
            ReportShape::Titled(map)
        } else if let Some(v) = map.get("final_report") {
            ReportShape::FinalReport(v)
        } else if let Some(v) = map.get("report") {
            ReportShape::Report(v)
        } else if map.contains_key("sections") {
            ReportShape::Sections(map)
        } else if map.contains_key("pages") {
            ReportShape::Pages(map)
        } else {
            ReportShape::Unrecognized
        }
    }

    /// Render this shape to markdown. May be empty.
    pub fn render(&self) -> String {
        match self {
            ReportShape::Content(v)
            | ReportShape::Markdown(v)
            | ReportShape::FinalReport(v)
            | ReportShape::Report(v) => render_nested(v, "title"),
            ReportShape::Titled(map) => render_titled(map, "reportTitle"),
            ReportShape::Sections(map) => render_sections(map),
            ReportShape::Pages(map) => render_pages(map),
            ReportShape::Text(text) => text.to_string(),
            ReportShape::Unrecognized => String::new(),
        }
    }
}

/// A string is taken as markdown, an object is rendered as a titled report
fn render_nested(value: &Value, title_key: &str) -> String {
    match value {
        Value::Object(map) => render_titled(map, title_key),
        other => value_text(other),
    }
}

fn text_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key).map(value_text).unwrap_or_default()
}

fn push_title(out: &mut String, map: &Map<String, Value>, title_key: &str) {
    let title = text_field(map, title_key);
    let title = if title.trim().is_empty() {
        DEFAULT_TITLE
    } else {
        title.trim()
    };
    out.push_str(&format!("# {}\n\n", title));
}

fn push_text_section(out: &mut String, map: &Map<String, Value>, key: &str) {
    let text = text_field(map, key);
    if !text.trim().is_empty() {
        out.push_str(&format!("## {}\n\n{}\n\n", title_case(key), text));
    }
}

fn render_titled(map: &Map<String, Value>, title_key: &str) -> String {
    let mut out = String::new();
    push_title(&mut out, map, title_key);
    push_text_section(&mut out, map, "introduction");

    for (key, value) in map {
        if key == title_key || key == "introduction" || key == "conclusion" {
            continue;
        }
        push_section(&mut out, key, value, 2);
    }

    push_text_section(&mut out, map, "conclusion");
    out
}

/// Render one keyed value as a heading of `level` plus its body.
///
/// Objects nest one heading level per layer down to `####`, below which they
/// are rendered as compact JSON.
fn push_section(out: &mut String, key: &str, value: &Value, level: usize) {
    let heading = "#".repeat(level);
    let title = title_case(key);

    match value {
        Value::Null => {}
        Value::Object(children) if level < MAX_HEADING_LEVEL => {
            out.push_str(&format!("{} {}\n\n", heading, title));
            for (child_key, child) in children {
                push_section(out, child_key, child, level + 1);
            }
        }
        Value::Array(items) => {
            out.push_str(&format!("{} {}\n\n", heading, title));
            for item in items {
                out.push_str(&format!("- {}\n", value_text(item)));
            }
            out.push('\n');
        }
        other => {
            out.push_str(&format!("{} {}\n\n{}\n\n", heading, title, value_text(other)));
        }
    }
}

fn render_sections(map: &Map<String, Value>) -> String {
    let mut out = String::new();
    push_title(&mut out, map, "title");
    push_text_section(&mut out, map, "introduction");

    let sections = map.get("sections").and_then(Value::as_array);
    for section in sections.into_iter().flatten() {
        match section {
            Value::Object(s) => {
                let heading = ["section_title", "heading", "title"]
                    .iter()
                    .map(|k| text_field(s, k))
                    .find(|t| !t.trim().is_empty())
                    .unwrap_or_default();
                let content = ["content", "text"]
                    .iter()
                    .map(|k| text_field(s, k))
                    .find(|t| !t.trim().is_empty())
                    .unwrap_or_default();
                out.push_str(&format!("## {}\n\n{}\n\n", heading, content));
            }
            other => out.push_str(&format!("{}\n\n", value_text(other))),
        }
    }

    push_text_section(&mut out, map, "conclusion");
    out
}

fn render_pages(map: &Map<String, Value>) -> String {
    let mut out = String::new();
    push_title(&mut out, map, "title");
    push_text_section(&mut out, map, "introduction");

    let pages = map.get("pages").and_then(Value::as_array);
    for (index, page) in pages.into_iter().flatten().enumerate() {
        match page {
            Value::Object(p) => {
                let number = text_field(p, "pageNumber");
                let number = if number.is_empty() {
                    (index + 1).to_string()
                } else {
                    number
                };
                out.push_str(&format!("## Page {}\n\n{}\n\n", number, text_field(p, "content")));
            }
            other => out.push_str(&format!("{}\n\n", value_text(other))),
        }
    }

    push_text_section(&mut out, map, "conclusion");
    out
}

fn fallback_report(learnings: &[String]) -> String {
    let mut out = format!("# {}\n\n## Key Findings\n\n", DEFAULT_TITLE);
    for learning in learnings {
        out.push_str(&format!("- {}\n", learning));
    }
    out
}

fn has_sources_section(report: &str) -> bool {
    report.lines().any(|line| {
        let line = line.trim();
        line.starts_with('#') && line.trim_start_matches('#').trim().eq_ignore_ascii_case("sources")
    })
}

/// Numbered source list; entry `n` carries the `refn` anchor targeted by `[n](#refn)` citations
pub fn sources_section(visited_urls: &[String]) -> String {
    let mut out = String::from("## Sources\n\n");
    if visited_urls.is_empty() {
        out.push_str("_No sources were visited._\n");
    }
    for (i, url) in visited_urls.iter().enumerate() {
        let n = i + 1;
        out.push_str(&format!("{}. <a id=\"ref{}\"></a>[{}]({})\n", n, n, url, url));
    }
    out
}

/// Turn whatever the generation service returned for a report into markdown.
///
/// Falls back to a "Key Findings" list of `learnings` when nothing usable was
/// returned, and appends a Sources section when the document has none.
pub fn normalize_report(raw: &Value, learnings: &[String], visited_urls: &[String]) -> String {
    let mut report = ReportShape::detect(raw).render();

    if report.trim().is_empty() {
        report = fallback_report(learnings);
    }

    if !has_sources_section(&report) {
        report = format!("{}\n\n{}", report.trim_end(), sources_section(visited_urls));
    }

    report
}
