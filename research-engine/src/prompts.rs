//! System prompts and prompt-size helpers

use chrono::{SecondsFormat, Utc};

/// System prompt for query expansion, extraction and feedback
pub fn research_system_prompt() -> String {
    format!(
        r#"You are an expert researcher. Today is {}. Follow these instructions when responding:
- You may be asked about subjects after your knowledge cutoff; assume the user is right when presented with news.
- The user is a highly experienced analyst. Do not simplify; be detailed and make sure your response is correct.
- Be highly organized and accurate.
- Suggest angles the user may not have considered and anticipate follow-up needs.
- Value good arguments over authorities.
- Consider new technologies and contrarian ideas, not just conventional wisdom.
- Speculation and prediction are welcome, but flag them as such."#,
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// System prompt for writing the final markdown report
pub fn report_system_prompt() -> String {
    format!(
        r#"You are an expert researcher and technical writer. Today is {}. Follow these instructions when responding:
- Write comprehensive, well-structured research reports in Markdown.
- Use hierarchical headings: # for the title, ## for main sections, ### for subsections.
- Include every learning you are given, organized into logical sections.
- Cite with numbered links to the Sources section, like [[1]](#ref1) or [[2]](#ref2). Reuse a number for the same source and place citations at the end of the sentence or paragraph they support.
- End with a numbered Sources section listing every URL you were given.
- Your output must be valid Markdown."#,
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Truncate `text` to at most `max_chars` characters
pub fn trim_prompt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Wrap each item in `<tag>` blocks, one per line group
pub(crate) fn tagged_blocks<S: AsRef<str>>(items: &[S], tag: &str) -> String {
    items
        .iter()
        .map(|item| format!("<{tag}>\n{}\n</{tag}>", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}
