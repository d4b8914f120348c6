use std::fmt::Write;

use xenolexia_core::preprocess::BLOCK_SEPARATOR;
use xenolexia_engine::{ProcessedText, SubstitutionSpan};

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize processed text as paragraphs with one interactive element per substitution.
///
/// Marker `i` carries `data-index="i"`, matching the chapter's marker list.
pub fn render_markup(processed: &ProcessedText) -> String {
    let text = &processed.text;
    if text.trim().is_empty() {
        return String::new();
    }

    let offsets: Vec<usize> = text
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .collect();

    let mut out = String::with_capacity(text.len() * 2);
    out.push_str("<p>");
    let mut cursor = 0;

    for (index, span) in processed.spans.iter().enumerate() {
        let (Some(&start), Some(&end)) = (offsets.get(span.start_index), offsets.get(span.end_index))
        else {
            tracing::warn!("Span {} out of range, skipped", index);
            continue;
        };
        if start < cursor {
            continue;
        }
        push_text(&mut out, &text[cursor..start]);
        push_marker(&mut out, index, span);
        cursor = end;
    }
    push_text(&mut out, &text[cursor..]);
    out.push_str("</p>");

    out
}

fn push_text(out: &mut String, segment: &str) {
    for (i, block) in segment.split(BLOCK_SEPARATOR).enumerate() {
        if i > 0 {
            out.push_str("</p>\n<p>");
        }
        for (j, line) in block.split('\n').enumerate() {
            if j > 0 {
                out.push_str("<br>");
            }
            out.push_str(&escape_html(line));
        }
    }
}

fn push_marker(out: &mut String, index: usize, span: &SubstitutionSpan) {
    let entry = &span.entry;
    let _ = write!(
        out,
        r#"<span class="foreign-word" data-index="{}" data-original="{}" data-word-id="{}" data-pronunciation="{}" data-pos="{}">{}</span>"#,
        index,
        escape_html(&span.original_word),
        escape_html(&entry.id),
        escape_html(entry.pronunciation.as_deref().unwrap_or_default()),
        escape_html(entry.part_of_speech.as_deref().unwrap_or_default()),
        escape_html(&span.foreign_word),
    );
}
