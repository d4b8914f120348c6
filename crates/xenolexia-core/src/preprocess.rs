use unicode_normalization::UnicodeNormalization;

/// Separator between blocks (paragraphs) of prepared text
pub const BLOCK_SEPARATOR: &str = "\n\n";

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol", "blockquote",
    "section", "article", "tr", "td", "pre", "hr", "dt", "dd", "figcaption",
];

const SKIPPED_TAGS: &[&str] = &["script", "style", "head", "title"];

/// Turns chapter content into plain text blocks
pub trait Preprocessor {
    fn process(&self, content: &str) -> String {
        let text = if looks_like_markup(content) {
            strip_markup(content)
        } else {
            content.to_string()
        };

        // Unicode normalization (NFKC)
        let text: String = text.nfkc().collect();

        normalize_blocks(&text)
    }
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}

pub fn looks_like_markup(content: &str) -> bool {
    let Some(open) = content.find('<') else {
        return false;
    };
    content[open..].contains('>')
}

/// Lowercased, NFKC-normalized form used for dictionary matching
pub fn normalize_word(word: &str) -> String {
    word.trim()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .nfkc()
        .collect::<String>()
        .to_lowercase()
}

/// Collapse whitespace inside each block, drop empty blocks, join with a blank line
pub fn normalize_blocks(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut blocks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(collapse_whitespace(&current.join(" ")));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(collapse_whitespace(&current.join(" ")));
    }

    blocks.join(BLOCK_SEPARATOR)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove tags, decode entities, and turn block-level tags into blank lines
pub fn strip_markup(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    let mut skipping: Option<String> = None;

    while let Some(open) = rest.find('<') {
        if skipping.is_none() {
            push_decoded(&mut out, &rest[..open]);
        }
        let after = &rest[open + 1..];

        // Comments may contain '>'
        if after.starts_with("!--") {
            rest = match after.find("-->") {
                Some(end) => &after[end + 3..],
                None => "",
            };
            continue;
        }

        let Some(close) = after.find('>') else {
            // Unterminated tag, keep as text
            if skipping.is_none() {
                push_decoded(&mut out, &rest[open..]);
            }
            rest = "";
            break;
        };

        let tag = &after[..close];
        rest = &after[close + 1..];

        let is_closing = tag.starts_with('/');
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        if let Some(skipped) = &skipping {
            if is_closing && *skipped == name {
                skipping = None;
            }
            continue;
        }

        if !is_closing && !tag.ends_with('/') && SKIPPED_TAGS.contains(&name.as_str()) {
            skipping = Some(name);
            continue;
        }

        if BLOCK_TAGS.contains(&name.as_str()) {
            out.push_str(BLOCK_SEPARATOR);
        }
    }

    if skipping.is_none() {
        push_decoded(&mut out, rest);
    }

    out
}

fn push_decoded(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let entity_end = after
            .find(';')
            .filter(|end| *end > 0 && *end <= 10 && !after[..*end].contains(char::is_whitespace));

        match entity_end.and_then(|end| decode_entity(&after[..end]).map(|c| (end, c))) {
            Some((end, decoded)) => {
                out.push(decoded);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code);
    }

    let decoded = match entity.to_ascii_lowercase().as_str() {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "laquo" => '\u{00AB}',
        "raquo" => '\u{00BB}',
        _ => return None,
    };
    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_paragraphs() {
        let text = "First line\nwraps here.\r\n\r\n\n  Second   paragraph. ";
        assert_eq!(
            DefaultPreprocessor.process(text),
            "First line wraps here.\n\nSecond paragraph."
        );
    }

    #[test]
    fn test_strip_markup_blocks_and_entities() {
        let html = "<html><head><title>T</title><style>p{}</style></head><body>\
                    <h1>Chapter&nbsp;1</h1><p>Tom &amp; Jerry said &ldquo;hi&rdquo;.</p>\
                    <!-- note > here --><p>Next<br/>line &#233;t&#xE9;</p></body></html>";
        assert_eq!(
            DefaultPreprocessor.process(html),
            "Chapter 1\n\nTom & Jerry said \u{201C}hi\u{201D}.\n\nNext\n\nline été"
        );
    }

    #[test]
    fn test_unknown_entity_kept() {
        assert_eq!(strip_markup("a &bogus; b & c"), "a &bogus; b & c");
    }

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("  House, "), "house");
        assert_eq!(normalize_word("\u{FF21}pple"), "apple");
        assert_eq!(normalize_word("don't"), "don't");
    }
}
