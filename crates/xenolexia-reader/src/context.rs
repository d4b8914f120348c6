use xenolexia_core::text::TokenizedText;

/// Up to `radius` words on each side of the word at `position`, without
/// leaving its block. Punctuation between the words is kept.
pub fn context_window(tokens: &TokenizedText, source: &str, position: usize, radius: usize) -> String {
    let words = &tokens.tokens;
    let Some(center) = words.get(position) else {
        return String::new();
    };

    let mut first = position;
    while first > 0 && position - first < radius && words[first - 1].block == center.block {
        first -= 1;
    }
    let mut last = position;
    while last + 1 < words.len() && last - position < radius && words[last + 1].block == center.block
    {
        last += 1;
    }

    source[words[first].span.start..words[last].span.end]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
