use std::collections::HashMap;

use xenolexia_config::ReplacementConfig;
use xenolexia_core::text::TokenizedText;
use xenolexia_types::WordEntry;

use crate::engine::{ProcessedText, ReplacementStats, SubstitutionSpan};

/// Token positions picked for substitution, in passage order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub positions: Vec<usize>,
    pub eligible_words: usize,
}

/// Substitutions allowed in a sentence with `eligible` candidate words.
///
/// `round(eligible * density)` clamped to `1..=cap`, never more than `eligible`.
pub fn sentence_quota(eligible: usize, density: f64, cap: usize) -> usize {
    if eligible == 0 {
        return 0;
    }
    let target = (eligible as f64 * density).round() as usize;
    target.clamp(1, cap.max(1)).min(eligible)
}

/// Pick substitutions sentence by sentence, left to right.
///
/// `resolved` maps normalized words to entries that already passed the
/// proficiency filter. Spacing is measured in word positions across the whole
/// passage, so the first pick of a sentence also respects the last pick of the
/// previous one.
pub fn select_candidates(
    text: &TokenizedText,
    resolved: &HashMap<String, WordEntry>,
    config: &ReplacementConfig,
) -> Selection {
    let protected = config.normalized_protected_words();
    let cap = config.sentence_cap();
    let mut selection = Selection::default();
    let mut last_pick: Option<usize> = None;

    for sentence in &text.sentences {
        let eligible: Vec<usize> = text
            .sentence_tokens(sentence)
            .iter()
            .filter(|t| resolved.contains_key(&t.normalized) && !protected.contains(&t.normalized))
            .map(|t| t.position)
            .collect();
        selection.eligible_words += eligible.len();

        let quota = sentence_quota(eligible.len(), config.density, cap);
        let mut taken = 0;

        for position in eligible {
            if taken == quota {
                break;
            }
            if last_pick.is_some_and(|last| position - last < config.min_word_spacing) {
                continue;
            }
            selection.positions.push(position);
            last_pick = Some(position);
            taken += 1;
        }
    }

    selection
}

/// Rewrite `source` with the selected words swapped for their translations
pub fn apply_selection(
    source: &str,
    text: &TokenizedText,
    resolved: &HashMap<String, WordEntry>,
    selection: &Selection,
) -> ProcessedText {
    let mut out = String::with_capacity(source.len());
    let mut spans = Vec::with_capacity(selection.positions.len());
    let mut cursor = 0;
    let mut chars_out = 0;

    for &position in &selection.positions {
        let Some(token) = text.tokens.get(position) else {
            continue;
        };
        let Some(entry) = resolved.get(&token.normalized) else {
            continue;
        };

        let before = &source[cursor..token.span.start];
        out.push_str(before);
        chars_out += before.chars().count();

        let foreign = match_case(&token.surface, &entry.target_word);
        let length = foreign.chars().count();
        out.push_str(&foreign);

        spans.push(SubstitutionSpan {
            original_word: token.surface.clone(),
            foreign_word: foreign,
            start_index: chars_out,
            end_index: chars_out + length,
            position,
            sentence: token.sentence,
            block: token.block,
            entry: entry.clone(),
        });

        chars_out += length;
        cursor = token.span.end;
    }
    out.push_str(&source[cursor..]);

    ProcessedText {
        text: out,
        stats: ReplacementStats {
            total_words: text.word_count(),
            eligible_words: selection.eligible_words,
            replaced_words: spans.len(),
        },
        spans,
    }
}

/// Carry the original's capitalization over to the translation
pub fn match_case(original: &str, foreign: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    match letters.first() {
        Some(first) if first.is_uppercase() => {}
        _ => return foreign.to_string(),
    }

    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return foreign.to_uppercase();
    }

    let mut chars = foreign.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use xenolexia_core::text::tokenize;
    use xenolexia_types::ProficiencyLevel;

    use super::*;

    const WORDS: [&str; 12] = [
        "river", "forest", "window", "garden", "bread", "candle", "mirror", "valley", "stone",
        "winter", "letter", "market",
    ];

    fn resolved() -> HashMap<String, WordEntry> {
        WORDS
            .iter()
            .map(|w| {
                let entry = WordEntry {
                    id: format!("en_es_{w}"),
                    source_word: w.to_string(),
                    target_word: format!("ñ{w}"),
                    source_language: "en".into(),
                    target_language: "es".into(),
                    proficiency_level: ProficiencyLevel::Beginner,
                    frequency_rank: 10,
                    part_of_speech: None,
                    variants: Vec::new(),
                    pronunciation: None,
                };
                (w.to_string(), entry)
            })
            .collect()
    }

    /// `sentences` sentences of `length` dictionary words each
    fn passage(sentences: usize, length: usize) -> String {
        (0..sentences)
            .map(|s| {
                let words: Vec<&str> = (0..length).map(|i| WORDS[(s * 7 + i) % WORDS.len()]).collect();
                format!("{}.", words.join(" "))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn config(density: f64, spacing: usize) -> ReplacementConfig {
        ReplacementConfig {
            density,
            min_word_spacing: spacing,
            ..Default::default()
        }
    }

    #[test]
    fn test_sentence_quota_bounds() {
        assert_eq!(sentence_quota(0, 0.5, 5), 0);
        assert_eq!(sentence_quota(10, 0.3, 5), 3);
        assert_eq!(sentence_quota(2, 0.1, 5), 1);
        assert_eq!(sentence_quota(40, 0.9, 5), 5);
        assert_eq!(sentence_quota(2, 0.9, 5), 2);
        assert_eq!(sentence_quota(40, 0.9, 2), 2);
    }

    #[test]
    fn test_long_sentences_get_one_to_five() {
        let resolved = resolved();
        for density in [0.05, 0.3, 0.6, 0.95] {
            for length in [6, 9, 25, 60] {
                let source = passage(4, length);
                let text = tokenize(&source);
                let selection = select_candidates(&text, &resolved, &config(density, 0));

                for sentence in &text.sentences {
                    let picked = selection
                        .positions
                        .iter()
                        .filter(|p| text.tokens[**p].sentence == sentence.index)
                        .count();
                    assert!(
                        (1..=5).contains(&picked),
                        "density {density}, length {length}: {picked} picks"
                    );
                }
            }
        }
    }

    #[test]
    fn test_spacing_is_respected() {
        let resolved = resolved();
        let source = passage(12, 14);
        let text = tokenize(&source);

        for spacing in 0..6 {
            let selection = select_candidates(&text, &resolved, &config(0.9, spacing));
            assert!(!selection.positions.is_empty());
            for pair in selection.positions.windows(2) {
                assert!(pair[1] - pair[0] >= spacing, "spacing {spacing}: {pair:?}");
            }
        }
    }

    #[test]
    fn test_density_approximates_target() {
        let resolved = resolved();
        let source = passage(20, 10);
        let text = tokenize(&source);
        let selection = select_candidates(&text, &resolved, &config(0.3, 0));
        let processed = apply_selection(&source, &text, &resolved, &selection);

        assert_eq!(processed.stats.eligible_words, 200);
        assert_eq!(processed.stats.replaced_words, 60);
        assert!((processed.stats.achieved_density() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_protected_words_never_replaced() {
        let resolved = resolved();
        let source = passage(6, 12);
        let text = tokenize(&source);

        let mut config = config(0.9, 0);
        config.protected_words.insert("River".into());
        config.protected_words.insert("stone".into());

        let selection = select_candidates(&text, &resolved, &config);
        let processed = apply_selection(&source, &text, &resolved, &selection);
        assert!(!processed.spans.is_empty());
        for span in &processed.spans {
            assert_ne!(span.original_word.to_lowercase(), "river");
            assert_ne!(span.original_word.to_lowercase(), "stone");
        }
    }

    #[test]
    fn test_unresolved_sentence_gets_nothing() {
        let resolved = resolved();
        let source = "Nothing here matches anything at all. The river runs.";
        let text = tokenize(source);
        let selection = select_candidates(&text, &resolved, &config(0.3, 0));
        assert_eq!(selection.positions.len(), 1);
        assert_eq!(text.tokens[selection.positions[0]].surface, "river");
    }

    #[test]
    fn test_spans_index_processed_text() {
        let resolved = resolved();
        let source = "Café owners love the river. Every garden needs bread!";
        let text = tokenize(source);
        let selection = select_candidates(&text, &resolved, &config(0.9, 0));
        let processed = apply_selection(source, &text, &resolved, &selection);

        let chars: Vec<char> = processed.text.chars().collect();
        assert_eq!(processed.spans.len(), 3);
        for span in &processed.spans {
            let slice: String = chars[span.start_index..span.end_index].iter().collect();
            assert_eq!(slice, span.foreign_word);
        }
        assert_eq!(
            processed.text,
            "Café owners love the ñriver. Every ñgarden needs ñbread!"
        );
    }

    #[test]
    fn test_selection_is_deterministic() {
        let resolved = resolved();
        let source = passage(15, 11);
        let text = tokenize(&source);
        let config = config(0.4, 2);

        let first = apply_selection(
            &source,
            &text,
            &resolved,
            &select_candidates(&text, &resolved, &config),
        );
        let second = apply_selection(
            &source,
            &text,
            &resolved,
            &select_candidates(&text, &resolved, &config),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_match_case() {
        assert_eq!(match_case("River", "río"), "Río");
        assert_eq!(match_case("river", "río"), "río");
        assert_eq!(match_case("NASA", "nasa"), "NASA");
        assert_eq!(match_case("Über", "über"), "Über");
        assert_eq!(match_case("RIVER", "río"), "RÍO");
        assert_eq!(match_case("River", ""), "");
    }
}
