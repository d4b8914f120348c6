use std::ops::Range;

use crate::preprocess::normalize_word;

/// A word in prepared text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub surface: String,
    pub normalized: String,
    /// Index in the passage's word stream
    pub position: usize,
    pub sentence: usize,
    pub block: usize,
    /// Byte range in the source text
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub index: usize,
    pub block: usize,
    /// Range into `TokenizedText::tokens`
    pub tokens: Range<usize>,
}

impl Sentence {
    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TokenizedText {
    pub tokens: Vec<Token>,
    pub sentences: Vec<Sentence>,
}

impl TokenizedText {
    pub fn sentence_tokens(&self, sentence: &Sentence) -> &[Token] {
        &self.tokens[sentence.tokens.clone()]
    }

    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Apostrophes and hyphens join two word characters ("don't", "well-known")
fn is_joiner(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '-')
}

fn is_sentence_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\u{2026}' | '\u{3002}' | '\u{FF01}' | '\u{FF1F}')
}

struct Builder {
    tokens: Vec<Token>,
    sentences: Vec<Sentence>,
    sentence_start: usize,
    block: usize,
    block_has_words: bool,
}

impl Builder {
    fn close_sentence(&mut self) {
        if self.tokens.len() > self.sentence_start {
            self.sentences.push(Sentence {
                index: self.sentences.len(),
                block: self.block,
                tokens: self.sentence_start..self.tokens.len(),
            });
            self.sentence_start = self.tokens.len();
        }
    }

    fn close_block(&mut self) {
        self.close_sentence();
        if self.block_has_words {
            self.block += 1;
            self.block_has_words = false;
        }
    }

    fn push_word(&mut self, text: &str, span: Range<usize>) {
        let surface = &text[span.clone()];
        self.tokens.push(Token {
            surface: surface.to_string(),
            normalized: normalize_word(surface),
            position: self.tokens.len(),
            sentence: self.sentences.len(),
            block: self.block,
            span,
        });
        self.block_has_words = true;
    }
}

/// Split text into sentence-bounded word runs.
///
/// Sentences end at terminal punctuation or at a blank line; a blank line also
/// starts a new block. Positions count words only, so punctuation never widens
/// the distance between two words.
pub fn tokenize(text: &str) -> TokenizedText {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut builder = Builder {
        tokens: Vec::new(),
        sentences: Vec::new(),
        sentence_start: 0,
        block: 0,
        block_has_words: false,
    };

    let byte_at = |i: usize| chars.get(i).map_or(text.len(), |(b, _)| *b);
    let mut newlines = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i].1;

        if is_word_char(c) {
            let start = i;
            let mut end = i + 1;
            while end < chars.len() {
                let next = chars[end].1;
                if is_word_char(next) {
                    end += 1;
                } else if is_joiner(next)
                    && chars.get(end + 1).is_some_and(|(_, after)| is_word_char(*after))
                {
                    end += 2;
                } else {
                    break;
                }
            }
            builder.push_word(text, byte_at(start)..byte_at(end));
            newlines = 0;
            i = end;
            continue;
        }

        if c == '\n' {
            newlines += 1;
            if newlines >= 2 {
                builder.close_block();
            }
        } else if !c.is_whitespace() {
            newlines = 0;
            if is_sentence_terminal(c) {
                builder.close_sentence();
            }
        }
        i += 1;
    }
    builder.close_sentence();

    TokenizedText {
        tokens: builder.tokens,
        sentences: builder.sentences,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surfaces(text: &TokenizedText) -> Vec<&str> {
        text.tokens.iter().map(|t| t.surface.as_str()).collect()
    }

    #[test]
    fn test_words_and_joiners() {
        let text = tokenize("Don't stop the well-known -- band, 'ok'.");
        assert_eq!(
            surfaces(&text),
            vec!["Don't", "stop", "the", "well-known", "band", "ok"]
        );
        assert_eq!(text.tokens[0].normalized, "don't");
        assert_eq!(text.sentences.len(), 1);
    }

    #[test]
    fn test_sentences_and_blocks() {
        let text = tokenize("One two. Three four! Five?\n\nSix seven\nEight.");
        assert_eq!(text.sentences.len(), 4);
        assert_eq!(text.sentences[0].word_count(), 2);
        assert_eq!(text.sentences[2].word_count(), 1);
        assert_eq!(text.sentences[3].word_count(), 3);
        assert_eq!(text.sentences[3].block, 1);
        assert_eq!(text.tokens[5].surface, "Six");
        assert_eq!(text.tokens[5].block, 1);
        assert_eq!(text.tokens[5].sentence, 3);
        assert_eq!(text.tokens[5].position, 5);
    }

    #[test]
    fn test_blank_line_closes_sentence_without_punctuation() {
        let text = tokenize("A heading\n\nBody text here.");
        assert_eq!(text.sentences.len(), 2);
        assert_eq!(text.sentence_tokens(&text.sentences[0]).len(), 2);
    }

    #[test]
    fn test_spans_are_byte_ranges() {
        let source = "Café con leche.";
        let text = tokenize(source);
        assert_eq!(&source[text.tokens[0].span.clone()], "Café");
        assert_eq!(&source[text.tokens[2].span.clone()], "leche");
    }

    #[test]
    fn test_empty_text() {
        let text = tokenize("  ...  ");
        assert!(text.tokens.is_empty());
        assert!(text.sentences.is_empty());
    }
}
