use std::ops::Range;

use regex::Regex;

use crate::patterns::{is_blank, Patterns};

/// The refinement levels of the tokenizer, coarsest first.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub(crate) enum Level {
    Paragraph,
    Line,
    Sentence,
    Chunk,
    Word,
    Character,
}

impl Level {
    /// Splits a string into consecutive byte ranges.
    ///
    /// Pattern matches become ranges and so does the text between them, so the
    /// ranges always cover the full input.
    pub fn split(self, text: &str, patterns: &Patterns) -> Vec<Range<usize>> {
        let matches = match self {
            Level::Paragraph => find_all(&patterns.paragraph, text),
            Level::Line => find_all(&patterns.line, text),
            Level::Sentence => find_sentences(&patterns.sentence, text),
            Level::Chunk => find_all(&patterns.chunk, text),
            Level::Word => find_all(&patterns.word, text),
            Level::Character => {
                return text
                    .char_indices()
                    .map(|(idx, c)| idx..idx + c.len_utf8())
                    .collect();
            }
        };

        let mut rv = Vec::with_capacity(matches.len() * 2 + 1);
        let mut last_end = 0;
        for m in matches {
            if m.start > last_end {
                rv.push(last_end..m.start);
            }
            last_end = m.end;
            rv.push(m);
        }
        if last_end < text.len() {
            rv.push(last_end..text.len());
        }
        rv
    }
}

fn find_all(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.range()).collect()
}

/// Sentences end before the blank that follows their punctuation.
fn find_sentences(re: &Regex, text: &str) -> Vec<Range<usize>> {
    let mut rv = Vec::new();
    let mut pos = 0;
    while pos < text.len() {
        let Some(m) = re.find_at(text, pos) else {
            break;
        };
        let mut end = m.end();
        if let Some(c) = m.as_str().chars().next_back() {
            if is_blank(c) {
                end -= c.len_utf8();
            }
        }
        rv.push(m.start()..end);
        pos = end;
    }
    rv
}

#[cfg(test)]
fn pieces(level: Level, text: &str) -> Vec<&str> {
    level
        .split(text, Patterns::get())
        .into_iter()
        .map(|r| &text[r])
        .collect()
}

#[test]
fn test_split_paragraphs_and_lines() {
    assert_eq!(
        pieces(Level::Paragraph, "a\nb\n\nc"),
        vec!["a\nb", "\n\n", "c"]
    );
    assert_eq!(pieces(Level::Line, "a\r\nb\n"), vec!["a", "\r\n", "b", "\n"]);
    assert_eq!(pieces(Level::Line, "no breaks"), vec!["no breaks"]);
}

#[test]
fn test_split_sentences() {
    assert_eq!(
        pieces(Level::Sentence, "One. Two! Three"),
        vec!["One.", " ", "Two!", " Three"]
    );
    assert_eq!(pieces(Level::Sentence, "Done."), vec!["Done."]);
}

#[test]
fn test_split_chunks() {
    assert_eq!(
        pieces(Level::Chunk, "see [[Main Page]] and {{cite}}"),
        vec!["see ", "[[Main Page]]", " and ", "{{cite}}"]
    );
}

#[test]
fn test_split_words() {
    assert_eq!(
        pieces(Level::Word, "don't [[x]]\nok"),
        vec!["don't", " ", "[[", "x", "]]", "\n", "ok"]
    );
    assert_eq!(
        pieces(Level::Word, "==Title== ''x"),
        vec!["==", "Title", "==", " ", "''", "x"]
    );
}

#[test]
fn test_split_characters() {
    assert_eq!(pieces(Level::Character, "añb"), vec!["a", "ñ", "b"]);
    assert!(pieces(Level::Character, "").is_empty());
}
