//! Token lists for one version of a text.
//!
//! A [`TextVersion`] owns an arena of tokens that form a doubly linked list in
//! text order.  Tokens reference their string as a byte range of the version
//! text, so refining a token never copies text.  Refinement replaces a token by
//! its pieces in place; the replaced arena slot is simply no longer reachable
//! from the list.
use std::collections::HashMap;

mod tokenizer;

pub(crate) use self::tokenizer::Level;

use crate::error::DiffError;
use crate::patterns::Patterns;

/// A single token of a text version.
#[derive(Clone, Debug, Default)]
pub(crate) struct Token {
    pub start: usize,
    pub end: usize,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    /// Index of the matching token in the other version.
    pub link: Option<usize>,
    /// Position in list order, assigned by [`TextVersion::enumerate`].
    pub number: usize,
    pub unique: bool,
}

/// One version of the text together with its token list.
#[derive(Clone, Debug)]
pub(crate) struct TextVersion<'s> {
    text: &'s str,
    pub tokens: Vec<Token>,
    pub first: Option<usize>,
    pub last: Option<usize>,
    words: HashMap<&'s str, usize>,
}

impl<'s> TextVersion<'s> {
    /// Creates an untokenized version and counts its words and chunks.
    pub fn new(text: &'s str, patterns: &Patterns) -> TextVersion<'s> {
        let mut words = HashMap::new();
        for word in patterns.words_and_chunks(text) {
            *words.entry(word).or_insert(0) += 1;
        }
        TextVersion {
            text,
            tokens: Vec::new(),
            first: None,
            last: None,
            words,
        }
    }

    /// Returns the full text.
    pub fn text(&self) -> &'s str {
        self.text
    }

    /// Returns the string of a token.
    pub fn value(&self, idx: usize) -> &'s str {
        let token = &self.tokens[idx];
        &self.text[token.start..token.end]
    }

    /// Returns the text spanned by a run of tokens, both ends inclusive.
    pub fn span(&self, first: usize, last: usize) -> &'s str {
        &self.text[self.tokens[first].start..self.tokens[last].end]
    }

    /// How often a word or chunk occurs in the full text.
    pub fn word_count(&self, word: &str) -> usize {
        self.words.get(word).copied().unwrap_or(0)
    }

    pub fn is_linked(&self, idx: usize) -> bool {
        self.tokens[idx].link.is_some()
    }

    /// Iterates over the token indices in list order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.first, move |&idx| self.tokens[idx].next)
    }

    /// Splits the whole text or a single token at the given level.
    ///
    /// Without a token the list is initialized from the full text.  With a
    /// token its pieces are spliced into the list at its position.
    pub fn split(&mut self, level: Level, token: Option<usize>, patterns: &Patterns) {
        let (offset, end, mut prev, next) = match token {
            Some(idx) => {
                let token = &self.tokens[idx];
                (token.start, token.end, token.prev, token.next)
            }
            None => (0, self.text.len(), None, None),
        };

        let pieces = level.split(&self.text[offset..end], patterns);
        if pieces.is_empty() || (token.is_some() && pieces.len() == 1) {
            return;
        }

        let first_piece = self.tokens.len();
        for piece in pieces {
            let current = self.tokens.len();
            self.tokens.push(Token {
                start: offset + piece.start,
                end: offset + piece.end,
                prev,
                ..Token::default()
            });
            if let Some(prev) = prev {
                self.tokens[prev].next = Some(current);
            }
            prev = Some(current);
        }

        match token {
            Some(idx) => {
                if let Some(last_piece) = prev {
                    self.tokens[last_piece].next = next;
                }
                if let Some(next) = next {
                    self.tokens[next].prev = prev;
                }
                if self.first == Some(idx) {
                    self.first = Some(first_piece);
                }
                if self.last == Some(idx) {
                    self.last = prev;
                }
            }
            None => {
                self.first = Some(first_piece);
                self.last = prev;
            }
        }
    }

    /// Splits every unlinked token at the given level.
    pub fn refine(&mut self, level: Level, patterns: &Patterns) {
        let mut idx = self.first;
        while let Some(current) = idx {
            if self.tokens[current].link.is_none() {
                self.split(level, Some(current), patterns);
            }
            // a replaced token still points at its old successor
            idx = self.tokens[current].next;
        }
    }

    /// Numbers the tokens in list order.
    pub fn enumerate(&mut self) {
        let mut number = 0;
        let mut idx = self.first;
        while let Some(current) = idx {
            self.tokens[current].number = number;
            number += 1;
            idx = self.tokens[current].next;
        }
    }

    /// Verifies that the list is acyclic and every link is mirrored by `other`.
    pub fn check_links(&self, other: &TextVersion<'_>) -> Result<(), DiffError> {
        let mut visited = 0;
        let mut idx = self.first;
        while let Some(current) = idx {
            visited += 1;
            if current >= self.tokens.len() || visited > self.tokens.len() {
                return Err(DiffError::BrokenList { index: current });
            }
            if let Some(link) = self.tokens[current].link {
                if other.tokens.get(link).and_then(|t| t.link) != Some(current) {
                    return Err(DiffError::BrokenLink {
                        index: current,
                        link,
                    });
                }
            }
            idx = self.tokens[current].next;
        }
        Ok(())
    }
}

/// Links two tokens of different versions with each other.
pub(crate) fn connect(new: &mut TextVersion<'_>, new_idx: usize, old: &mut TextVersion<'_>, old_idx: usize) {
    new.tokens[new_idx].link = Some(old_idx);
    old.tokens[old_idx].link = Some(new_idx);
}

#[cfg(test)]
fn values<'s>(text: &TextVersion<'s>) -> Vec<&'s str> {
    text.iter().map(|idx| text.value(idx)).collect()
}

#[test]
fn test_split_and_refine() {
    let patterns = Patterns::get();
    let mut text = TextVersion::new("one two\nthree", patterns);
    text.split(Level::Line, None, patterns);
    assert_eq!(values(&text), vec!["one two", "\n", "three"]);

    text.refine(Level::Word, patterns);
    assert_eq!(values(&text), vec!["one", " ", "two", "\n", "three"]);
    assert_eq!(text.value(text.first.unwrap()), "one");
    assert_eq!(text.value(text.last.unwrap()), "three");

    let backwards = std::iter::successors(text.last, |&idx| text.tokens[idx].prev)
        .map(|idx| text.value(idx))
        .collect::<Vec<_>>();
    assert_eq!(backwards, vec!["three", "\n", "two", " ", "one"]);
}

#[test]
fn test_refine_skips_linked_tokens() {
    let patterns = Patterns::get();
    let mut old = TextVersion::new("a b\nc d", patterns);
    let mut new = TextVersion::new("a b\nc d", patterns);
    old.split(Level::Line, None, patterns);
    new.split(Level::Line, None, patterns);
    let (first_new, first_old) = (new.first.unwrap(), old.first.unwrap());
    connect(&mut new, first_new, &mut old, first_old);

    new.refine(Level::Word, patterns);
    assert_eq!(values(&new), vec!["a b", "\n", "c", " ", "d"]);
    assert!(new.check_links(&old).is_ok());
    assert!(old.check_links(&new).is_ok());
}

#[test]
fn test_enumerate_and_word_counts() {
    let patterns = Patterns::get();
    let mut text = TextVersion::new("a b a", patterns);
    text.split(Level::Word, None, patterns);
    text.enumerate();
    let numbers = text
        .iter()
        .map(|idx| text.tokens[idx].number)
        .collect::<Vec<_>>();
    assert_eq!(numbers, vec![0, 1, 2, 3, 4]);
    assert_eq!(text.word_count("a"), 2);
    assert_eq!(text.word_count("b"), 1);
    assert_eq!(text.word_count("c"), 0);
}

#[test]
fn test_broken_link_detected() {
    let patterns = Patterns::get();
    let mut old = TextVersion::new("x", patterns);
    let mut new = TextVersion::new("x", patterns);
    old.split(Level::Word, None, patterns);
    new.split(Level::Word, None, patterns);
    new.tokens[0].link = Some(0);
    assert!(matches!(
        new.check_links(&old),
        Err(DiffError::BrokenLink { index: 0, link: 0 })
    ));
}
