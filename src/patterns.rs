//! Compiled token patterns.
//!
//! All regular expressions are compiled once per process and shared by every
//! diff invocation.  The character class predicates mirror the classes used
//! inside the patterns.
use std::sync::OnceLock;

use regex::Regex;

/// Breaking white space characters without newlines.
const BLANKS: &str = r" \t\x0B\u{2000}-\u{200B}\u{202F}\u{205F}\u{3000}";

/// Newline characters without paragraph separators.
const NEWLINES: &str = r"\n\r\u{0085}\u{2028}";

/// Paragraph separators (form feed and U+2029).
const PARAGRAPH_BREAKS: &str = r"\x0C\u{2029}";

/// Sentence terminators: ASCII, full stops, exclamation and question marks.
const SENTENCE_STOPS: &str = concat!(
    r".!?:;",
    r"\u{0589}\u{06D4}\u{0701}\u{0702}\u{0964}\u{0DF4}\u{1362}\u{166E}\u{1803}",
    r"\u{1809}\u{2CF9}\u{2CFE}\u{2E3C}\u{3002}\u{A4FF}\u{A60E}\u{A6F3}\u{FE52}",
    r"\u{FF0E}\u{FF61}",
    r"\u{01C3}\u{055C}\u{07F9}\u{1944}\u{203C}\u{2048}\u{FE15}\u{FE57}\u{FF01}",
    r"\u{037E}\u{055E}\u{061F}\u{1367}\u{1945}\u{2047}\u{2049}\u{2CFA}\u{2CFB}",
    r"\u{2E2E}\u{A60F}\u{A6F7}\u{FE56}\u{FF1F}",
);

/// Words with optional apostrophe continuations (`don't`, `rock’n’roll`).
const WORD: &str = r"\w+(?:['’]\w*)*";

/// Wiki markup chunks: links, templates, tags and bare urls.
const CHUNK: &str = concat!(
    r"\[\[[^\[\]\n]+\]\]",
    r"|\{\{[^\{\}\n]+\}\}",
    r"|\[[^\[\]\n]+\]",
    r"|</?[^<>\[\]\{\}\n]+>",
    r"|\[\[[^\[\]\|\n]+\]\]\|",
    r"|\{\{[^\{\}\|\n]+\|",
    r#"|\b(?:https?:)?//[^\x00-\x20\s"\[\]\x7F]+"#,
);

/// The shared, immutable pattern set.
pub(crate) struct Patterns {
    pub paragraph: Regex,
    pub line: Regex,
    pub sentence: Regex,
    pub chunk: Regex,
    pub word: Regex,
    pub count_words: Regex,
    pub clip_heading: Regex,
    pub clip_paragraph: Regex,
    pub clip_line: Regex,
    pub clip_blank: Regex,
}

impl Patterns {
    /// Returns the process wide pattern set, compiling it on first use.
    pub fn get() -> &'static Patterns {
        static PATTERNS: OnceLock<Patterns> = OnceLock::new();
        PATTERNS.get_or_init(Patterns::compile)
    }

    fn compile() -> Patterns {
        let build = |pattern: &str| {
            Regex::new(pattern).unwrap_or_else(|err| panic!("invalid pattern {pattern:?}: {err}"))
        };
        Patterns {
            paragraph: build(&format!(
                r"(?:\r\n|\n|\r){{2,}}|[{PARAGRAPH_BREAKS}]"
            )),
            line: build(r"\r\n|\n|\r|[\u{0085}\u{2028}]"),
            // the trailing blank stands in for a lookahead and is trimmed off
            // again by the sentence splitter
            sentence: build(&format!(
                r"[^{BLANKS}].*?[{SENTENCE_STOPS}]+(?:[{BLANKS}]|$)"
            )),
            chunk: build(CHUNK),
            word: build(&format!(
                r"{WORD}|\[\[|\]\]|\{{\{{|\}}\}}|&\w+;|'''|''|==+|\{{\||\|\}}|\|-|."
            )),
            count_words: build(WORD),
            clip_heading: build(r"(?:^|\n)(?:==+.+?==+|\{\||\|\}).*"),
            clip_paragraph: build(&format!(
                r"(?:(?:\r\n|\n|\r){{2,}}|[{PARAGRAPH_BREAKS}])+"
            )),
            clip_line: build(&format!(r"[{NEWLINES}{PARAGRAPH_BREAKS}]+")),
            clip_blank: build(&format!(r"[{BLANKS}]+")),
        }
    }

    /// Returns all words and chunks of a string, used for uniqueness checks.
    pub fn words_and_chunks<'a, 's: 'a>(
        &'a self,
        text: &'s str,
    ) -> impl Iterator<Item = &'s str> + 'a {
        self.count_words
            .find_iter(text)
            .chain(self.chunk.find_iter(text))
            .map(|m| m.as_str())
    }

    /// Counts the words of a string.
    pub fn word_count(&self, text: &str) -> usize {
        self.count_words.find_iter(text).count()
    }
}

/// Checks for breaking white space that is not a newline.
pub(crate) fn is_blank(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\x0B' | '\u{2000}'..='\u{200B}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}

/// Checks for newlines, including paragraph separators.
pub(crate) fn is_newline(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0085}' | '\u{2028}' | '\x0C' | '\u{2029}'
    )
}

/// A token made only of blanks and newlines never seeds a link.
pub(crate) fn is_blank_only(value: &str) -> bool {
    value.chars().all(|c| is_blank(c) || is_newline(c))
}

/// Gap sliding stops at tokens ending in a newline.
pub(crate) fn ends_with_newline(value: &str) -> bool {
    value.chars().next_back().map_or(false, is_newline)
}

/// Gap sliding prefers word borders, i.e. tokens ending in a blank.
pub(crate) fn ends_with_blank(value: &str) -> bool {
    value.chars().next_back().map_or(false, is_blank)
}

#[test]
fn test_patterns_compile() {
    let patterns = Patterns::get();
    assert!(patterns.word.is_match("x"));
    assert!(patterns.sentence.is_match("Hello there. "));
}

#[test]
fn test_words_and_chunks() {
    let patterns = Patterns::get();
    let found = patterns
        .words_and_chunks("see [[Main Page]] now")
        .collect::<Vec<_>>();
    assert_eq!(found, vec!["see", "Main", "Page", "now", "[[Main Page]]"]);
    assert_eq!(patterns.word_count("don't stop"), 2);
}

#[test]
fn test_character_classes() {
    assert!(is_blank_only(" \t\n"));
    assert!(is_blank_only("\u{3000}\u{2029}"));
    assert!(!is_blank_only(" a "));
    assert!(ends_with_newline("foo\n"));
    assert!(!ends_with_newline("foo"));
    assert!(ends_with_blank("foo "));
    assert!(!ends_with_blank(""));
}
