//! Unique token matching.
//!
//! This is a variant of the classic approach by Paul Heckel: tokens that occur
//! exactly once in both texts are linked first and those links are then grown
//! into their identical neighbors.  The matcher is run once per refinement
//! level; border pairs where the growth stopped are carried over to the next,
//! finer level so that the new tokens next to an existing link can be joined
//! up even when they are not unique themselves.
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::mem;

use crate::algorithms::Direction;
use crate::config::DiffConfig;
use crate::patterns::{is_blank_only, Patterns};
use crate::text::{connect, Level, TextVersion};

/// A pair of linked tokens `(new, old)` next to an unresolved region.
type Border = (usize, usize);

#[derive(Debug, Default)]
struct Symbol {
    new_count: usize,
    old_count: usize,
    new_token: Option<usize>,
    old_token: Option<usize>,
}

/// Token strings of one pass in the order they were first seen.
#[derive(Debug, Default)]
struct SymbolTable<'s> {
    lookup: HashMap<&'s str, usize>,
    symbols: Vec<Symbol>,
}

impl<'s> SymbolTable<'s> {
    fn symbol(&mut self, value: &'s str) -> &mut Symbol {
        let idx = match self.lookup.entry(value) {
            Entry::Vacant(entry) => {
                entry.insert(self.symbols.len());
                self.symbols.push(Symbol::default());
                self.symbols.len() - 1
            }
            Entry::Occupied(entry) => *entry.get(),
        };
        &mut self.symbols[idx]
    }

    /// Records a new text token, remembering the first occurrence.
    fn add_new(&mut self, value: &'s str, idx: usize) {
        let symbol = self.symbol(value);
        symbol.new_count += 1;
        symbol.new_token.get_or_insert(idx);
    }

    /// Records an old text token, remembering the last occurrence.
    fn add_old(&mut self, value: &'s str, idx: usize) {
        let symbol = self.symbol(value);
        symbol.old_count += 1;
        symbol.old_token = Some(idx);
    }
}

/// Where and how a single matching pass runs.
#[derive(Clone, Copy, Debug)]
struct Scope {
    new_start: Option<usize>,
    old_start: Option<usize>,
    direction: Direction,
    depth: usize,
    repeating: bool,
}

impl Scope {
    fn top_level() -> Scope {
        Scope {
            new_start: None,
            old_start: None,
            direction: Direction::Down,
            depth: 0,
            repeating: false,
        }
    }

    fn is_top_level(&self) -> bool {
        self.depth == 0 && !self.repeating
    }
}

/// Links the tokens of two text versions, level by level.
pub(crate) struct SymbolMatcher<'c> {
    config: &'c DiffConfig,
    patterns: &'c Patterns,
    borders_down: Vec<Border>,
    borders_up: Vec<Border>,
    linked: bool,
}

impl<'c> SymbolMatcher<'c> {
    pub fn new(config: &'c DiffConfig, patterns: &'c Patterns) -> SymbolMatcher<'c> {
        SymbolMatcher {
            config,
            patterns,
            borders_down: Vec::new(),
            borders_up: Vec::new(),
            linked: false,
        }
    }

    /// Runs the top level matching pass for one refinement level.
    pub fn calculate_diff<'s>(
        &mut self,
        new: &mut TextVersion<'s>,
        old: &mut TextVersion<'s>,
        level: Level,
        recurse: bool,
    ) {
        log::debug!("matching tokens at {:?} level", level);
        self.calculate(new, old, level, recurse, Scope::top_level());
    }

    fn calculate<'s>(
        &mut self,
        new: &mut TextVersion<'s>,
        old: &mut TextVersion<'s>,
        level: Level,
        recurse: bool,
        scope: Scope,
    ) {
        let top_level = scope.is_top_level();
        let mut symbols = SymbolTable::default();

        // the top level grows the borders left behind by the previous level
        let (mut borders_down, mut borders_up) = if top_level {
            (
                mem::take(&mut self.borders_down),
                mem::take(&mut self.borders_up),
            )
        } else {
            (Vec::new(), Vec::new())
        };
        let mut linked = top_level && self.linked;

        collect(new, scope.new_start.or(new.first), scope, |value, idx| {
            symbols.add_new(value, idx)
        });
        collect(old, scope.old_start.or(old.first), scope, |value, idx| {
            symbols.add_old(value, idx)
        });

        for symbol in &symbols.symbols {
            if symbol.new_count != 1 || symbol.old_count != 1 {
                continue;
            }
            let (Some(i), Some(j)) = (symbol.new_token, symbol.old_token) else {
                continue;
            };
            if new.is_linked(i) || old.is_linked(j) {
                continue;
            }
            let value = new.value(i);
            if is_blank_only(value) {
                continue;
            }
            connect(new, i, old, j);
            linked = true;
            borders_down.push((i, j));
            borders_up.push((i, j));

            if scope.depth == 0 && self.is_unique(level, value, new, old) {
                new.tokens[i].unique = true;
                old.tokens[j].unique = true;
            }
        }

        if top_level {
            self.linked = linked;
        }
        if !linked {
            if top_level {
                self.borders_down = borders_down;
                self.borders_up = borders_up;
            }
            return;
        }

        let mut down_next = extend(new, old, &borders_down, Direction::Down);
        let mut up_next = extend(new, old, &borders_up, Direction::Up);

        if top_level {
            if let (Some(i), Some(j)) = (new.first, old.first) {
                down_next.extend(extend_from_edge(new, old, i, j, Direction::Down));
            }
            if let (Some(i), Some(j)) = (new.last, old.last) {
                up_next.extend(extend_from_edge(new, old, i, j, Direction::Up));
            }
            self.borders_down = down_next.clone();
            self.borders_up = up_next.clone();
        } else {
            self.borders_down.extend_from_slice(&down_next);
            self.borders_up.extend_from_slice(&up_next);
        }

        if !scope.repeating && self.config.is_repeated_diff() {
            self.calculate(
                new,
                old,
                level,
                recurse,
                Scope {
                    repeating: true,
                    ..scope
                },
            );
        }

        if recurse
            && self.config.is_recursive_diff()
            && scope.depth < self.config.max_recursion()
        {
            for &border in &down_next {
                self.recurse_from(new, old, level, border, Direction::Down, scope.depth + 1);
            }
            for &border in &up_next {
                self.recurse_from(new, old, level, border, Direction::Up, scope.depth + 1);
            }
        }
    }

    fn recurse_from<'s>(
        &mut self,
        new: &mut TextVersion<'s>,
        old: &mut TextVersion<'s>,
        level: Level,
        (i, j): Border,
        direction: Direction,
        depth: usize,
    ) {
        let (Some(i), Some(j)) = (direction.step(new, i), direction.step(old, j)) else {
            return;
        };
        if new.is_linked(i) || old.is_linked(j) {
            return;
        }
        log::trace!("recursing {:?} at depth {} from ({}, {})", direction, depth, i, j);
        self.calculate(
            new,
            old,
            level,
            true,
            Scope {
                new_start: Some(i),
                old_start: Some(j),
                direction,
                depth,
                repeating: false,
            },
        );
    }

    /// Decides whether a newly linked token may anchor a block on its own.
    fn is_unique(
        &self,
        level: Level,
        value: &str,
        new: &TextVersion<'_>,
        old: &TextVersion<'_>,
    ) -> bool {
        if level == Level::Character {
            return true;
        }
        let words = self.patterns.words_and_chunks(value).collect::<Vec<_>>();
        if words.len() >= self.config.min_block_length() {
            return true;
        }
        words
            .iter()
            .any(|word| old.word_count(word) == 1 && new.word_count(word) == 1)
    }
}

/// Feeds the unlinked tokens of one text into the symbol table.
///
/// Recursive passes only look at the region up to the next linked token.
fn collect<'s, F>(text: &TextVersion<'s>, start: Option<usize>, scope: Scope, mut add: F)
where
    F: FnMut(&'s str, usize),
{
    let mut idx = start;
    while let Some(current) = idx {
        if !text.is_linked(current) {
            add(text.value(current), current);
        } else if scope.depth > 0 {
            break;
        }
        idx = scope.direction.step(text, current);
    }
}

/// Grows links from the border pairs while both neighbors are identical.
///
/// Returns the pairs where the growth hit a mismatch.
fn extend(
    new: &mut TextVersion<'_>,
    old: &mut TextVersion<'_>,
    borders: &[Border],
    direction: Direction,
) -> Vec<Border> {
    let mut rv = Vec::new();
    for &(i, j) in borders {
        let mut last_match = (i, j);
        let mut pair = (direction.step(new, i), direction.step(old, j));
        while let (Some(i), Some(j)) = pair {
            if new.is_linked(i) || old.is_linked(j) {
                break;
            }
            if new.value(i) != old.value(j) {
                rv.push(last_match);
                break;
            }
            connect(new, i, old, j);
            last_match = (i, j);
            pair = (direction.step(new, i), direction.step(old, j));
        }
    }
    rv
}

/// Links identical tokens from the start or the end of both texts.
fn extend_from_edge(
    new: &mut TextVersion<'_>,
    old: &mut TextVersion<'_>,
    i: usize,
    j: usize,
    direction: Direction,
) -> Option<Border> {
    let mut last_match = None;
    let mut pair = (Some(i), Some(j));
    while let (Some(i), Some(j)) = pair {
        if new.is_linked(i) || old.is_linked(j) || new.value(i) != old.value(j) {
            break;
        }
        connect(new, i, old, j);
        last_match = Some((i, j));
        pair = (direction.step(new, i), direction.step(old, j));
    }
    last_match
}

#[cfg(test)]
fn word_versions<'s>(old: &'s str, new: &'s str) -> (TextVersion<'s>, TextVersion<'s>) {
    let patterns = Patterns::get();
    let mut old = TextVersion::new(old, patterns);
    let mut new = TextVersion::new(new, patterns);
    old.split(Level::Word, None, patterns);
    new.split(Level::Word, None, patterns);
    (old, new)
}

#[cfg(test)]
fn linked_values<'s>(text: &TextVersion<'s>) -> Vec<(&'s str, bool)> {
    text.iter()
        .map(|idx| (text.value(idx), text.is_linked(idx)))
        .collect()
}

#[test]
fn test_links_unique_tokens_and_neighbors() {
    let (mut old, mut new) = word_versions("A B C", "A X C");
    let config = DiffConfig::default();
    let mut matcher = SymbolMatcher::new(&config, Patterns::get());
    matcher.calculate_diff(&mut new, &mut old, Level::Word, true);

    assert_eq!(
        linked_values(&new),
        vec![
            ("A", true),
            (" ", true),
            ("X", false),
            (" ", true),
            ("C", true)
        ]
    );
    assert_eq!(
        linked_values(&old),
        vec![
            ("A", true),
            (" ", true),
            ("B", false),
            (" ", true),
            ("C", true)
        ]
    );
    assert!(new.check_links(&old).is_ok());
    assert!(old.check_links(&new).is_ok());
}

#[test]
fn test_blank_tokens_never_seed_links() {
    let (mut old, mut new) = word_versions("a b", "c d");
    let config = DiffConfig::default();
    let mut matcher = SymbolMatcher::new(&config, Patterns::get());
    matcher.calculate_diff(&mut new, &mut old, Level::Word, true);
    assert!(new.iter().all(|idx| !new.is_linked(idx)));
}

#[test]
fn test_edges_link_repeated_tokens() {
    // "x" is not unique, but the text starts are identical
    let (mut old, mut new) = word_versions("x x y", "x x z y");
    let config = DiffConfig::default();
    let mut matcher = SymbolMatcher::new(&config, Patterns::get());
    matcher.calculate_diff(&mut new, &mut old, Level::Word, true);
    assert_eq!(
        linked_values(&new),
        vec![
            ("x", true),
            (" ", true),
            ("x", true),
            (" ", false),
            ("z", false),
            (" ", true),
            ("y", true)
        ]
    );
}

#[test]
fn test_unique_classification() {
    let (mut old, mut new) = word_versions("the cat sat the", "the dog sat the");
    let mut config = DiffConfig::default();
    config.block_min_length(3);
    let mut matcher = SymbolMatcher::new(&config, Patterns::get());
    matcher.calculate_diff(&mut new, &mut old, Level::Word, false);

    let sat = new.iter().find(|&idx| new.value(idx) == "sat").unwrap();
    assert!(new.is_linked(sat));
    assert!(new.tokens[sat].unique);

    let the = new.iter().find(|&idx| new.value(idx) == "the").unwrap();
    assert!(new.is_linked(the));
    assert!(!new.tokens[the].unique);
}

#[test]
fn test_neighbors_resolve_repeated_tokens() {
    let (mut old, mut new) = word_versions("a b 1 c d a b", "a b 2 c d a b");
    let mut config = DiffConfig::default();
    config.repeated_diff(false);
    let mut matcher = SymbolMatcher::new(&config, Patterns::get());
    matcher.calculate_diff(&mut new, &mut old, Level::Word, true);

    let unlinked = new
        .iter()
        .filter(|&idx| !new.is_linked(idx))
        .map(|idx| new.value(idx))
        .collect::<Vec<_>>();
    assert_eq!(unlinked, vec!["2"]);
}

#[cfg(test)]
fn unlinked_after_matching(config: &DiffConfig) -> Vec<&'static str> {
    // "x" repeats in both texts and is only unique between its neighbors
    let (mut old, mut new) = word_versions("A 1 x 2 B 3 x 4 C", "A 5 x 6 B 7 x 8 C");
    let mut matcher = SymbolMatcher::new(config, Patterns::get());
    matcher.calculate_diff(&mut new, &mut old, Level::Word, true);
    assert!(new.check_links(&old).is_ok());
    new.iter()
        .filter(|&idx| !new.is_linked(idx))
        .map(|idx| new.value(idx))
        .collect()
}

#[test]
fn test_recursion_links_locally_unique_tokens() {
    let mut config = DiffConfig::default();
    config.repeated_diff(false);
    assert_eq!(unlinked_after_matching(&config), vec!["5", "6", "7", "8"]);
}

#[test]
fn test_recursion_can_be_disabled() {
    let mut config = DiffConfig::default();
    config.repeated_diff(false).recursive_diff(false);
    assert_eq!(
        unlinked_after_matching(&config),
        vec!["5", " ", "x", " ", "6", "7", " ", "x", " ", "8"]
    );
}

#[test]
fn test_recursion_depth_is_bounded() {
    let mut config = DiffConfig::default();
    config.repeated_diff(false).recursion_max(0);
    assert_eq!(
        unlinked_after_matching(&config),
        vec!["5", " ", "x", " ", "6", "7", " ", "x", " ", "8"]
    );
}
