//! The diff result.
use std::collections::BTreeSet;
use std::fmt;

use crate::config::DiffConfig;
use crate::error::DiffError;
use crate::fragments::{Fragment, FragmentKind};

/// A diff of two texts with detected block moves.
///
/// The diff borrows both input texts.  Its fragments describe the new text
/// in order, with deleted text placed next to its old neighbors and moved
/// blocks marked at their old positions.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MoveDiff<'s> {
    old: &'s str,
    new: &'s str,
    fragments: Vec<Fragment<'s>>,
}

impl<'s> MoveDiff<'s> {
    pub(crate) fn new(old: &'s str, new: &'s str, fragments: Vec<Fragment<'s>>) -> MoveDiff<'s> {
        MoveDiff {
            old,
            new,
            fragments,
        }
    }

    /// Configures a differ before diffing.
    pub fn configure() -> DiffConfig {
        DiffConfig::default()
    }

    /// Creates a diff of two texts.
    ///
    /// Equivalent to `MoveDiff::configure().diff(old, new)`.
    pub fn from_texts(old: &'s str, new: &'s str) -> Result<MoveDiff<'s>, DiffError> {
        MoveDiff::configure().diff(old, new)
    }

    /// The old text, without a stripped trailing newline.
    pub fn old_text(&self) -> &'s str {
        self.old
    }

    /// The new text, without a stripped trailing newline.
    pub fn new_text(&self) -> &'s str {
        self.new
    }

    /// Returns the fragments of the diff.
    pub fn fragments(&self) -> &[Fragment<'s>] {
        &self.fragments
    }

    /// Consumes the diff and returns its fragments.
    pub fn into_fragments(self) -> Vec<Fragment<'s>> {
        self.fragments
    }

    /// Checks if the two texts are identical.
    pub fn is_unchanged(&self) -> bool {
        self.fragments.iter().all(|fragment| {
            !matches!(
                fragment.kind(),
                FragmentKind::Delete
                    | FragmentKind::Insert
                    | FragmentKind::MarkLeft
                    | FragmentKind::MarkRight
                    | FragmentKind::BlockLeft
                    | FragmentKind::BlockRight
            )
        })
    }

    /// Returns the colors of all moved blocks in ascending order.
    ///
    /// Every color appears on exactly one moved block and on its mark.
    pub fn moved_groups(&self) -> Vec<usize> {
        self.fragments
            .iter()
            .filter(|fragment| {
                matches!(
                    fragment.kind(),
                    FragmentKind::BlockLeft | FragmentKind::BlockRight
                )
            })
            .filter_map(|fragment| fragment.color())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rebuilds the new text from the `=` and `+` fragments.
    ///
    /// For a clipped diff the omitted text is missing from the result.
    pub fn new_text_from_fragments(&self) -> String {
        self.fragments
            .iter()
            .filter(|fragment| {
                matches!(fragment.kind(), FragmentKind::Same | FragmentKind::Insert)
            })
            .map(|fragment| fragment.text())
            .collect()
    }

    /// Rebuilds the old text from the fragments.
    ///
    /// Unchanged and deleted text outside of moved blocks is taken as is,
    /// moved blocks are taken from their marks.  For a clipped diff the
    /// omitted text is missing from the result.
    pub fn old_text_from_fragments(&self) -> String {
        let mut rv = String::new();
        let mut depth = 0usize;
        for fragment in &self.fragments {
            match fragment.kind() {
                FragmentKind::BlockLeft | FragmentKind::BlockRight => depth += 1,
                FragmentKind::BlockEnd => depth = depth.saturating_sub(1),
                FragmentKind::Same | FragmentKind::Delete if depth == 0 => {
                    rv.push_str(fragment.text())
                }
                FragmentKind::MarkLeft | FragmentKind::MarkRight => rv.push_str(fragment.text()),
                _ => {}
            }
        }
        rv
    }
}

impl<'s> fmt::Display for MoveDiff<'s> {
    /// Renders one fragment per line.
    ///
    /// This is mostly for debugging and snapshot tests.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.fragments {
            writeln!(f, "{}", fragment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
fn full_diff<'s>(old: &'s str, new: &'s str, block_min_length: usize) -> MoveDiff<'s> {
    MoveDiff::configure()
        .full_diff(true)
        .block_min_length(block_min_length)
        .diff(old, new)
        .unwrap()
}

#[test]
fn test_unchanged() {
    let diff = MoveDiff::from_texts("A B C", "A B C").unwrap();
    assert!(diff.is_unchanged());
    insta::assert_snapshot!(diff.to_string().trim_end(), @r###"
    {
    [
    = "A B C"
    ]
    }
    "###);
}

#[test]
fn test_replacement() {
    let diff = full_diff("A B C", "A X C", 3);
    assert!(!diff.is_unchanged());
    assert!(diff.moved_groups().is_empty());
    insta::assert_snapshot!(diff.to_string().trim_end(), @r###"
    {
    [
    = "A "
    - "B"
    + "X"
    = " C"
    ]
    }
    "###);
    assert_eq!(diff.old_text_from_fragments(), "A B C");
    assert_eq!(diff.new_text_from_fragments(), "A X C");
}

#[test]
fn test_moved_block() {
    let diff = full_diff("cat dog bird", "bird cat dog", 1);
    assert_eq!(diff.moved_groups(), vec![1]);
    insta::assert_snapshot!(diff.to_string().trim_end(), @r###"
    {
    [
    (<#1
    =#1 "bird"
    )#1
    + " "
    = "cat dog"
    - " "
    <#1 "bird"
    ]
    }
    "###);
    assert_eq!(diff.new_text_from_fragments(), "bird cat dog");
    assert_eq!(diff.old_text_from_fragments(), "cat dog bird");
}

#[test]
fn test_block_moved_back() {
    let diff = full_diff("bird cat dog", "cat dog bird", 1);
    assert_eq!(diff.moved_groups(), vec![1]);
    insta::assert_snapshot!(diff.to_string().trim_end(), @r###"
    {
    [
    >#1 "bird"
    - " "
    = "cat dog"
    + " "
    (>#1
    =#1 "bird"
    )#1
    ]
    }
    "###);
    assert_eq!(diff.new_text_from_fragments(), "cat dog bird");
    assert_eq!(diff.old_text_from_fragments(), "bird cat dog");
}

#[test]
fn test_insertion_into_empty_text() {
    let diff = MoveDiff::from_texts("", "hello").unwrap();
    insta::assert_snapshot!(diff.to_string().trim_end(), @r###"
    {
    [
    + "hello"
    ]
    }
    "###);
}

#[test]
fn test_trailing_newline_is_stripped() {
    let diff = MoveDiff::from_texts("a b\n", "a c\n").unwrap();
    assert_eq!(diff.old_text(), "a b");
    assert_eq!(diff.new_text(), "a c");
    assert_eq!(diff.new_text_from_fragments(), "a c");
}

#[test]
fn test_invalid_config() {
    let rv = MoveDiff::configure()
        .recursion_max(crate::config::RECURSION_LIMIT + 1)
        .diff("a", "b");
    assert!(matches!(rv, Err(DiffError::InvalidConfig { .. })));
}
