//! The typed fragment stream.
//!
//! Fragments are what a renderer consumes: unchanged, deleted and inserted
//! text, moved block brackets, move marks and the containers and omission
//! markers produced by clipping.
use std::borrow::Cow;
use std::fmt;

use crate::blocks::{BlockKind, Layout};

pub(crate) mod clip;

/// The kind of a [`Fragment`].
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FragmentKind {
    /// Unchanged text (`=`).
    Same,
    /// Deleted text (`-`).
    Delete,
    /// Inserted text (`+`).
    Insert,
    /// Old position of a block that moved to the left (`<`).
    MarkLeft,
    /// Old position of a block that moved to the right (`>`).
    MarkRight,
    /// Start of a moved block whose mark lies to its right (`(<`).
    BlockLeft,
    /// Start of a moved block whose mark lies to its left (`(>`).
    BlockRight,
    /// End of a moved block (`)`).
    BlockEnd,
    /// Start of a diff fragment (`[`).
    FragmentStart,
    /// End of a diff fragment (`]`).
    FragmentEnd,
    /// Start of the diff (`{`).
    ContainerStart,
    /// End of the diff (`}`).
    ContainerEnd,
    /// Omitted characters (`~`).
    Omission,
    /// Omitted text up to a blank (` ~`).
    OmissionLeft,
    /// Omitted text after a blank (`~ `).
    OmissionRight,
    /// Separator between clipped diff fragments (`,`).
    Separator,
}

impl FragmentKind {
    /// Returns the symbol of the kind.
    pub fn symbol(self) -> &'static str {
        match self {
            FragmentKind::Same => "=",
            FragmentKind::Delete => "-",
            FragmentKind::Insert => "+",
            FragmentKind::MarkLeft => "<",
            FragmentKind::MarkRight => ">",
            FragmentKind::BlockLeft => "(<",
            FragmentKind::BlockRight => "(>",
            FragmentKind::BlockEnd => ")",
            FragmentKind::FragmentStart => "[",
            FragmentKind::FragmentEnd => "]",
            FragmentKind::ContainerStart => "{",
            FragmentKind::ContainerEnd => "}",
            FragmentKind::Omission => "~",
            FragmentKind::OmissionLeft => " ~",
            FragmentKind::OmissionRight => "~ ",
            FragmentKind::Separator => ",",
        }
    }

    /// Checks if the kind carries text of one of the versions.
    pub fn is_content(self) -> bool {
        matches!(
            self,
            FragmentKind::Same
                | FragmentKind::Delete
                | FragmentKind::Insert
                | FragmentKind::MarkLeft
                | FragmentKind::MarkRight
        )
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single element of the diff output.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Fragment<'s> {
    kind: FragmentKind,
    text: Cow<'s, str>,
    color: Option<usize>,
}

impl<'s> Fragment<'s> {
    pub(crate) fn new(kind: FragmentKind, text: Cow<'s, str>, color: Option<usize>) -> Fragment<'s> {
        Fragment { kind, text, color }
    }

    pub(crate) fn marker(kind: FragmentKind, color: Option<usize>) -> Fragment<'s> {
        Fragment::new(kind, Cow::Borrowed(""), color)
    }

    /// Returns the kind of the fragment.
    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    /// Returns the text of the fragment.
    ///
    /// Markers carry no text.  Move marks carry the text of the moved block
    /// as it appeared in the old version.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the move color shared by a moved block and its mark.
    pub fn color(&self) -> Option<usize> {
        self.color
    }
}

impl<'s> fmt::Display for Fragment<'s> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(color) = self.color {
            write!(f, "#{}", color)?;
        }
        if !self.text.is_empty() {
            write!(f, " {:?}", self.text)?;
        }
        Ok(())
    }
}

/// Turns the detected blocks into the wrapped fragment stream.
pub(crate) fn assemble<'s>(layout: &Layout<'s>) -> Vec<Fragment<'s>> {
    let Layout { blocks, groups } = layout;
    let mut order = (0..groups.len()).collect::<Vec<_>>();
    order.sort_by_key(|&group| groups[group].block_start);

    let mut fragments = vec![
        Fragment::marker(FragmentKind::ContainerStart, None),
        Fragment::marker(FragmentKind::FragmentStart, None),
    ];
    for group_idx in order {
        let group = &groups[group_idx];
        let color = group.color;

        if color.is_some() {
            let mark = blocks
                .iter()
                .position(|block| block.kind == BlockKind::Mark && block.moved == Some(group_idx));
            let kind = if mark.map_or(false, |mark| mark > group.block_end) {
                FragmentKind::BlockLeft
            } else {
                FragmentKind::BlockRight
            };
            fragments.push(Fragment::marker(kind, color));
        }

        for (idx, block) in blocks
            .iter()
            .enumerate()
            .take(group.block_end + 1)
            .skip(group.block_start)
        {
            let kind = match block.kind {
                BlockKind::Same => FragmentKind::Same,
                BlockKind::Delete => FragmentKind::Delete,
                BlockKind::Insert => FragmentKind::Insert,
                BlockKind::Mark => {
                    let Some(moved) = block.moved.map(|moved| &groups[moved]) else {
                        continue;
                    };
                    let text = blocks[moved.block_start..=moved.block_end]
                        .iter()
                        .filter(|b| matches!(b.kind, BlockKind::Same | BlockKind::Delete))
                        .map(|b| b.text)
                        .collect::<String>();
                    let kind = if moved.block_start < idx {
                        FragmentKind::MarkLeft
                    } else {
                        FragmentKind::MarkRight
                    };
                    fragments.push(Fragment::new(kind, Cow::Owned(text), moved.color));
                    continue;
                }
            };
            fragments.push(Fragment::new(kind, Cow::Borrowed(block.text), color));
        }

        if color.is_some() {
            fragments.push(Fragment::marker(FragmentKind::BlockEnd, color));
        }
    }
    fragments.push(Fragment::marker(FragmentKind::FragmentEnd, None));
    fragments.push(Fragment::marker(FragmentKind::ContainerEnd, None));

    merge(fragments)
}

/// Joins neighboring fragments of the same kind and color.
fn merge(fragments: Vec<Fragment<'_>>) -> Vec<Fragment<'_>> {
    let mut rv: Vec<Fragment<'_>> = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        if let Some(last) = rv.last_mut() {
            if last.kind == fragment.kind
                && last.color == fragment.color
                && !last.text.is_empty()
                && !fragment.text.is_empty()
            {
                last.text.to_mut().push_str(&fragment.text);
                continue;
            }
        }
        rv.push(fragment);
    }
    rv
}

#[test]
fn test_merge_joins_same_kind() {
    let merged = merge(vec![
        Fragment::new(FragmentKind::Insert, Cow::Borrowed("a"), None),
        Fragment::new(FragmentKind::Insert, Cow::Borrowed("b"), None),
        Fragment::new(FragmentKind::Insert, Cow::Borrowed("c"), Some(1)),
        Fragment::marker(FragmentKind::BlockEnd, Some(1)),
        Fragment::marker(FragmentKind::BlockEnd, Some(1)),
    ]);
    assert_eq!(
        merged,
        vec![
            Fragment::new(FragmentKind::Insert, Cow::Borrowed("ab"), None),
            Fragment::new(FragmentKind::Insert, Cow::Borrowed("c"), Some(1)),
            Fragment::marker(FragmentKind::BlockEnd, Some(1)),
            Fragment::marker(FragmentKind::BlockEnd, Some(1)),
        ]
    );
}

#[test]
fn test_fragment_display() {
    let fragment = Fragment::new(FragmentKind::MarkLeft, Cow::Borrowed("a\n"), Some(2));
    assert_eq!(fragment.to_string(), r#"<#2 "a\n""#);
    assert_eq!(Fragment::marker(FragmentKind::OmissionLeft, None).to_string(), " ~");
}
