//! Token alignment algorithms.
//!
//! The alignment works on the token lists of two [`TextVersion`]s and records
//! its result purely as symmetric links between their tokens:
//!
//! * [`matcher`]: links tokens that are unique in both texts and grows those
//!   links into their surroundings, optionally recursing into the regions
//!   that stay unresolved.
//! * [`slide`]: moves the border between linked and unlinked runs of
//!   identical tokens to the most natural position.
//! * [`refine`]: selects the unresolved gaps whose words are similar enough to
//!   be compared character by character.
//!
//! [`TextVersion`]: crate::text::TextVersion
pub(crate) mod matcher;
pub(crate) mod refine;
pub(crate) mod slide;
mod utils;

use crate::text::TextVersion;

/// The direction in which a token list is walked.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub(crate) enum Direction {
    Down,
    Up,
}

impl Direction {
    /// Returns the neighbor of a token in this direction.
    #[inline(always)]
    pub fn step(self, text: &TextVersion<'_>, idx: usize) -> Option<usize> {
        match self {
            Direction::Down => text.tokens[idx].next,
            Direction::Up => text.tokens[idx].prev,
        }
    }
}
