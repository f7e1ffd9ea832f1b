//! This crate implements a word level text diff that detects moved blocks.
//!
//! Both texts are matched from coarse to fine: paragraphs first, then lines,
//! sentences, wiki markup chunks, words and finally the characters of words
//! that only changed slightly.  Every level links tokens that occur exactly
//! once in both texts and grows these links into their identical
//! neighborhood.  The resulting links are grouped into blocks, and blocks
//! that changed their order are reported as moves.
//!
//! The result is a [`MoveDiff`] whose [`Fragment`]s describe the new text in
//! order, interleaved with the deleted text and with marks at the old
//! positions of moved blocks:
//!
//! ```rust
//! use movediff::{FragmentKind, MoveDiff};
//!
//! let diff = MoveDiff::configure()
//!     .block_min_length(1)
//!     .full_diff(true)
//!     .diff("cat dog bird", "bird cat dog")
//!     .unwrap();
//! assert_eq!(diff.moved_groups().len(), 1);
//! assert!(diff
//!     .fragments()
//!     .iter()
//!     .any(|f| f.kind() == FragmentKind::MarkLeft && f.text() == "bird"));
//! ```
//!
//! Long unchanged regions are clipped unless [`DiffConfig::full_diff`] is
//! enabled.  The omitted parts are replaced by [`FragmentKind::Omission`]
//! markers and separators.
//!
//! # Features
//!
//! * `serde`: when enabled the configuration can be serialized and
//!   deserialized and fragments can be serialized.
pub(crate) mod algorithms;
mod blocks;
mod common;
mod config;
mod diff;
mod error;
mod fragments;
mod patterns;
mod text;

pub use self::common::diff;
pub use self::config::{ClipConfig, DiffConfig, RECURSION_LIMIT};
pub use self::diff::MoveDiff;
pub use self::error::DiffError;
pub use self::fragments::{Fragment, FragmentKind};
