use crate::diff::MoveDiff;
use crate::error::DiffError;

/// Recursion deeper than this is rejected by [`DiffConfig::validate`].
pub const RECURSION_LIMIT: usize = 64;

/// Window sizes used when clipping long unchanged fragments.
///
/// All sizes except the line counts are measured in bytes of the UTF-8 text.
/// Cut points that fall inside a character are moved to its start.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClipConfig {
    pub heading_left: usize,
    pub heading_right: usize,
    pub paragraph_left_max: usize,
    pub paragraph_left_min: usize,
    pub paragraph_right_max: usize,
    pub paragraph_right_min: usize,
    pub line_left_max: usize,
    pub line_left_min: usize,
    pub line_right_max: usize,
    pub line_right_min: usize,
    pub blank_left_max: usize,
    pub blank_left_min: usize,
    pub blank_right_max: usize,
    pub blank_right_min: usize,
    pub chars_left: usize,
    pub chars_right: usize,
    /// Maximum number of lines kept to the left of a cut.
    pub lines_left_max: usize,
    /// Maximum number of lines kept to the right of a cut.
    pub lines_right_max: usize,
    /// Minimum number of omitted lines.
    pub skip_lines: usize,
    /// Minimum number of omitted bytes.
    pub skip_chars: usize,
}

impl Default for ClipConfig {
    fn default() -> ClipConfig {
        ClipConfig {
            heading_left: 1500,
            heading_right: 1500,
            paragraph_left_max: 1500,
            paragraph_left_min: 500,
            paragraph_right_max: 1500,
            paragraph_right_min: 500,
            line_left_max: 1000,
            line_left_min: 500,
            line_right_max: 1000,
            line_right_min: 500,
            blank_left_max: 1000,
            blank_left_min: 500,
            blank_right_max: 1000,
            blank_right_min: 500,
            chars_left: 500,
            chars_right: 500,
            lines_left_max: 10,
            lines_right_max: 10,
            skip_lines: 5,
            skip_chars: 1000,
        }
    }
}

impl ClipConfig {
    /// The smallest size below which a fragment cannot be cut on the left.
    pub(crate) fn min_left(&self) -> usize {
        self.heading_left
            .min(self.paragraph_left_min)
            .min(self.line_left_min)
            .min(self.blank_left_min)
            .min(self.chars_left)
    }

    /// The smallest size below which a fragment cannot be cut on the right.
    pub(crate) fn min_right(&self) -> usize {
        self.heading_right
            .min(self.paragraph_right_min)
            .min(self.line_right_min)
            .min(self.blank_right_min)
            .min(self.chars_right)
    }

    fn validate(&self) -> Result<(), DiffError> {
        let windows = [
            ("clip.paragraph_left_min", self.paragraph_left_min, self.paragraph_left_max),
            ("clip.paragraph_right_min", self.paragraph_right_min, self.paragraph_right_max),
            ("clip.line_left_min", self.line_left_min, self.line_left_max),
            ("clip.line_right_min", self.line_right_min, self.line_right_max),
            ("clip.blank_left_min", self.blank_left_min, self.blank_left_max),
            ("clip.blank_right_min", self.blank_right_min, self.blank_right_max),
        ];
        for (field, min, max) in windows {
            if min > max {
                return Err(DiffError::InvalidConfig {
                    field,
                    reason: "minimum window exceeds maximum window",
                });
            }
        }
        if self.lines_left_max == 0 {
            return Err(DiffError::InvalidConfig {
                field: "clip.lines_left_max",
                reason: "at least one line has to be kept",
            });
        }
        if self.lines_right_max == 0 {
            return Err(DiffError::InvalidConfig {
                field: "clip.lines_right_max",
                reason: "at least one line has to be kept",
            });
        }
        Ok(())
    }
}

/// A builder type config for diffing texts into a [`MoveDiff`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DiffConfig {
    full_diff: bool,
    show_block_moves: bool,
    char_diff: bool,
    repeated_diff: bool,
    recursive_diff: bool,
    recursion_max: usize,
    unlink_blocks: bool,
    unlink_max: usize,
    block_min_length: usize,
    strip_trailing_newline: bool,
    consistency_check: bool,
    clip: ClipConfig,
}

impl Default for DiffConfig {
    fn default() -> DiffConfig {
        DiffConfig {
            full_diff: false,
            show_block_moves: true,
            char_diff: true,
            repeated_diff: true,
            recursive_diff: true,
            recursion_max: 10,
            unlink_blocks: true,
            unlink_max: 5,
            block_min_length: 3,
            strip_trailing_newline: true,
            consistency_check: false,
            clip: ClipConfig::default(),
        }
    }
}

impl DiffConfig {
    /// Shows the complete diff instead of clipping long unchanged text.
    ///
    /// The default is `false`.
    pub fn full_diff(&mut self, yes: bool) -> &mut Self {
        self.full_diff = yes;
        self
    }

    /// Enables or disables move detection.
    ///
    /// When disabled moved blocks are reported as a deletion at the old and an
    /// insertion at the new position.  The default is `true`.
    pub fn show_block_moves(&mut self, yes: bool) -> &mut Self {
        self.show_block_moves = yes;
        self
    }

    /// Enables character level refinement of similar words.
    ///
    /// The default is `true`.
    pub fn char_diff(&mut self, yes: bool) -> &mut Self {
        self.char_diff = yes;
        self
    }

    /// Repeats every matching pass once to link tokens that became unique
    /// only after the first pass.
    ///
    /// The default is `true`.
    pub fn repeated_diff(&mut self, yes: bool) -> &mut Self {
        self.repeated_diff = yes;
        self
    }

    /// Recursively matches the unresolved regions next to linked tokens.
    ///
    /// The default is `true`.
    pub fn recursive_diff(&mut self, yes: bool) -> &mut Self {
        self.recursive_diff = yes;
        self
    }

    /// Changes the maximum recursion depth.
    ///
    /// The default is `10`, the maximum accepted value is [`RECURSION_LIMIT`].
    pub fn recursion_max(&mut self, depth: usize) -> &mut Self {
        self.recursion_max = depth;
        self
    }

    /// Converts short moved blocks back into deletions and insertions.
    ///
    /// The default is `true`.
    pub fn unlink_blocks(&mut self, yes: bool) -> &mut Self {
        self.unlink_blocks = yes;
        self
    }

    /// Changes the maximum number of unlinking cycles.
    ///
    /// The default is `5`.
    pub fn unlink_max(&mut self, cycles: usize) -> &mut Self {
        self.unlink_max = cycles;
        self
    }

    /// Changes the minimum number of words a block needs to count as a move
    /// on its own.
    ///
    /// The default is `3`.
    pub fn block_min_length(&mut self, words: usize) -> &mut Self {
        self.block_min_length = words;
        self
    }

    /// Removes a trailing newline from both texts if both end in one.
    ///
    /// The default is `true`.
    pub fn strip_trailing_newline(&mut self, yes: bool) -> &mut Self {
        self.strip_trailing_newline = yes;
        self
    }

    /// Verifies that the fragments reproduce both texts.
    ///
    /// A mismatch is reported as [`DiffError::Inconsistent`].  The default is
    /// `false`.
    pub fn consistency_check(&mut self, yes: bool) -> &mut Self {
        self.consistency_check = yes;
        self
    }

    /// Replaces the clipping windows.
    pub fn clip(&mut self, clip: ClipConfig) -> &mut Self {
        self.clip = clip;
        self
    }

    /// Checks the configuration for contradictory values.
    pub fn validate(&self) -> Result<(), DiffError> {
        if self.recursion_max > RECURSION_LIMIT {
            return Err(DiffError::InvalidConfig {
                field: "recursion_max",
                reason: "recursion depth exceeds the supported limit",
            });
        }
        self.clip.validate()
    }

    /// Creates a diff of two texts.
    pub fn diff<'s>(&self, old: &'s str, new: &'s str) -> Result<MoveDiff<'s>, DiffError> {
        crate::common::diff_texts(self, old, new)
    }

    pub(crate) fn is_full_diff(&self) -> bool {
        self.full_diff
    }

    pub(crate) fn is_showing_block_moves(&self) -> bool {
        self.show_block_moves
    }

    pub(crate) fn is_char_diff(&self) -> bool {
        self.char_diff
    }

    pub(crate) fn is_repeated_diff(&self) -> bool {
        self.repeated_diff
    }

    pub(crate) fn is_recursive_diff(&self) -> bool {
        self.recursive_diff
    }

    pub(crate) fn max_recursion(&self) -> usize {
        self.recursion_max
    }

    pub(crate) fn is_unlinking_blocks(&self) -> bool {
        self.unlink_blocks
    }

    pub(crate) fn max_unlink_cycles(&self) -> usize {
        self.unlink_max
    }

    pub(crate) fn min_block_length(&self) -> usize {
        self.block_min_length
    }

    pub(crate) fn is_stripping_trailing_newline(&self) -> bool {
        self.strip_trailing_newline
    }

    pub(crate) fn is_consistency_checked(&self) -> bool {
        self.consistency_check
    }

    pub(crate) fn clip_config(&self) -> &ClipConfig {
        &self.clip
    }
}

#[test]
fn test_default_config_is_valid() {
    assert_eq!(DiffConfig::default().validate(), Ok(()));
}

#[test]
fn test_builder_chains() {
    let mut config = DiffConfig::default();
    config.block_min_length(1).char_diff(false).recursion_max(2);
    assert_eq!(config.min_block_length(), 1);
    assert!(!config.is_char_diff());
    assert_eq!(config.max_recursion(), 2);
}

#[test]
fn test_invalid_windows_rejected() {
    let mut config = DiffConfig::default();
    config.clip(ClipConfig {
        line_left_min: 2000,
        ..ClipConfig::default()
    });
    assert_eq!(
        config.validate(),
        Err(DiffError::InvalidConfig {
            field: "clip.line_left_min",
            reason: "minimum window exceeds maximum window",
        })
    );

    let mut config = DiffConfig::default();
    config.recursion_max(RECURSION_LIMIT + 1);
    assert!(matches!(
        config.validate(),
        Err(DiffError::InvalidConfig {
            field: "recursion_max",
            ..
        })
    ));

    let mut config = DiffConfig::default();
    config.clip(ClipConfig {
        lines_right_max: 0,
        ..ClipConfig::default()
    });
    assert!(config.validate().is_err());
}
