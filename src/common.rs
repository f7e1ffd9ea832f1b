use std::borrow::Cow;

use crate::algorithms::matcher::SymbolMatcher;
use crate::algorithms::refine::split_refine_chars;
use crate::algorithms::slide::slide_gaps;
use crate::blocks::{BlockDetector, Layout};
use crate::config::DiffConfig;
use crate::diff::MoveDiff;
use crate::error::DiffError;
use crate::fragments::clip::clip_fragments;
use crate::fragments::{assemble, Fragment, FragmentKind};
use crate::patterns::Patterns;
use crate::text::{Level, TextVersion};

/// Creates a diff of two texts with the default configuration.
///
/// Equivalent to `DiffConfig::default().diff(old, new)`.
///
/// ```rust
/// use movediff::{diff, FragmentKind};
///
/// let diff = diff("A B C", "A X C").unwrap();
/// let changes = diff
///     .fragments()
///     .iter()
///     .filter(|f| f.kind() == FragmentKind::Insert)
///     .map(|f| f.text())
///     .collect::<Vec<_>>();
/// assert_eq!(changes, vec!["X"]);
/// ```
pub fn diff<'s>(old: &'s str, new: &'s str) -> Result<MoveDiff<'s>, DiffError> {
    DiffConfig::default().diff(old, new)
}

/// Runs the complete diff of two texts.
pub(crate) fn diff_texts<'s>(
    config: &DiffConfig,
    old: &'s str,
    new: &'s str,
) -> Result<MoveDiff<'s>, DiffError> {
    config.validate()?;

    let (old, new) = if config.is_stripping_trailing_newline()
        && old.ends_with('\n')
        && new.ends_with('\n')
    {
        (&old[..old.len() - 1], &new[..new.len() - 1])
    } else {
        (old, new)
    };

    let fragments = match trivial_fragments(old, new) {
        Some(fragments) => fragments,
        None => diff_fragments(config, old, new)?,
    };
    Ok(MoveDiff::new(old, new, fragments))
}

/// Handles identical texts and texts that were added or removed as a whole.
fn trivial_fragments<'s>(old: &'s str, new: &'s str) -> Option<Vec<Fragment<'s>>> {
    let (kind, text) = if old == new {
        (FragmentKind::Same, new)
    } else if old.is_empty() || (old == "\n" && new.ends_with('\n')) {
        (FragmentKind::Insert, new)
    } else if new.is_empty() || (new == "\n" && old.ends_with('\n')) {
        (FragmentKind::Delete, old)
    } else {
        return None;
    };
    log::debug!("trivial diff, emitting a single {:?} fragment", kind);
    Some(vec![
        Fragment::marker(FragmentKind::ContainerStart, None),
        Fragment::marker(FragmentKind::FragmentStart, None),
        Fragment::new(kind, Cow::Borrowed(text), None),
        Fragment::marker(FragmentKind::FragmentEnd, None),
        Fragment::marker(FragmentKind::ContainerEnd, None),
    ])
}

/// Matches both texts level by level and turns the links into fragments.
fn diff_fragments<'s>(
    config: &DiffConfig,
    old: &'s str,
    new: &'s str,
) -> Result<Vec<Fragment<'s>>, DiffError> {
    let patterns = Patterns::get();
    let mut old = TextVersion::new(old, patterns);
    let mut new = TextVersion::new(new, patterns);
    let mut matcher = SymbolMatcher::new(config, patterns);

    new.split(Level::Paragraph, None, patterns);
    old.split(Level::Paragraph, None, patterns);
    matcher.calculate_diff(&mut new, &mut old, Level::Paragraph, false);

    for level in [Level::Line, Level::Sentence, Level::Chunk, Level::Word] {
        new.refine(level, patterns);
        old.refine(level, patterns);
        matcher.calculate_diff(&mut new, &mut old, level, level == Level::Word);
    }
    slide_gaps(&mut new, &mut old);
    slide_gaps(&mut old, &mut new);

    if config.is_char_diff() {
        split_refine_chars(&mut new, &mut old, patterns);
        matcher.calculate_diff(&mut new, &mut old, Level::Character, true);
        slide_gaps(&mut new, &mut old);
        slide_gaps(&mut old, &mut new);
    }

    new.check_links(&old)?;
    old.check_links(&new)?;
    log::debug!(
        "matched {} new and {} old tokens",
        new.iter().count(),
        old.iter().count()
    );

    new.enumerate();
    old.enumerate();
    let layout = BlockDetector::new(&mut new, &mut old, config, patterns).detect();
    if config.is_consistency_checked() {
        check_consistency(&layout, old.text(), new.text())?;
    }

    let fragments = assemble(&layout);
    if config.is_full_diff() {
        Ok(fragments)
    } else {
        Ok(clip_fragments(fragments, config.clip_config(), patterns))
    }
}

/// Verifies that the blocks reproduce both texts.
fn check_consistency(layout: &Layout<'_>, old: &str, new: &str) -> Result<(), DiffError> {
    if layout.new_text() != new {
        return Err(DiffError::Inconsistent { version: "new" });
    }
    if layout.old_text() != old {
        return Err(DiffError::Inconsistent { version: "old" });
    }
    Ok(())
}

#[cfg(test)]
fn render(fragments: Option<Vec<Fragment<'_>>>) -> Option<Vec<String>> {
    fragments.map(|f| f.iter().map(|f| f.to_string()).collect())
}

#[test]
fn test_trivial_fragments() {
    assert_eq!(
        render(trivial_fragments("", "hello")),
        Some(vec![
            "{".to_string(),
            "[".to_string(),
            r#"+ "hello""#.to_string(),
            "]".to_string(),
            "}".to_string(),
        ])
    );
    assert_eq!(
        render(trivial_fragments("a\n", "\n")).map(|f| f[2].clone()),
        Some(r#"- "a\n""#.to_string())
    );
    assert_eq!(
        render(trivial_fragments("x", "x")).map(|f| f[2].clone()),
        Some(r#"= "x""#.to_string())
    );
    assert_eq!(trivial_fragments("a", "b"), None);
}

#[test]
fn test_consistency_check_passes() {
    let mut config = DiffConfig::default();
    config.consistency_check(true).full_diff(true);
    let old = "The quick brown fox jumps.\nOver the lazy dog.\n\nSecond paragraph here.";
    let new = "Second paragraph here.\n\nThe quick brown cat jumps.\nOver the lazy dog.";
    assert!(config.diff(old, new).is_ok());
}
