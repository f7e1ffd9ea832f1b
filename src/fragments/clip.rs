//! Shortening of long unchanged fragments.
//!
//! Unchanged text far away from any change is replaced by an omission.  Cuts
//! are placed at the most natural border found within the configured windows:
//! after a heading, at a paragraph break, at a line break, at a blank and
//! finally after a fixed number of characters or lines.
use std::borrow::Cow;
use std::ops::Range;

use crate::config::ClipConfig;
use crate::fragments::{Fragment, FragmentKind};
use crate::patterns::{is_blank, is_newline, Patterns};

/// The border a cut was placed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Border {
    Heading,
    Paragraph,
    Line,
    Blank,
    Chars,
    Fixed,
}

/// Positions of the natural borders within a fragment.
struct Borders {
    headings: Vec<usize>,
    heading_ends: Vec<usize>,
    paragraphs: Vec<usize>,
    lines: Vec<usize>,
}

impl Borders {
    fn scan(text: &str, patterns: &Patterns) -> Borders {
        let mut headings = Vec::new();
        let mut heading_ends = Vec::new();
        for m in patterns.clip_heading.find_iter(text) {
            headings.push(m.start());
            heading_ends.push(m.end());
        }
        Borders {
            headings,
            heading_ends,
            paragraphs: starts(text, &patterns.clip_paragraph),
            lines: starts(text, &patterns.clip_line),
        }
    }
}

/// Collects the match starts framed by the text start and end.
fn starts(text: &str, regex: &regex::Regex) -> Vec<usize> {
    let mut rv = Vec::new();
    let mut last_end = None;
    for m in regex.find_iter(text) {
        rv.push(m.start());
        last_end = Some(m.end());
    }
    if rv.first() != Some(&0) {
        rv.insert(0, 0);
    }
    if last_end != Some(text.len()) {
        rv.push(text.len());
    }
    rv
}

/// Moves a byte position to the start of the character it falls into.
fn floor_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Checks `pos < len - margin`, which never holds for a negative limit.
fn before_margin(pos: usize, len: usize, margin: usize) -> bool {
    len.checked_sub(margin).map_or(false, |limit| pos < limit)
}

/// Checks `pos > len - margin`, which always holds for a negative limit.
fn past_margin(pos: usize, len: usize, margin: usize) -> bool {
    len.checked_sub(margin).map_or(true, |limit| pos > limit)
}

/// Finds the end of the text kept on the left side of a fragment.
fn find_left(text: &str, borders: &Borders, clip: &ClipConfig, patterns: &Patterns) -> (usize, Border) {
    let max = borders
        .lines
        .get(clip.lines_left_max)
        .copied()
        .unwrap_or(text.len());

    if let Some(&end) = borders.heading_ends.first() {
        if end <= clip.heading_left && end <= max {
            return (end, Border::Heading);
        }
    }
    for &pos in &borders.paragraphs {
        if pos > clip.paragraph_left_max || pos > max {
            break;
        }
        if pos > clip.paragraph_left_min {
            return (pos, Border::Paragraph);
        }
    }
    for &pos in &borders.lines {
        if pos > clip.line_left_max || pos > max {
            break;
        }
        if pos > clip.line_left_min {
            return (pos, Border::Line);
        }
    }
    if clip.blank_left_min <= text.len() {
        let start = floor_boundary(text, clip.blank_left_min);
        if let Some(m) = patterns.clip_blank.find_at(text, start) {
            if m.start() < clip.blank_left_max && m.start() < max {
                return (m.start(), Border::Blank);
            }
        }
    }
    if clip.chars_left < max {
        return (floor_boundary(text, clip.chars_left), Border::Chars);
    }
    (max, Border::Fixed)
}

/// Finds the start of the text kept on the right side of a fragment.
fn find_right(text: &str, borders: &Borders, clip: &ClipConfig, patterns: &Patterns) -> (usize, Border) {
    let len = text.len();
    let min = borders
        .lines
        .len()
        .checked_sub(clip.lines_right_max)
        .and_then(|idx| borders.lines.get(idx).copied())
        .unwrap_or(0);

    if let Some(&start) = borders.headings.last() {
        if !before_margin(start, len, clip.heading_right) && start >= min {
            return (start, Border::Heading);
        }
    }
    for &pos in borders.paragraphs.iter().rev() {
        if before_margin(pos, len, clip.paragraph_right_max) || pos < min {
            break;
        }
        if before_margin(pos, len, clip.paragraph_right_min) {
            return (pos, Border::Paragraph);
        }
    }
    for &pos in borders.lines.iter().rev() {
        if before_margin(pos, len, clip.line_right_max) || pos < min {
            break;
        }
        if before_margin(pos, len, clip.line_right_min) {
            return (pos, Border::Line);
        }
    }
    let start = floor_boundary(text, len.saturating_sub(clip.blank_right_max).max(min));
    let mut last = None;
    for m in patterns.clip_blank.find_iter(&text[start..]) {
        let pos = start + m.start();
        if past_margin(pos, len, clip.blank_right_min) {
            if let Some(last) = last {
                return (last, Border::Blank);
            }
            break;
        }
        last = Some(pos);
    }
    if let Some(pos) = len.checked_sub(clip.chars_right).filter(|&pos| pos > min) {
        return (floor_boundary(text, pos), Border::Chars);
    }
    (min, Border::Fixed)
}

/// Checks whether the omitted part between two cuts is worth omitting.
fn is_worth_clipping(left: usize, right: usize, lines: &[usize], clip: &ClipConfig) -> bool {
    if left > right || right - left < clip.skip_chars {
        return false;
    }
    let mut skipped = 0;
    for &pos in lines {
        if pos > right || skipped > clip.skip_lines {
            break;
        }
        if pos > left {
            skipped += 1;
        }
    }
    skipped >= clip.skip_lines
}

/// Slices a fragment text without copying borrowed text.
fn slice<'s>(text: &Cow<'s, str>, range: Range<usize>) -> Cow<'s, str> {
    match *text {
        Cow::Borrowed(text) => Cow::Borrowed(&text[range]),
        Cow::Owned(ref text) => Cow::Owned(text[range].to_string()),
    }
}

/// Trimmed range kept on the left and its omission marker.
fn left_part(text: &str, end: usize, border: Border) -> (Range<usize>, Option<FragmentKind>) {
    let kept = text[..end].trim_end_matches(is_newline);
    let (kept, omission) = match border {
        Border::Chars => (trim_blanks_end(kept), Some(FragmentKind::Omission)),
        Border::Blank => (trim_blanks_end(kept), Some(FragmentKind::OmissionLeft)),
        _ => (kept, None),
    };
    (0..kept.len(), omission)
}

/// Trimmed range kept on the right and its omission marker.
fn right_part(text: &str, start: usize, border: Border) -> (Range<usize>, Option<FragmentKind>) {
    let kept = text[start..].trim_start_matches(is_newline);
    let (kept, omission) = match border {
        Border::Chars => (trim_blanks_start(kept), Some(FragmentKind::Omission)),
        Border::Blank => (trim_blanks_start(kept), Some(FragmentKind::OmissionRight)),
        _ => (kept, None),
    };
    (text.len() - kept.len()..text.len(), omission)
}

fn trim_blanks_end(text: &str) -> &str {
    text.trim_end_matches(|c| is_blank(c) || is_newline(c))
}

fn trim_blanks_start(text: &str) -> &str {
    text.trim_start_matches(|c| is_blank(c) || is_newline(c))
}

/// Clips the unchanged fragments of an assembled fragment stream.
///
/// Only uncolored `=` fragments are touched.  The first content fragment
/// keeps no text on its left and the last one none on its right.
pub(crate) fn clip_fragments<'s>(
    fragments: Vec<Fragment<'s>>,
    clip: &ClipConfig,
    patterns: &Patterns,
) -> Vec<Fragment<'s>> {
    // containers around a single fragment
    if fragments.len() <= 5 {
        return fragments;
    }

    let min_left = clip.min_left();
    let min_right = clip.min_right();
    let first = 2;
    let last = fragments.len() - 3;
    let mut rv = Vec::with_capacity(fragments.len());
    let mut clipped = 0;

    for (idx, fragment) in fragments.into_iter().enumerate() {
        let len = fragment.text.len();
        if fragment.kind != FragmentKind::Same
            || fragment.color.is_some()
            || (len < min_left && len < min_right)
        {
            rv.push(fragment);
            continue;
        }

        let text: &str = &fragment.text;
        let borders = Borders::scan(text, patterns);
        let left = (idx != first).then(|| find_left(text, &borders, clip, patterns));
        let right = (idx != last).then(|| find_right(text, &borders, clip, patterns));

        match (left, right) {
            (None, None) => {
                rv.push(fragment);
                continue;
            }
            (Some((left, _)), Some((right, _)))
                if !is_worth_clipping(left, right, &borders.lines, clip) =>
            {
                rv.push(fragment);
                continue;
            }
            _ => {}
        }

        let left = left.map(|(end, border)| left_part(text, end, border));
        let right = right.map(|(start, border)| right_part(text, start, border));
        if let Some((range, omission)) = left.clone() {
            rv.push(Fragment::new(FragmentKind::Same, slice(&fragment.text, range), None));
            if let Some(kind) = omission {
                rv.push(Fragment::marker(kind, None));
            }
        }
        if left.is_some() && right.is_some() {
            rv.push(Fragment::marker(FragmentKind::FragmentEnd, None));
            rv.push(Fragment::marker(FragmentKind::Separator, None));
            rv.push(Fragment::marker(FragmentKind::FragmentStart, None));
        }
        if let Some((range, omission)) = right {
            if let Some(kind) = omission {
                rv.push(Fragment::marker(kind, None));
            }
            rv.push(Fragment::new(FragmentKind::Same, slice(&fragment.text, range), None));
        }
        clipped += 1;
    }

    log::debug!("clipped {} unchanged fragments", clipped);
    rv
}

#[cfg(test)]
fn numbered_lines(count: usize) -> String {
    (0..count).map(|idx| format!("l{:02}\n", idx)).collect()
}

#[cfg(test)]
fn small_windows() -> ClipConfig {
    ClipConfig {
        line_left_max: 30,
        line_left_min: 10,
        line_right_max: 30,
        line_right_min: 10,
        skip_chars: 50,
        ..ClipConfig::default()
    }
}

#[cfg(test)]
fn render(fragments: &[Fragment<'_>]) -> Vec<String> {
    fragments.iter().map(|f| f.to_string()).collect()
}

#[test]
fn test_short_streams_are_kept() {
    let text = numbered_lines(40);
    let fragments = vec![
        Fragment::marker(FragmentKind::ContainerStart, None),
        Fragment::marker(FragmentKind::FragmentStart, None),
        Fragment::new(FragmentKind::Same, Cow::Borrowed(text.as_str()), None),
        Fragment::marker(FragmentKind::FragmentEnd, None),
        Fragment::marker(FragmentKind::ContainerEnd, None),
    ];
    let clipped = clip_fragments(fragments.clone(), &small_windows(), Patterns::get());
    assert_eq!(clipped, fragments);
}

#[test]
fn test_clip_at_line_breaks() {
    let text = numbered_lines(40);
    let fragments = vec![
        Fragment::marker(FragmentKind::ContainerStart, None),
        Fragment::marker(FragmentKind::FragmentStart, None),
        Fragment::new(FragmentKind::Insert, Cow::Borrowed("x"), None),
        Fragment::new(FragmentKind::Same, Cow::Borrowed(text.as_str()), None),
        Fragment::new(FragmentKind::Insert, Cow::Borrowed("y"), None),
        Fragment::marker(FragmentKind::FragmentEnd, None),
        Fragment::marker(FragmentKind::ContainerEnd, None),
    ];
    let clipped = clip_fragments(fragments, &small_windows(), Patterns::get());
    assert_eq!(
        render(&clipped),
        vec![
            "{",
            "[",
            r#"+ "x""#,
            r#"= "l00\nl01\nl02""#,
            "]",
            ",",
            "[",
            r#"= "l37\nl38\nl39\n""#,
            r#"+ "y""#,
            "]",
            "}",
        ]
    );
    assert!(matches!(clipped[3].text, Cow::Borrowed(_)));
}

#[test]
fn test_first_fragment_keeps_only_its_end() {
    let text = numbered_lines(40);
    let fragments = vec![
        Fragment::marker(FragmentKind::ContainerStart, None),
        Fragment::marker(FragmentKind::FragmentStart, None),
        Fragment::new(FragmentKind::Same, Cow::Borrowed(text.as_str()), None),
        Fragment::new(FragmentKind::Insert, Cow::Borrowed("y"), None),
        Fragment::marker(FragmentKind::FragmentEnd, None),
        Fragment::marker(FragmentKind::ContainerEnd, None),
    ];
    let clipped = clip_fragments(fragments, &small_windows(), Patterns::get());
    assert_eq!(
        render(&clipped),
        vec!["{", "[", r#"= "l37\nl38\nl39\n""#, r#"+ "y""#, "]", "}"]
    );
}

#[test]
fn test_close_cuts_are_skipped() {
    let text = numbered_lines(40);
    let fragments = vec![
        Fragment::marker(FragmentKind::ContainerStart, None),
        Fragment::marker(FragmentKind::FragmentStart, None),
        Fragment::new(FragmentKind::Insert, Cow::Borrowed("x"), None),
        Fragment::new(FragmentKind::Same, Cow::Borrowed(text.as_str()), None),
        Fragment::new(FragmentKind::Insert, Cow::Borrowed("y"), None),
        Fragment::marker(FragmentKind::FragmentEnd, None),
        Fragment::marker(FragmentKind::ContainerEnd, None),
    ];
    let clip = ClipConfig {
        skip_chars: 1000,
        ..small_windows()
    };
    let clipped = clip_fragments(fragments.clone(), &clip, Patterns::get());
    assert_eq!(clipped, fragments);
}

#[test]
fn test_margins() {
    assert!(before_margin(1, 10, 5));
    assert!(!before_margin(1, 3, 5));
    assert!(past_margin(1, 3, 5));
    assert!(!past_margin(1, 10, 5));
    assert_eq!(floor_boundary("añb", 2), 1);
}

#[cfg(test)]
fn clip_between(text: &str, clip: &ClipConfig) -> Vec<String> {
    let fragments = vec![
        Fragment::marker(FragmentKind::ContainerStart, None),
        Fragment::marker(FragmentKind::FragmentStart, None),
        Fragment::new(FragmentKind::Insert, Cow::Borrowed("x"), None),
        Fragment::new(FragmentKind::Same, Cow::Borrowed(text), None),
        Fragment::new(FragmentKind::Insert, Cow::Borrowed("y"), None),
        Fragment::marker(FragmentKind::FragmentEnd, None),
        Fragment::marker(FragmentKind::ContainerEnd, None),
    ];
    let clipped = clip_fragments(fragments, clip, Patterns::get());
    // drop the unchanged frame
    render(&clipped[3..clipped.len() - 3])
}

#[test]
fn test_clip_after_headings() {
    let text = format!("== Top ==\n{}== End ==\nz\n", numbered_lines(40));
    let clip = ClipConfig {
        heading_left: 20,
        heading_right: 20,
        skip_chars: 50,
        ..ClipConfig::default()
    };
    assert_eq!(
        clip_between(&text, &clip),
        vec![r#"= "== Top ==""#, "]", ",", "[", r#"= "== End ==\nz\n""#]
    );
}

#[test]
fn test_clip_at_paragraphs() {
    let text = (0..20).map(|idx| format!("p{:02}\n\n", idx)).collect::<String>();
    let clip = ClipConfig {
        paragraph_left_max: 30,
        paragraph_left_min: 10,
        paragraph_right_max: 30,
        paragraph_right_min: 10,
        skip_chars: 50,
        ..ClipConfig::default()
    };
    assert_eq!(
        clip_between(&text, &clip),
        vec![
            r#"= "p00\n\np01\n\np02""#,
            "]",
            ",",
            "[",
            r#"= "p18\n\np19\n\n""#,
        ]
    );
}

#[test]
fn test_clip_at_blanks() {
    let text = (0..20)
        .map(|idx| format!("w{:02}", idx))
        .collect::<Vec<_>>()
        .join(" ");
    let clip = ClipConfig {
        blank_left_max: 30,
        blank_left_min: 10,
        blank_right_max: 30,
        blank_right_min: 10,
        skip_chars: 50,
        skip_lines: 0,
        ..ClipConfig::default()
    };
    assert_eq!(
        clip_between(&text, &clip),
        vec![
            r#"= "w00 w01 w02""#,
            " ~",
            "]",
            ",",
            "[",
            "~ ",
            r#"= "w17 w18 w19""#,
        ]
    );
}

#[test]
fn test_clip_after_chars() {
    let text = "abcdefghij".repeat(8);
    let clip = ClipConfig {
        chars_left: 10,
        chars_right: 10,
        skip_chars: 50,
        skip_lines: 0,
        ..ClipConfig::default()
    };
    assert_eq!(
        clip_between(&text, &clip),
        vec![
            r#"= "abcdefghij""#,
            "~",
            "]",
            ",",
            "[",
            "~",
            r#"= "abcdefghij""#,
        ]
    );
}

#[test]
fn test_clip_after_line_count() {
    let text = numbered_lines(40);
    let clip = ClipConfig {
        heading_left: 0,
        heading_right: 0,
        lines_left_max: 2,
        lines_right_max: 2,
        skip_chars: 50,
        ..ClipConfig::default()
    };
    assert_eq!(
        clip_between(&text, &clip),
        vec![r#"= "l00\nl01""#, "]", ",", "[", r#"= "l39\n""#]
    );
}

#[test]
fn test_kept_parts_are_trimmed() {
    assert_eq!(
        left_part("ab \n\ncd", 5, Border::Blank),
        (0..2, Some(FragmentKind::OmissionLeft))
    );
    assert_eq!(left_part("ab \n\ncd", 5, Border::Line), (0..3, None));
    assert_eq!(
        right_part("ab\n \ncd", 2, Border::Chars),
        (5..7, Some(FragmentKind::Omission))
    );
    assert_eq!(right_part("ab\n \ncd", 2, Border::Paragraph), (3..7, None));
}
