//! Gap sliding.
//!
//! A run of unlinked tokens can often be placed in several equivalent
//! positions when it is surrounded by identical tokens (`"a b"` inserted into
//! `"a b a b"`).  The slider moves such gaps so that they end at a line
//! break or, failing that, at a word border.
use crate::patterns::{ends_with_blank, ends_with_newline};
use crate::text::TextVersion;

/// Slides all gaps of `text` whose tokens are linked into `linked`.
pub(crate) fn slide_gaps(text: &mut TextVersion<'_>, linked: &mut TextVersion<'_>) {
    let mut gap_start = None;
    let mut idx = text.first;
    while let Some(current) = idx {
        let is_linked = text.is_linked(current);
        match gap_start {
            None if !is_linked => gap_start = Some(current),
            Some(start) if is_linked => {
                slide_gap(text, linked, start, current);
                gap_start = None;
            }
            _ => {}
        }
        idx = text.tokens[current].next;
    }
}

/// Moves the link of `from` over to the identical token `to`.
fn move_link(text: &mut TextVersion<'_>, linked: &mut TextVersion<'_>, from: usize, to: usize) {
    let link = text.tokens[from].link.take();
    text.tokens[to].link = link;
    if let Some(link) = link {
        linked.tokens[link].link = Some(to);
    }
}

/// Slides a single gap that starts at `gap_front` and ends before the linked
/// token `after`.
fn slide_gap(text: &mut TextVersion<'_>, linked: &mut TextVersion<'_>, gap_front: usize, after: usize) {
    let (mut gap_front, mut gap_back) = match text.tokens[after].prev {
        Some(gap_back) => (gap_front, gap_back),
        None => return,
    };

    // slide down by a single token if the gap starts with the linked token
    // that follows it
    if !text.is_linked(gap_front) && text.value(gap_front) == text.value(after) {
        move_link(text, linked, after, gap_front);
        match (text.tokens[gap_front].next, text.tokens[gap_back].next) {
            (Some(front), Some(back)) => {
                gap_front = front;
                gap_back = back;
            }
            _ => return,
        }
    }

    // find the slide stop above the gap: a line break or a word border
    let front_blank = ends_with_blank(text.value(gap_front));
    let mut front = text.tokens[gap_front].prev;
    let mut front_stop = front;
    if !text.is_linked(gap_back) {
        let mut back = Some(gap_back);
        while let (Some(f), Some(b)) = (front, back) {
            if !text.is_linked(f) || text.value(f) != text.value(b) {
                break;
            }
            let value = text.value(f);
            if ends_with_newline(value) {
                front_stop = Some(f);
                break;
            }
            if ends_with_blank(value) != front_blank {
                front_stop = Some(f);
            }
            front = text.tokens[f].prev;
            back = text.tokens[b].prev;
        }
    }

    // slide up to the stop
    let mut front = text.tokens[gap_front].prev;
    let mut back = Some(gap_back);
    while let (Some(f), Some(b)) = (front, back) {
        if Some(f) == front_stop
            || !text.is_linked(f)
            || text.is_linked(b)
            || text.value(f) != text.value(b)
        {
            break;
        }
        move_link(text, linked, f, b);
        front = text.tokens[f].prev;
        back = text.tokens[b].prev;
    }
}

#[cfg(test)]
use crate::{
    patterns::Patterns,
    text::{connect, Level},
};

#[cfg(test)]
fn render(text: &TextVersion<'_>) -> String {
    text.iter()
        .map(|idx| {
            if text.is_linked(idx) {
                text.value(idx).to_string()
            } else {
                format!("[{}]", text.value(idx))
            }
        })
        .collect()
}

#[cfg(test)]
fn link_runs(new: &mut TextVersion<'_>, old: &mut TextVersion<'_>, pairs: &[(usize, usize)]) {
    let new_tokens = new.iter().collect::<Vec<_>>();
    let old_tokens = old.iter().collect::<Vec<_>>();
    for &(i, j) in pairs {
        connect(new, new_tokens[i], old, old_tokens[j]);
    }
}

#[test]
fn test_slide_up_to_line_break() {
    let patterns = Patterns::get();
    let mut old = TextVersion::new("x\nb\n", patterns);
    let mut new = TextVersion::new("x\nb\nb\n", patterns);
    old.split(Level::Line, None, patterns);
    new.split(Level::Line, None, patterns);
    // the inserted line starts in the middle of the first "b" line
    link_runs(&mut new, &mut old, &[(0, 0), (1, 1), (2, 2), (5, 3)]);
    assert_eq!(render(&new), "x\nb[\n][b]\n");

    slide_gaps(&mut new, &mut old);
    assert_eq!(render(&new), "x\nb\n[b][\n]");
    assert!(new.check_links(&old).is_ok());
}

#[test]
fn test_slide_gap_to_word_border() {
    let patterns = Patterns::get();
    let mut old = TextVersion::new("a b", patterns);
    let mut new = TextVersion::new("a b b", patterns);
    old.split(Level::Word, None, patterns);
    new.split(Level::Word, None, patterns);
    // gap " b" sits in the middle, followed by the linked " b"
    link_runs(&mut new, &mut old, &[(0, 0), (3, 1), (4, 2)]);
    assert_eq!(render(&new), "a[ ][b] b");

    slide_gaps(&mut new, &mut old);
    assert_eq!(render(&new), "a [b][ ]b");
    assert!(new.check_links(&old).is_ok());
    assert!(old.check_links(&new).is_ok());
}
