//! Character level refinement of similar gaps.
//!
//! After word level matching the remaining unlinked regions ("gaps") of both
//! texts are compared pairwise.  Only gaps whose tokens look like edited
//! versions of each other are split into characters; anything else would
//! produce a noisy character salad.
use crate::algorithms::utils::{common_prefix_len, common_suffix_len, identical_positions};
use crate::patterns::Patterns;
use crate::text::{connect, Level, TextVersion};

/// A pair of corresponding unlinked token runs.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Gap {
    new_first: usize,
    new_last: usize,
    new_tokens: usize,
    old_first: Option<usize>,
    old_last: Option<usize>,
    old_tokens: usize,
}

/// Splits the tokens of similar gaps into characters.
pub(crate) fn split_refine_chars(
    new: &mut TextVersion<'_>,
    old: &mut TextVersion<'_>,
    patterns: &Patterns,
) {
    let gaps = find_gaps(new, old);
    let similar = gaps
        .iter()
        .filter(|gap| is_similar(gap, new, old))
        .cloned()
        .collect::<Vec<_>>();
    for gap in &similar {
        refine_gap(gap, new, old, patterns);
    }
    log::debug!(
        "refined {} of {} gaps into characters",
        similar.len(),
        gaps.len()
    );
}

/// Collects the gaps of the new text and their counterparts in the old text.
fn find_gaps(new: &TextVersion<'_>, old: &TextVersion<'_>) -> Vec<Gap> {
    let mut gaps: Vec<Gap> = Vec::new();
    let mut in_gap = false;
    let mut j = old.first;
    let mut i = new.first;
    while let Some(current) = i {
        let new_link = new.tokens[current].link;
        let old_link = j.and_then(|j| old.tokens[j].link);
        if !in_gap && new_link.is_none() && old_link.is_none() {
            gaps.push(Gap {
                new_first: current,
                new_last: current,
                new_tokens: 1,
                old_first: j,
                old_last: None,
                old_tokens: 0,
            });
            in_gap = true;
        } else if in_gap && new_link.is_none() {
            if let Some(gap) = gaps.last_mut() {
                gap.new_last = current;
                gap.new_tokens += 1;
            }
        } else if new_link.is_some() {
            in_gap = false;
        }

        // the old position follows the most recent linked token
        if let Some(link) = new_link {
            j = old.tokens[link].next;
        }
        i = new.tokens[current].next;
    }

    for gap in &mut gaps {
        let mut j = gap.old_first;
        while let Some(current) = j {
            if old.is_linked(current) {
                break;
            }
            gap.old_last = Some(current);
            gap.old_tokens += 1;
            j = old.tokens[current].next;
        }
    }
    gaps
}

/// Decides whether the tokens of a gap are similar enough for a character
/// diff.
fn is_similar(gap: &Gap, new: &TextVersion<'_>, old: &TextVersion<'_>) -> bool {
    let (Some(old_first), Some(old_last)) = (gap.old_first, gap.old_last) else {
        return false;
    };

    if gap.new_tokens != gap.old_tokens {
        // one token against three, e.g. a word that was split by a blank
        let (token, first, last) = match (gap.new_tokens, gap.old_tokens) {
            (1, 3) => (
                new.value(gap.new_first),
                old.value(old_first),
                old.value(old_last),
            ),
            (3, 1) => (
                old.value(old_first),
                new.value(gap.new_first),
                new.value(gap.new_last),
            ),
            _ => return false,
        };
        return token.starts_with(first)
            && token.find(last) == token.len().checked_sub(last.len());
    }

    let mut i = gap.new_first;
    let mut j = old_first;
    loop {
        if !is_similar_token(new.value(i), old.value(j)) {
            return false;
        }
        if i == gap.new_last {
            return true;
        }
        match (new.tokens[i].next, old.tokens[j].next) {
            (Some(next_i), Some(next_j)) => {
                i = next_i;
                j = next_j;
            }
            _ => return true,
        }
    }
}

fn is_similar_token(new_value: &str, old_value: &str) -> bool {
    if new_value == old_value {
        return true;
    }
    let new_len = new_value.chars().count();
    let old_len = old_value.chars().count();

    if new_len == old_len {
        // at least 49% of the positions have to be identical
        return identical_positions(old_value, new_value) * 100 >= new_len * 49;
    }

    let (shorter, longer, shorter_len) = if new_len < old_len {
        (new_value, old_value, new_len)
    } else {
        (old_value, new_value, old_len)
    };
    let left = common_prefix_len(shorter, longer);
    let right = common_suffix_len(shorter, longer);
    left + right == shorter_len
        || longer.contains(shorter)
        || left * 2 >= shorter_len
        || right * 2 >= shorter_len
}

/// Links identical token pairs of a gap and splits the others into
/// characters.
fn refine_gap(gap: &Gap, new: &mut TextVersion<'_>, old: &mut TextVersion<'_>, patterns: &Patterns) {
    let same_length = gap.new_tokens == gap.old_tokens;
    let mut i = Some(gap.new_first);
    let mut j = gap.old_first;
    while i.is_some() || j.is_some() {
        match (i, j) {
            (Some(ii), Some(jj)) if same_length && new.value(ii) == old.value(jj) => {
                connect(new, ii, old, jj);
            }
            _ => {
                if let Some(ii) = i {
                    new.split(Level::Character, Some(ii), patterns);
                }
                if let Some(jj) = j {
                    old.split(Level::Character, Some(jj), patterns);
                }
            }
        }
        // replaced tokens keep pointing at their old successors
        i = i
            .filter(|&ii| ii != gap.new_last)
            .and_then(|ii| new.tokens[ii].next);
        j = j
            .filter(|&jj| Some(jj) != gap.old_last)
            .and_then(|jj| old.tokens[jj].next);
    }
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
fn render(text: &TextVersion<'_>) -> Vec<String> {
    text.iter()
        .map(|idx| {
            if text.is_linked(idx) {
                format!("={}", text.value(idx))
            } else {
                text.value(idx).to_string()
            }
        })
        .collect()
}

#[test]
fn test_find_gaps() {
    let (mut old, mut new) = word_versions("a b c", "a x y c");
    let (n0, o0) = (new.first.unwrap(), old.first.unwrap());
    let (n6, o4) = (new.last.unwrap(), old.last.unwrap());
    connect(&mut new, n0, &mut old, o0);
    connect(&mut new, n6, &mut old, o4);

    let gaps = find_gaps(&new, &old);
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].new_tokens, 5);
    assert_eq!(gaps[0].old_tokens, 3);
}

#[test]
fn test_similar_words_are_split() {
    let (mut old, mut new) = word_versions("house", "mouse");
    split_refine_chars(&mut new, &mut old, Patterns::get());
    assert_eq!(render(&new), vec!["m", "o", "u", "s", "e"]);
    assert_eq!(render(&old), vec!["h", "o", "u", "s", "e"]);
}

#[test]
fn test_every_similar_gap_is_split() {
    let (mut old, mut new) = word_versions("house x cat", "mouse x cot");
    let (nx, ox) = (new.iter().nth(2).unwrap(), old.iter().nth(2).unwrap());
    connect(&mut new, nx, &mut old, ox);

    split_refine_chars(&mut new, &mut old, Patterns::get());
    assert_eq!(
        render(&new),
        vec!["m", "o", "u", "s", "e", "= ", "=x", "= ", "c", "o", "t"]
    );
    assert_eq!(
        render(&old),
        vec!["h", "o", "u", "s", "e", "= ", "=x", "= ", "c", "a", "t"]
    );
    assert!(new.check_links(&old).is_ok());
    assert!(old.check_links(&new).is_ok());
}

#[test]
fn test_different_words_are_kept() {
    let (mut old, mut new) = word_versions("abc", "xyz");
    split_refine_chars(&mut new, &mut old, Patterns::get());
    assert_eq!(render(&new), vec!["xyz"]);
    assert_eq!(render(&old), vec!["abc"]);
}

#[test]
fn test_joined_word_is_split() {
    let (mut old, mut new) = word_versions("x y", "xy");
    split_refine_chars(&mut new, &mut old, Patterns::get());
    assert_eq!(render(&new), vec!["x", "y"]);
    assert_eq!(render(&old), vec!["x", " ", "y"]);
}

#[test]
fn test_identical_pairs_are_linked() {
    let (mut old, mut new) = word_versions("cat sat", "cot sat");
    split_refine_chars(&mut new, &mut old, Patterns::get());
    assert_eq!(render(&new), vec!["c", "o", "t", "= ", "=sat"]);
    assert_eq!(render(&old), vec!["c", "a", "t", "= ", "=sat"]);
    assert!(new.check_links(&old).is_ok());
}

#[test]
fn test_similarity_rules() {
    assert!(is_similar_token("color", "colour"));
    assert!(is_similar_token("test", "tests"));
    assert!(!is_similar_token("apple", "orange"));
    assert!(!is_similar_token("abcd", "wxyz"));
}
