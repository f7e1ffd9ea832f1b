use crate::blocks::Group;

/// Finds the heaviest run of groups in `start..=end` that keeps the old text
/// order.
///
/// The groups of a path have non-decreasing `old_number`s; the weight of a
/// path is the sum of its characters.  Among paths of equal weight the one
/// starting and continuing with the earliest group wins.
pub(crate) fn find_max_path(groups: &[Group], start: usize, end: usize) -> Vec<usize> {
    if start > end || end >= groups.len() {
        return Vec::new();
    }

    // best[i]: heaviest path starting at group i and where it continues
    let mut best: Vec<(usize, Option<usize>)> = vec![(0, None); end + 1 - start];
    for i in (start..=end).rev() {
        let old_number = groups[i].old_number;
        let mut max_chars = 0;
        let mut next = None;
        for j in i + 1..=end {
            if groups[j].old_number < old_number {
                continue;
            }
            let chars = best[j - start].0;
            if chars > max_chars {
                max_chars = chars;
                next = Some(j);
            }
        }
        best[i - start] = (groups[i].chars + max_chars, next);
    }

    let mut max_chars = 0;
    let mut head = None;
    for i in start..=end {
        if best[i - start].0 > max_chars {
            max_chars = best[i - start].0;
            head = Some(i);
        }
    }

    let mut rv = Vec::new();
    while let Some(i) = head {
        rv.push(i);
        head = best[i - start].1;
    }
    rv
}

#[cfg(test)]
fn group(old_number: usize, chars: usize) -> Group {
    Group {
        old_number: Some(old_number),
        chars,
        ..Group::default()
    }
}

#[test]
fn test_max_path_prefers_heavier_groups() {
    let groups = vec![group(4, 4), group(0, 7)];
    assert_eq!(find_max_path(&groups, 0, 1), vec![1]);
}

#[test]
fn test_max_path_follows_old_order() {
    let groups = vec![group(0, 5), group(9, 1), group(3, 5), group(6, 5)];
    assert_eq!(find_max_path(&groups, 0, 3), vec![0, 2, 3]);
}

#[test]
fn test_max_path_first_wins_on_ties() {
    let groups = vec![group(1, 3), group(0, 3)];
    assert_eq!(find_max_path(&groups, 0, 1), vec![0]);
    assert!(find_max_path(&groups, 1, 0).is_empty());
}
