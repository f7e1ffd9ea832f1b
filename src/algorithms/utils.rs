/// Calculates the length of the common prefix of two strings in characters.
pub fn common_prefix_len(old: &str, new: &str) -> usize {
    new.chars()
        .zip(old.chars())
        .take_while(
            #[inline(always)]
            |x| x.0 == x.1,
        )
        .count()
}

/// Calculates the length of the common suffix of two strings in characters.
pub fn common_suffix_len(old: &str, new: &str) -> usize {
    new.chars()
        .rev()
        .zip(old.chars().rev())
        .take_while(
            #[inline(always)]
            |x| x.0 == x.1,
        )
        .count()
}

/// Counts the positions at which two strings carry the same character.
pub fn identical_positions(old: &str, new: &str) -> usize {
    new.chars().zip(old.chars()).filter(|x| x.0 == x.1).count()
}

#[test]
fn test_common_prefix_len() {
    assert_eq!(common_prefix_len("", ""), 0);
    assert_eq!(common_prefix_len("foobarbaz", "foobarblah"), 7);
    assert_eq!(common_prefix_len("foobarbaz", "blablabla"), 0);
    assert_eq!(common_prefix_len("añb", "añc"), 2);
}

#[test]
fn test_common_suffix_len() {
    assert_eq!(common_suffix_len("", ""), 0);
    assert_eq!(common_suffix_len("1234", "X0001234"), 4);
    assert_eq!(common_suffix_len("1234", "Xxxx"), 0);
    assert_eq!(common_suffix_len("xñb", "yñb"), 2);
}

#[test]
fn test_identical_positions() {
    assert_eq!(identical_positions("house", "mouse"), 4);
    assert_eq!(identical_positions("abc", "xyz"), 0);
}
