use movediff::{DiffConfig, FragmentKind, MoveDiff};
use proptest::prelude::*;

fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "alpha", "beta", "gamma", "delta", "epsilon", "x", " ", " ", "\n", "\n\n", ". ",
            "[[link]]", "don't",
        ]),
        0..40,
    )
    .prop_map(|pieces| pieces.concat())
}

fn full_config() -> DiffConfig {
    let mut config = DiffConfig::default();
    config.full_diff(true);
    config
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn new_text_is_reconstructed(old in text_strategy(), new in text_strategy()) {
        let diff = full_config().diff(&old, &new).unwrap();
        prop_assert_eq!(diff.new_text_from_fragments(), diff.new_text());
    }

    #[test]
    fn blocks_reproduce_both_texts(old in text_strategy(), new in text_strategy()) {
        let mut config = full_config();
        config.consistency_check(true).block_min_length(1);
        prop_assert!(config.diff(&old, &new).is_ok());
    }

    #[test]
    fn every_move_has_one_mark(old in text_strategy(), new in text_strategy()) {
        let mut config = full_config();
        config.block_min_length(1);
        let diff = config.diff(&old, &new).unwrap();
        for color in diff.moved_groups() {
            let marks = diff
                .fragments()
                .iter()
                .filter(|f| {
                    matches!(f.kind(), FragmentKind::MarkLeft | FragmentKind::MarkRight)
                        && f.color() == Some(color)
                })
                .count();
            prop_assert_eq!(marks, 1);
        }
    }

    #[test]
    fn identical_texts_are_unchanged(text in text_strategy()) {
        let diff = MoveDiff::from_texts(&text, &text).unwrap();
        prop_assert!(diff.is_unchanged());
        let content = diff
            .fragments()
            .iter()
            .filter(|f| f.kind().is_content())
            .collect::<Vec<_>>();
        prop_assert_eq!(content.len(), 1);
        prop_assert_eq!(content[0].kind(), FragmentKind::Same);
    }
}

#[test]
fn unmoved_old_text_is_reconstructed() {
    let old = "The quick brown fox jumps over the lazy dog.";
    let new = "The quick red fox jumps over the sleepy dog.";
    let diff = full_config().diff(old, new).unwrap();
    assert!(diff.moved_groups().is_empty());
    let deleted = diff
        .fragments()
        .iter()
        .filter(|f| f.kind() == FragmentKind::Delete)
        .map(|f| f.text())
        .collect::<Vec<_>>();
    assert_eq!(deleted, vec!["brown", "lazy"]);
    assert_eq!(diff.old_text_from_fragments(), old);
    assert_eq!(diff.new_text_from_fragments(), new);
}

#[test]
fn moved_paragraph_is_reconstructed() {
    let old = "First paragraph stays put.\n\nSecond paragraph moves down.\n\nThird paragraph with many words.";
    let new = "First paragraph stays put.\n\nThird paragraph with many words.\n\nSecond paragraph moves down.";
    let diff = full_config().diff(old, new).unwrap();
    assert_eq!(diff.moved_groups().len(), 1);
    assert_eq!(diff.new_text_from_fragments(), new);
}
