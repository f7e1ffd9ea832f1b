use movediff::{DiffConfig, MoveDiff};

fn main() {
    let config: DiffConfig =
        serde_json::from_str(r#"{"full_diff": true, "block_min_length": 1}"#).unwrap();
    let diff = config.diff("cat dog bird", "bird cat dog").unwrap();
    println!("{}", serde_json::to_string_pretty(&diff).unwrap());

    let fragments = MoveDiff::from_texts("A B C", "A X C").unwrap().into_fragments();
    println!("{}", serde_json::to_string_pretty(&fragments).unwrap());
}
