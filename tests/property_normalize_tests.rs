use climbox::core::{FieldResolver, RawRow, normalize_key};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn normalization_is_idempotent(header in any::<String>()) {
        let once = normalize_key(&header);
        let twice = normalize_key(once.as_str());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_keys_use_restricted_charset(header in "[ -~]{0,48}") {
        let key = normalize_key(&header);
        let text = key.as_str();
        prop_assert!(text.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        prop_assert!(!text.starts_with('_'));
        prop_assert!(!text.ends_with('_'));
        prop_assert!(!text.contains("__"));
    }

    #[test]
    fn header_always_picks_itself_exactly(header in "[A-Za-z][A-Za-z0-9 _/%-]{0,24}") {
        let row = RawRow::from_pairs([("Other Column", json!(0)), (header.as_str(), json!(1))]);
        let resolver = FieldResolver::default();
        let picked = resolver.pick(&row, &[header.as_str()]);

        prop_assert!(picked.is_match());
        if normalize_key(&header) != normalize_key("Other Column") {
            prop_assert!(picked.is_exact());
            prop_assert_eq!(picked.value(), Some(&json!(1)));
        }
    }
}
