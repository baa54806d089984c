//! Property tests for `${KEY}` secret substitution.

use proptest::prelude::*;

use graft::domain::value_objects::SecretError;
use graft::SecretStore;

fn key() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Z][A-Z0-9_]{0,10}").unwrap()
}

fn plain_value() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-zA-Z0-9:/@?=._-]{0,24}").unwrap()
}

/// Small key space so values and text refer to keys that exist.
fn near_key() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-D]").unwrap()
}

/// Values built from plain text, references to other keys and loose
/// `${` / `}` fragments that can join with their neighbors into new tokens.
fn value() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        plain_value(),
        near_key().prop_map(|k| format!("${{{}}}", k)),
        Just("${".to_string()),
        Just("}".to_string()),
    ];
    proptest::collection::vec(fragment, 0..4).prop_map(|parts| parts.concat())
}

fn text() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z :\\-\n]{0,40}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: An empty store returns the text unchanged.
    #[test]
    fn property_empty_store_is_identity(input in "(?s).{0,200}") {
        prop_assert_eq!(SecretStore::new().inject(&input), Ok(input));
    }

    /// PROPERTY: Placeholders for keys not in the store are left as written.
    #[test]
    fn property_unknown_placeholders_survive(
        known in key(),
        known_value in plain_value(),
        unknown in key(),
        prefix in text(),
        suffix in text(),
    ) {
        prop_assume!(known != unknown);
        let mut store = SecretStore::new();
        store.insert(known.clone(), known_value.clone());

        let input = format!("{}${{{}}}{}${{{}}}", prefix, known, suffix, unknown);
        let expected = format!("{}{}{}${{{}}}", prefix, known_value, suffix, unknown);

        prop_assert_eq!(store.inject(&input), Ok(expected));
    }

    /// PROPERTY: A successful injection leaves no known token behind, so a
    /// second pass is a no-op, even when values reference other secrets.
    #[test]
    fn property_inject_is_idempotent(
        entries in proptest::collection::btree_map(near_key(), value(), 0..5),
        pieces in proptest::collection::vec((text(), near_key()), 0..6),
        tail in value(),
    ) {
        let mut store = SecretStore::new();
        for (k, v) in &entries {
            store.insert(k.clone(), v.clone());
        }
        let mut input: String = pieces
            .iter()
            .map(|(t, k)| format!("{}${{{}}}", t, k))
            .collect();
        input.push_str(&tail);

        if let Ok(once) = store.inject(&input) {
            for key in store.keys() {
                let token = format!("${{{}}}", key);
                prop_assert!(!once.contains(&token), "{} left in {:?}", token, once);
            }
            prop_assert_eq!(store.inject(&once), Ok(once.clone()));
        }
    }

    /// PROPERTY: A key whose value contains its own token is always a cycle.
    #[test]
    fn property_self_reference_is_a_cycle(
        k in key(),
        before in plain_value(),
        after in plain_value(),
    ) {
        let mut store = SecretStore::new();
        store.insert(k.clone(), format!("{}${{{}}}{}", before, k, after));

        let result = store.inject(&format!("${{{}}}", k));
        prop_assert_eq!(result, Err(SecretError::Cycle { key: k }));
    }

    /// PROPERTY: Parsing never panics and every parsed key came from the input.
    #[test]
    fn property_parse_never_panics(content in "(?s).{0,300}") {
        let store = SecretStore::parse(&content);
        for key in store.keys() {
            prop_assert!(content.contains(key));
        }
    }
}
