//! Property tests for deployment mode resolution.

use proptest::prelude::*;

use graft::DeployMode;

fn unrelated_label() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_.]{0,12}=[A-Za-z0-9_.-]{0,12}")
        .unwrap()
        .prop_filter("not a mode key", |s| {
            let key = s.split('=').next().unwrap_or_default();
            key != "graft.mode" && key != "mode"
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: A service with no mode label is always `localbuild`.
    #[test]
    fn property_missing_mode_label_is_localbuild(
        labels in proptest::collection::vec(unrelated_label(), 0..8),
    ) {
        prop_assert_eq!(DeployMode::from_labels(&labels), Ok(DeployMode::LocalBuild));
    }

    /// PROPERTY: The first mode label decides, wherever it sits.
    #[test]
    fn property_first_mode_label_wins(
        before in proptest::collection::vec(unrelated_label(), 0..4),
        after in proptest::collection::vec(unrelated_label(), 0..4),
        server in any::<bool>(),
        key in prop_oneof![Just("graft.mode"), Just("mode")],
    ) {
        let (first, second) = if server {
            ("serverbuild", "localbuild")
        } else {
            ("localbuild", "serverbuild")
        };
        let mut labels = before;
        labels.push(format!("{}={}", key, first));
        labels.extend(after);
        labels.push(format!("graft.mode={}", second));

        let expected = if server { DeployMode::ServerBuild } else { DeployMode::LocalBuild };
        prop_assert_eq!(DeployMode::from_labels(&labels), Ok(expected));
    }

    /// PROPERTY: Mode values are case-insensitive.
    #[test]
    fn property_mode_value_ignores_case(
        flips in proptest::collection::vec(any::<bool>(), 11),
    ) {
        let value: String = "serverbuild"
            .chars()
            .zip(flips)
            .map(|(c, upper)| if upper { c.to_ascii_uppercase() } else { c })
            .collect();
        prop_assert_eq!(DeployMode::parse(&value), Some(DeployMode::ServerBuild));
    }
}
