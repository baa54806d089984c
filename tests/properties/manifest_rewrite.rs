//! Property tests for build context rewriting.

use proptest::prelude::*;

use graft::domain::entities::ContextRewrite;
use graft::domain::services::ManifestRewriter;

fn service_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_]{0,8}").unwrap()
}

fn context() -> impl Strategy<Value = String> {
    proptest::string::string_regex("\\.{1,2}(/[a-z0-9_-]{1,8}){0,3}").unwrap()
}

fn manifest(services: &[(String, String)]) -> String {
    let mut text = String::from("name: demo\nservices:\n");
    for (name, ctx) in services {
        text.push_str(&format!(
            "  {name}:\n    build:\n      context: {ctx}\n    labels:\n      - graft.mode=serverbuild\n"
        ));
    }
    text
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: With nothing to rewrite, the manifest comes back byte for byte.
    #[test]
    fn property_no_rewrites_is_identity(text in "(?s).{0,400}") {
        prop_assert_eq!(ManifestRewriter::rewrite(&text, &[]), text);
    }

    /// PROPERTY: Rewriting one service changes exactly its context line.
    #[test]
    fn property_rewrite_touches_only_its_service(
        services in proptest::collection::btree_map(service_name(), context(), 1..5),
        pick in any::<prop::sample::Index>(),
    ) {
        let services: Vec<(String, String)> = services.into_iter().collect();
        let (target, original) = services[pick.index(services.len())].clone();
        let text = manifest(&services);

        let out = ManifestRewriter::rewrite(&text, &[ContextRewrite {
            service: target.clone(),
            original_context: original,
            remote_name: target.clone(),
        }]);

        let before: Vec<&str> = text.lines().collect();
        let after: Vec<&str> = out.lines().collect();
        prop_assert_eq!(before.len(), after.len());

        let changed: Vec<usize> = (0..before.len()).filter(|&i| before[i] != after[i]).collect();
        let expected = format!("      context: ./{}", target);
        prop_assert!(changed.len() <= 1);
        prop_assert!(after.contains(&expected.as_str()));
        for i in changed {
            prop_assert_eq!(after[i], expected.as_str());
        }
    }
}
