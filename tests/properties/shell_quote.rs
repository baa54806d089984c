//! Property tests for POSIX shell quoting.

use std::process::Command;

use proptest::prelude::*;

use graft::domain::services::shell_quote;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: A quoted word reaches the command as exactly one argument,
    /// unchanged.
    #[test]
    fn property_quoted_word_survives_the_shell(word in "[^\\x00]{0,40}") {
        let output = Command::new("sh")
            .arg("-c")
            .arg(format!("printf '%s' {}", shell_quote(&word)))
            .output()
            .unwrap();

        prop_assert!(output.status.success());
        prop_assert_eq!(String::from_utf8(output.stdout).unwrap(), word);
    }
}
