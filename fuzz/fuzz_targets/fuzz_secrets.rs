#![no_main]

use graft::SecretStore;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    let (secrets, text) = content.split_once('\0').unwrap_or((content, content));
    let store = SecretStore::parse(secrets);
    if let Ok(once) = store.inject(text) {
        assert_eq!(store.inject(&once), Ok(once.clone()));
    }
});
