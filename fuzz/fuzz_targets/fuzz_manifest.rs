#![no_main]

use graft::domain::entities::ContextRewrite;
use graft::domain::services::{parse_manifest, ManifestRewriter};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(parsed) = parse_manifest(content) else {
        return;
    };

    // Rewriting whatever parsed must not panic either
    let rewrites: Vec<ContextRewrite> = parsed
        .services
        .values()
        .filter_map(|service| {
            let build = service.build.as_ref()?;
            Some(ContextRewrite {
                service: service.name.clone(),
                original_context: build.context.clone(),
                remote_name: service.name.clone(),
            })
        })
        .collect();
    let _ = ManifestRewriter::rewrite(content, &rewrites);
});
