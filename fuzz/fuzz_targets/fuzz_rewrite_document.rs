//! Fuzz target for workflow rewriting against the builtin policy.
//!
//! Goal: rewriting should never panic, and rewriting its own output must be a no-op.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_rewrite_document
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use pinguard_domain::rewrite_document;
use pinguard_settings::{Overrides, builtin_config, resolve_config};
use std::sync::OnceLock;

fn policy() -> &'static pinguard_domain::Policy {
    static POLICY: OnceLock<pinguard_domain::Policy> = OnceLock::new();
    POLICY.get_or_init(|| {
        let cfg = builtin_config().expect("builtin policy parses");
        resolve_config(cfg, Overrides::default())
            .expect("builtin policy resolves")
            .policy
    })
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 64 * 1024 {
        return;
    }

    let first = rewrite_document(text, policy());
    let second = rewrite_document(&first.text, policy());
    assert_eq!(second.text, first.text, "rewrite is not idempotent");
    assert!(!second.changed);
});
