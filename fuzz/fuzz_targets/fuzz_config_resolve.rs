//! Fuzz target for config parsing and policy resolution.
//!
//! Goal: arbitrary config text and overrides may be rejected, but must never panic.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_config_resolve
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pinguard_settings::{Overrides, parse_config_toml, resolve_config};

#[derive(Arbitrary, Debug)]
struct ConfigInput {
    text: String,
    preset: Option<String>,
    fail_on: Option<String>,
    max_findings: Option<u32>,
}

fuzz_target!(|input: ConfigInput| {
    if input.text.len() > 16 * 1024 {
        return;
    }

    let Ok(cfg) = parse_config_toml(&input.text) else {
        return;
    };
    let _ = resolve_config(
        cfg,
        Overrides {
            preset: input.preset,
            fail_on: input.fail_on,
            max_findings: input.max_findings,
        },
    );
});
