//! The `policy` use case: print the effective policy as a standalone config.

use crate::check::{ConfigSource, load_config};
use pinguard_settings::Overrides;

/// Resolve `source` and render the flattened allow/deny tables as TOML.
///
/// The output has `preset = "none"` and can be saved as `pinguard.toml` verbatim.
pub fn run_policy(source: ConfigSource<'_>, overrides: Overrides) -> anyhow::Result<String> {
    let resolved = load_config(source, overrides)?;
    let cfg = pinguard_settings::policy_to_config(&resolved.policy);
    pinguard_settings::config_to_toml(&cfg)
}
