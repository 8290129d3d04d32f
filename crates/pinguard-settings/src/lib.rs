//! Config parsing, the embedded default policy, and policy resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

use anyhow::Context;
use pinguard_domain::Policy;

pub use model::{AllowConfig, DenyConfig, PinguardConfigV1};
pub use presets::{BUILTIN_POLICY_TOML, PRESET_BUILTIN, PRESET_NONE, default_config};
pub use resolve::{
    DEFAULT_MAX_FINDINGS, DEFAULT_ROOT, Overrides, ResolvedConfig, SCHEMA_CONFIG_V1,
};

/// Parse `pinguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<PinguardConfigV1> {
    let cfg: PinguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config used by the engine (preset + user tables + overrides).
pub fn resolve_config(
    cfg: PinguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}

/// The embedded default policy as a config model.
pub fn builtin_config() -> anyhow::Result<PinguardConfigV1> {
    presets::builtin()
}

/// Flatten a resolved policy back into a standalone config (preset `none`).
pub fn policy_to_config(policy: &Policy) -> PinguardConfigV1 {
    PinguardConfigV1 {
        schema: Some(SCHEMA_CONFIG_V1.to_string()),
        preset: Some(PRESET_NONE.to_string()),
        allow: policy
            .allowed()
            .map(|a| AllowConfig {
                identity: a.identity.clone(),
                tag: a.tag.clone(),
                hash: a.hash.clone(),
            })
            .collect(),
        deny: policy
            .denied()
            .map(|(identity, reason)| DenyConfig {
                identity: identity.to_string(),
                reason: reason.to_string(),
            })
            .collect(),
        ..PinguardConfigV1::default()
    }
}

/// Render a config as TOML.
pub fn config_to_toml(cfg: &PinguardConfigV1) -> anyhow::Result<String> {
    toml::to_string_pretty(cfg).context("serialize config as TOML")
}
