use crate::model::PinguardConfigV1;
use anyhow::Context;

/// Embedded default policy.
///
/// Keep this small and readable. Anything repo-specific belongs in `pinguard.toml`.
pub const BUILTIN_POLICY_TOML: &str = include_str!("../builtin.toml");

pub const PRESET_NONE: &str = "none";
pub const PRESET_BUILTIN: &str = "builtin";

pub fn builtin() -> anyhow::Result<PinguardConfigV1> {
    toml::from_str(BUILTIN_POLICY_TOML).context("parse embedded builtin policy")
}

/// Config used when no `pinguard.toml` exists: the builtin tables and nothing else.
pub fn default_config() -> PinguardConfigV1 {
    PinguardConfigV1 {
        preset: Some(PRESET_BUILTIN.to_string()),
        ..PinguardConfigV1::default()
    }
}
