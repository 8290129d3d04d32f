use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `pinguard.toml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so forward-compat is easy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PinguardConfigV1 {
    /// Optional schema string for tooling (`pinguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Base layer: `none` (default) or `builtin` (the embedded policy).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    /// When to fail the run: `error` (default) or `warning` (outdated pins fail too).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on: Option<String>,

    /// How many findings to emit before truncating the report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_findings: Option<u32>,

    /// Directories (repo-relative) scanned for workflow files. Defaults to `.github`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<String>,

    /// Glob patterns (repo-relative) of workflow files to leave alone.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow: Vec<AllowConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deny: Vec<DenyConfig>,
}

/// One allowed component and its preferred pin.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AllowConfig {
    pub identity: String,

    /// Preferred tag. Written as an annotation when `hash` is set.
    #[serde(default)]
    pub tag: String,

    /// Preferred content hash. Takes precedence over `tag` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// One forbidden component.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DenyConfig {
    pub identity: String,
    pub reason: String,
}
