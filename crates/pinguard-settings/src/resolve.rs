use crate::model::{AllowConfig, DenyConfig, PinguardConfigV1};
use crate::presets;
use anyhow::Context;
use globset::Glob;
use pinguard_domain::{AllowEntry, DenyEntry, FailOn, Policy};
use std::collections::BTreeMap;

pub const SCHEMA_CONFIG_V1: &str = "pinguard.config.v1";
pub const DEFAULT_MAX_FINDINGS: usize = 200;
pub const DEFAULT_ROOT: &str = ".github";

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub preset: Option<String>,
    pub fail_on: Option<String>,
    pub max_findings: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub policy: Policy,
    pub fail_on: FailOn,
    pub max_findings: usize,
    /// Repo-relative directories to scan, in config order.
    pub roots: Vec<String>,
    /// Validated glob patterns.
    pub exclude: Vec<String>,
}

pub fn resolve_config(
    cfg: PinguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    if let Some(schema) = cfg.schema.as_deref()
        && schema != SCHEMA_CONFIG_V1
    {
        anyhow::bail!("unsupported config schema: {schema} (expected {SCHEMA_CONFIG_V1})");
    }

    let preset = overrides
        .preset
        .clone()
        .or(cfg.preset.clone())
        .unwrap_or_else(|| presets::PRESET_NONE.to_string());

    // Entries declared by the user must be valid on their own, before any layering hides a duplicate.
    build_policy(&cfg.allow, &cfg.deny).context("invalid policy in config")?;

    let policy = match preset.as_str() {
        presets::PRESET_NONE => build_policy(&cfg.allow, &cfg.deny)?,
        presets::PRESET_BUILTIN => {
            let base = presets::builtin()?;
            let layered = layer(&base, &cfg);
            for identity in &layered.lifted {
                tracing::warn!(identity, "user allow lifts a builtin deny");
            }
            build_policy(&layered.allow, &layered.deny).context("invalid layered policy")?
        }
        other => anyhow::bail!("unknown preset: {other} (expected none|builtin)"),
    };

    for identity in policy.overlapping() {
        tracing::warn!(identity, "identity is both allowed and denied; deny wins");
    }

    let fail_on = match overrides.fail_on.as_deref().or(cfg.fail_on.as_deref()) {
        Some(v) => parse_fail_on(v)?,
        None => FailOn::default(),
    };

    let max_findings = overrides
        .max_findings
        .or(cfg.max_findings)
        .map(|mf| mf as usize)
        .unwrap_or(DEFAULT_MAX_FINDINGS);

    let roots = if cfg.roots.is_empty() {
        vec![DEFAULT_ROOT.to_string()]
    } else {
        validate_roots(&cfg.roots)?;
        cfg.roots.clone()
    };

    validate_exclude(&cfg.exclude)?;

    tracing::debug!(
        preset = %preset,
        allowed = policy.allowed().count(),
        denied = policy.denied().count(),
        "resolved policy"
    );

    Ok(ResolvedConfig {
        policy,
        fail_on,
        max_findings,
        roots,
        exclude: cfg.exclude,
    })
}

struct Layered {
    allow: Vec<AllowConfig>,
    deny: Vec<DenyConfig>,
    /// Base denies removed by a user allow.
    lifted: Vec<String>,
}

/// Merge user tables over the builtin ones.
///
/// A user entry replaces the base entry for the same identity in the same table. A user allow
/// also lifts a base deny for that identity, which is reported in `lifted` so the caller can
/// warn about it. A user deny is never lifted.
fn layer(base: &PinguardConfigV1, user: &PinguardConfigV1) -> Layered {
    let mut allow: BTreeMap<&str, &AllowConfig> = base
        .allow
        .iter()
        .map(|a| (a.identity.as_str(), a))
        .collect();
    let mut deny: BTreeMap<&str, &DenyConfig> = base
        .deny
        .iter()
        .map(|d| (d.identity.as_str(), d))
        .collect();

    let mut lifted = Vec::new();
    for a in &user.allow {
        if deny.remove(a.identity.as_str()).is_some() {
            lifted.push(a.identity.clone());
        }
        allow.insert(a.identity.as_str(), a);
    }
    for d in &user.deny {
        deny.insert(d.identity.as_str(), d);
    }

    Layered {
        allow: allow.into_values().cloned().collect(),
        deny: deny.into_values().cloned().collect(),
        lifted,
    }
}

fn build_policy(allow: &[AllowConfig], deny: &[DenyConfig]) -> anyhow::Result<Policy> {
    let allow = allow.iter().map(|a| AllowEntry {
        identity: a.identity.clone(),
        tag: a.tag.clone(),
        hash: a.hash.clone(),
    });
    let deny = deny.iter().map(|d| DenyEntry::new(&d.identity, &d.reason));
    Ok(Policy::new(allow, deny)?)
}

fn validate_roots(roots: &[String]) -> anyhow::Result<()> {
    for root in roots {
        let trimmed = root.trim();
        if trimmed.is_empty() {
            anyhow::bail!("roots entries must not be empty");
        }
        if trimmed.starts_with('/') || trimmed.split('/').any(|seg| seg == "..") {
            anyhow::bail!("root must be a repo-relative path without '..': {root}");
        }
    }
    Ok(())
}

fn validate_exclude(patterns: &[String]) -> anyhow::Result<()> {
    for pattern in patterns {
        Glob::new(pattern).with_context(|| format!("invalid exclude glob: {pattern}"))?;
    }
    Ok(())
}

fn parse_fail_on(v: &str) -> anyhow::Result<FailOn> {
    match v {
        "error" => Ok(FailOn::Error),
        "warning" | "warn" => Ok(FailOn::Warning),
        other => anyhow::bail!("unknown fail_on: {other} (expected error|warning)"),
    }
}
