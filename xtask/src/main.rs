//! Developer tasks (schema generation, registry and builtin policy checks).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use schemars::schema_for;
use std::fs;
use std::path::PathBuf;

/// Get the project root (parent of xtask directory).
fn project_root() -> anyhow::Result<PathBuf> {
    let manifest_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir().context("determine current directory")?,
    };

    if manifest_dir.ends_with("xtask") {
        manifest_dir
            .parent()
            .map(|p| p.to_path_buf())
            .context("xtask has no parent")
    } else {
        Ok(manifest_dir)
    }
}

fn schemas_dir() -> anyhow::Result<PathBuf> {
    Ok(project_root()?.join("schemas"))
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(pinguard_types::PinguardReport)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(pinguard_settings::PinguardConfigV1)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "pinguard.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "pinguard.config.v1.json",
            generate: generate_config_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

/// Fail when a checked-in schema is missing or differs from the generated one.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }

        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }

    for name in &missing {
        eprintln!("missing: {name}");
    }
    for name in &mismatched {
        eprintln!("out of date: {name}");
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

/// Token pattern for codes and verdict reasons.
fn is_valid_token(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Every check ID and code has a complete explanation, and all IDs are well-formed tokens.
fn explain_coverage() -> anyhow::Result<()> {
    use pinguard_types::explain::{all_check_ids, all_codes, lookup_explanation};

    let mut errors = Vec::new();

    for id in all_check_ids() {
        if !id.split('.').all(is_valid_token) {
            errors.push(format!("check ID '{id}' is not dotted lowercase tokens"));
        }
    }
    for code in all_codes() {
        if !is_valid_token(code) {
            errors.push(format!("code '{code}' is not a lowercase token"));
        }
    }

    for id in all_check_ids().iter().chain(all_codes()) {
        let Some(exp) = lookup_explanation(id) else {
            errors.push(format!("'{id}' has no explanation"));
            continue;
        };
        let fields = [
            ("title", exp.title),
            ("description", exp.description),
            ("remediation", exp.remediation),
            ("examples.before", exp.examples.before),
            ("examples.after", exp.examples.after),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                errors.push(format!("'{id}' has empty {name}"));
            }
        }
    }

    if !errors.is_empty() {
        for error in &errors {
            eprintln!("  - {error}");
        }
        bail!("Explain coverage failed with {} errors", errors.len());
    }

    println!("✓ {} check IDs have explanations", all_check_ids().len());
    println!("✓ {} codes have explanations", all_codes().len());
    Ok(())
}

/// The embedded policy must resolve cleanly: no overlaps, full-length hashes.
fn check_builtin() -> anyhow::Result<()> {
    let cfg = pinguard_settings::builtin_config().context("parse builtin policy")?;
    let resolved = pinguard_settings::resolve_config(cfg, pinguard_settings::Overrides::default())
        .context("resolve builtin policy")?;
    let policy = &resolved.policy;

    let mut errors = Vec::new();
    for identity in policy.overlapping() {
        errors.push(format!("'{identity}' is both allowed and denied"));
    }
    for entry in policy.allowed() {
        if let Some(hash) = &entry.hash
            && !(hash.len() == 40 && hash.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')))
        {
            errors.push(format!(
                "'{}' hash '{hash}' is not a 40-character lowercase hex commit",
                entry.identity
            ));
        }
    }

    if !errors.is_empty() {
        for error in &errors {
            eprintln!("  - {error}");
        }
        bail!("Builtin policy check failed with {} errors", errors.len());
    }

    println!(
        "✓ builtin policy: {} allowed, {} denied",
        policy.allowed().count(),
        policy.denied().count()
    );
    Ok(())
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  explain-coverage  Validate all check IDs and codes have explanations");
    eprintln!("  check-builtin     Validate the embedded default policy");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "explain-coverage" => explain_coverage(),
        "check-builtin" => check_builtin(),
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens() {
        assert!(is_valid_token("action_denied"));
        assert!(is_valid_token("outdated_pins"));
        assert!(!is_valid_token("Action"));
        assert!(!is_valid_token("_x"));
        assert!(!is_valid_token(""));
    }

    #[test]
    fn schemas_serialize_with_trailing_newline() {
        for spec in schema_specs() {
            let json = serialize_schema(&(spec.generate)()).expect("serialize");
            assert!(json.ends_with("}\n"), "{}", spec.filename);
        }
    }
}
