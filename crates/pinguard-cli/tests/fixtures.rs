use assert_cmd::Command;
use pinguard_test_util::{copy_tree, normalize_nondeterministic};
use predicates::prelude::*;
use predicates::str::contains;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(deprecated)]
fn pinguard_cmd() -> Command {
    Command::cargo_bin("pinguard").expect("pinguard binary")
}

fn fixtures_dir() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join("tests")
        .join("fixtures")
}

/// Scratch copy of a fixture; `update` rewrites files in place.
fn scratch(name: &str) -> TempDir {
    let tmp = TempDir::new().expect("temp dir");
    copy_tree(&fixtures_dir().join(name), tmp.path()).expect("copy fixture");
    tmp
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read file")
}

fn read_report(path: &Path) -> serde_json::Value {
    serde_json::from_str(&read(path)).expect("parse report")
}

#[test]
fn clean_fixture_passes() {
    let repo = scratch("clean");

    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .arg("update")
        .assert()
        .success()
        .stdout(contains(".github/actions/setup/action.yml\n"))
        .stdout(contains(".github/workflows/ci.yml\n"))
        .stdout(contains("  11 OK. actions/checkout@v3\n"))
        .stdout(contains("  12 OK. actions/setup-go@v3\n"))
        .stdout(contains("docker://").not())
        .stdout(contains("./.github/actions/setup").not());
}

#[test]
fn update_rewrites_outdated_pins() {
    let repo = scratch("outdated");
    let workflow = repo.path().join(".github/workflows/ci.yml");

    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .arg("update")
        .assert()
        .success()
        .stdout(contains(
            "  10 Replace. actions/checkout@v2 -> actions/checkout@v3\n",
        ))
        .stdout(contains(
            "  13 Replace. goreleaser/goreleaser-action@v2 -> \
             goreleaser/goreleaser-action@68acf3b1adf004ac9c2f0a4259e85c5f66e99bef (v3.0.0)\n",
        ));

    let expected = read(&fixtures_dir().join("outdated/expected/ci.yml"));
    assert_eq!(read(&workflow), expected);

    // A second pass finds nothing left to replace.
    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .arg("update")
        .assert()
        .success()
        .stdout(contains("Replace.").not());
    assert_eq!(read(&workflow), expected);
}

#[test]
fn check_mode_leaves_files_untouched() {
    let repo = scratch("outdated");
    let workflow = repo.path().join(".github/workflows/ci.yml");
    let before = read(&workflow);
    let report = repo.path().join("out/report.json");

    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .arg("check")
        .arg("--report-out")
        .arg(&report)
        .assert()
        .success()
        .stdout(contains("Replace."));

    assert_eq!(read(&workflow), before);

    let json = read_report(&report);
    assert_eq!(json["verdict"]["status"], "warn");
    assert_eq!(json["data"]["mode"], "check");
    assert_eq!(json["data"]["files_changed"], 1);
    assert_eq!(json["data"]["references_replaced"], 3);
    assert_eq!(json["data"]["references_ok"], 1);
    let reasons = json["verdict"]["reasons"].as_array().expect("reasons");
    assert!(reasons.iter().any(|r| r == "outdated_pins"));
}

#[test]
fn denied_fixture_fails_but_still_rewrites() {
    let repo = scratch("denied");
    let workflow = repo.path().join(".github/workflows/release.yml");

    let expected_stdout = "\
.github/workflows/release.yml
  10 Replace. actions/checkout@v2 -> actions/checkout@v3
  11 Error. denied (archived): actions/create-release@v1
  12 Error. unknown format: someorg/sometool
  13 Error. unknown action: acme/unvetted-action@v1
";

    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .arg("update")
        .assert()
        .code(2)
        .stdout(expected_stdout);

    let text = read(&workflow);
    assert!(text.contains("- uses: actions/checkout@v3\n"));
    assert!(text.contains("- uses: actions/create-release@v1\n"));
    assert!(text.contains("- uses: someorg/sometool\n"));
}

#[test]
fn denied_report_is_stable_after_normalization() {
    let repo = scratch("denied");
    let report = repo.path().join("report.json");

    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .arg("check")
        .arg("--report-out")
        .arg(&report)
        .assert()
        .code(2);

    let json = normalize_nondeterministic(read_report(&report));
    assert_eq!(json["schema"], "pinguard.report.v1");
    assert_eq!(json["tool"]["name"], "pinguard");
    assert_eq!(json["tool"]["version"], "__VERSION__");
    assert_eq!(json["run"]["started_at"], "__TIMESTAMP__");
    assert_eq!(json["verdict"]["status"], "fail");
    assert_eq!(json["verdict"]["counts"]["error"], 3);
    assert_eq!(json["verdict"]["counts"]["warn"], 1);
    assert_eq!(json["data"]["policy_source"], "builtin");
    assert_eq!(json["data"]["files_scanned"], 1);
    assert_eq!(json["data"]["references_scanned"], 4);
    assert_eq!(json["data"]["references_failed"], 3);

    let findings = json["findings"].as_array().expect("findings");
    assert_eq!(findings.len(), 4);
    // Errors sort ahead of warnings.
    assert_eq!(findings[0]["severity"], "error");
    assert_eq!(findings[3]["code"], "pin_outdated");
    assert!(
        findings
            .iter()
            .all(|f| f["location"]["path"] == ".github/workflows/release.yml")
    );
    assert!(findings.iter().any(|f| f["code"] == "action_denied"));
    assert!(findings.iter().any(|f| f["code"] == "reference_malformed"));
    assert!(findings.iter().any(|f| f["code"] == "action_unknown"));

    // Same input, same report once timing is normalized.
    let second = repo.path().join("second.json");
    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .arg("check")
        .arg("--report-out")
        .arg(&second)
        .assert()
        .code(2);
    assert_eq!(json, normalize_nondeterministic(read_report(&second)));
}

#[test]
fn custom_policy_fails_on_warning() {
    let repo = scratch("custom_policy");
    let workflow = repo.path().join(".github/workflows/build.yaml");

    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .arg("update")
        .assert()
        .code(2)
        .stdout(contains("   6 OK. actions/checkout@v4\n"))
        .stdout(contains(
            "   7 Replace. acme/deploy@v1 -> \
             acme/deploy@0123456789abcdef0123456789abcdef01234567 (v2)\n",
        ));

    let text = read(&workflow);
    assert!(text.contains("- uses: 'actions/checkout@v4'\n"));
    assert!(text.contains(
        "- { uses: acme/deploy@0123456789abcdef0123456789abcdef01234567, with: { env: prod } } # v2\n"
    ));
}

#[test]
fn fail_on_flag_overrides_config() {
    let repo = scratch("custom_policy");

    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .args(["--fail-on", "error", "check"])
        .assert()
        .success();
}

#[test]
fn custom_policy_without_builtin_rejects_builtin_entries() {
    let repo = scratch("clean");
    std::fs::write(
        repo.path().join("pinguard.toml"),
        "[[allow]]\nidentity = \"actions/checkout\"\ntag = \"v3\"\n",
    )
    .expect("write config");

    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .arg("check")
        .assert()
        .code(2)
        .stdout(contains("unknown action: actions/setup-go@v3"));

    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .args(["--preset", "builtin", "check"])
        .assert()
        .success();
}

#[test]
fn excluded_workflows_are_not_scanned() {
    let repo = scratch("exclude");

    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .arg("check")
        .assert()
        .success()
        .stdout(contains("generated").not())
        .stdout(contains("   4 OK. actions/checkout@v3\n"));
}

#[test]
fn md_and_annotations_render_from_report() {
    let repo = scratch("denied");
    let report = repo.path().join("report.json");
    let md_out = repo.path().join("comment.md");

    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .arg("check")
        .arg("--report-out")
        .arg(&report)
        .arg("--markdown-out")
        .arg(&md_out)
        .assert()
        .code(2);

    let md = read(&md_out);
    assert!(md.starts_with("# Pinguard report\n"));
    assert!(md.contains("Verdict: **FAIL**"));

    pinguard_cmd()
        .arg("md")
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::diff(md));

    pinguard_cmd()
        .arg("annotations")
        .arg("--report")
        .arg(&report)
        .args(["--max", "2"])
        .assert()
        .success()
        .stdout(contains("::error file=.github/workflows/release.yml,line=12"))
        .stdout(predicate::function(|s: &str| s.lines().count() == 2));
}

#[test]
fn explain_known_and_unknown_identifiers() {
    pinguard_cmd()
        .args(["explain", "refs.pinned"])
        .assert()
        .success()
        .stdout(contains("Before (flagged):"));

    pinguard_cmd()
        .args(["explain", "action_denied"])
        .assert()
        .success();

    pinguard_cmd()
        .args(["explain", "no.such.check"])
        .assert()
        .code(1)
        .stderr(contains("refs.allowlist"));
}

#[test]
fn policy_prints_builtin_tables() {
    let repo = TempDir::new().expect("temp dir");

    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .arg("policy")
        .assert()
        .success()
        .stdout(contains("preset = \"none\""))
        .stdout(contains("identity = \"rajatjindal/krew-release-bot\""))
        .stdout(contains("reason = \"archived\""));
}

#[test]
fn version_flag() {
    pinguard_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("0.1.0"));
}

#[test]
fn missing_repo_root_is_a_runtime_error() {
    pinguard_cmd()
        .args(["--repo-root", "/nonexistent/pinguard/repo", "check"])
        .assert()
        .code(1)
        .stderr(contains("pinguard error"));
}

#[test]
fn missing_workflow_root_writes_error_report() {
    let repo = TempDir::new().expect("temp dir");
    let report = repo.path().join("report.json");

    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .arg("check")
        .arg("--report-out")
        .arg(&report)
        .assert()
        .code(1)
        .stderr(contains("workflow root not found"));

    let json = read_report(&report);
    assert_eq!(json["verdict"]["status"], "fail");
    assert_eq!(json["findings"][0]["check_id"], "tool.runtime");
    assert_eq!(json["findings"][0]["code"], "runtime_error");
}

#[test]
fn explicit_config_must_exist() {
    let repo = scratch("clean");

    pinguard_cmd()
        .arg("--repo-root")
        .arg(repo.path())
        .args(["--config", "missing.toml", "check"])
        .assert()
        .code(1)
        .stderr(contains("missing.toml"));
}
