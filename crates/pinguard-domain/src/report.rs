//! Diagnostic records and the verdict they roll up to.
//!
//! Every evaluated reference yields exactly one [`Diagnostic`]. Its `Display` form is the
//! line-oriented output contract: `<line-index> <status-word>. <detail>`.

use crate::fingerprint::fingerprint_for_reference;
use crate::model::Decision;
use pinguard_types::{Finding, Location, RepoPath, Severity, VerdictCounts, VerdictStatus, ids};
use serde_json::json;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticStatus {
    Ok,
    Replace,
    Error,
}

impl DiagnosticStatus {
    pub fn word(self) -> &'static str {
        match self {
            DiagnosticStatus::Ok => "OK",
            DiagnosticStatus::Replace => "Replace",
            DiagnosticStatus::Error => "Error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// 0-based index of the line within its file.
    pub line_index: usize,
    /// 0-based byte column where the reference value starts.
    pub column: usize,
    pub decision: Decision,
}

impl Diagnostic {
    pub fn status(&self) -> DiagnosticStatus {
        match &self.decision {
            Decision::Ok { .. } => DiagnosticStatus::Ok,
            Decision::Replace { .. } => DiagnosticStatus::Replace,
            _ => DiagnosticStatus::Error,
        }
    }

    pub fn detail(&self) -> String {
        match &self.decision {
            Decision::Ok { reference } => reference.to_string(),
            Decision::Replace {
                reference,
                replacement,
            } => {
                let target = replacement.expression(&reference.identity);
                match &replacement.display_tag {
                    Some(tag) => format!("{reference} -> {target} ({tag})"),
                    None => format!("{reference} -> {target}"),
                }
            }
            Decision::Denied { reference, reason } => format!("denied ({reason}): {reference}"),
            Decision::Unknown { reference } => format!("unknown action: {reference}"),
            Decision::Malformed { raw } => format!("unknown format: {raw}"),
        }
    }

    /// Convert to a report finding. OK references produce none.
    pub fn to_finding(&self, path: &RepoPath) -> Option<Finding> {
        let location = Some(Location {
            path: path.clone(),
            line: one_based(self.line_index),
            col: one_based(self.column),
        });

        let (severity, check_id, code, subject, message, help, data) = match &self.decision {
            Decision::Ok { .. } => return None,
            Decision::Replace {
                reference,
                replacement,
            } => (
                Severity::Warning,
                ids::CHECK_REFS_PINNED,
                ids::CODE_PIN_OUTDATED,
                reference.identity.as_str(),
                format!(
                    "'{}' is pinned to '{}' but policy requires '{}'",
                    reference.identity, reference.revision, replacement.revision
                ),
                "Run `pinguard update` to rewrite the pin in place.",
                json!({
                    "identity": reference.identity,
                    "current": reference.revision,
                    "required": replacement.revision,
                    "display_tag": replacement.display_tag,
                }),
            ),
            Decision::Denied { reference, reason } => (
                Severity::Error,
                ids::CHECK_REFS_ALLOWLIST,
                ids::CODE_ACTION_DENIED,
                reference.identity.as_str(),
                format!("'{}' is denied by policy: {}", reference.identity, reason),
                "Replace this step with an allowed component.",
                json!({
                    "identity": reference.identity,
                    "current": reference.revision,
                    "reason": reason,
                }),
            ),
            Decision::Unknown { reference } => (
                Severity::Error,
                ids::CHECK_REFS_ALLOWLIST,
                ids::CODE_ACTION_UNKNOWN,
                reference.identity.as_str(),
                format!("'{}' is not in the allow list", reference.identity),
                "Review the component and add it to the allow list in pinguard.toml.",
                json!({
                    "identity": reference.identity,
                    "current": reference.revision,
                }),
            ),
            Decision::Malformed { raw } => (
                Severity::Error,
                ids::CHECK_REFS_FORMAT,
                ids::CODE_REFERENCE_MALFORMED,
                raw.as_str(),
                format!("'{raw}' is not of the form identity@revision"),
                "Pin the reference with an explicit `@revision`.",
                json!({ "raw": raw }),
            ),
        };

        Some(Finding {
            severity,
            check_id: check_id.to_string(),
            code: code.to_string(),
            message,
            location,
            help: Some(help.to_string()),
            url: None,
            fingerprint: Some(fingerprint_for_reference(
                check_id,
                code,
                path.as_str(),
                subject,
            )),
            data,
        })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>4} {}. {}",
            self.line_index,
            self.status().word(),
            self.detail()
        )
    }
}

/// When outdated pins alone should fail the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailOn {
    #[default]
    Error,
    Warning,
}

/// 1-based position for report locations; positions past `u32` are dropped.
fn one_based(index: usize) -> Option<u32> {
    u32::try_from(index).ok().map(|i| i.saturating_add(1))
}

pub fn count_severities(findings: &[Finding]) -> VerdictCounts {
    let mut counts = VerdictCounts::default();
    for f in findings {
        match f.severity {
            Severity::Info => counts.info += 1,
            Severity::Warning => counts.warn += 1,
            Severity::Error => counts.error += 1,
        }
    }
    counts
}

pub fn compute_verdict(findings: &[Finding], fail_on: FailOn) -> VerdictStatus {
    let has_error = findings.iter().any(|f| f.severity == Severity::Error);
    if has_error {
        return VerdictStatus::Fail;
    }

    let has_warn = findings.iter().any(|f| f.severity == Severity::Warning);
    if has_warn {
        return match fail_on {
            FailOn::Warning => VerdictStatus::Fail,
            FailOn::Error => VerdictStatus::Warn,
        };
    }

    VerdictStatus::Pass
}

/// Deterministic ordering: severity (error first), path, line, check_id, code, message.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(compare_findings);
}

fn compare_findings(a: &Finding, b: &Finding) -> std::cmp::Ordering {
    let severity_rank = |sev: Severity| match sev {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
    };
    let key = |f: &Finding| match &f.location {
        Some(l) => (l.path.as_str().to_string(), l.line.unwrap_or(u32::MAX)),
        None => ("~".to_string(), u32::MAX),
    };
    let (ap, al) = key(a);
    let (bp, bl) = key(b);

    severity_rank(a.severity)
        .cmp(&severity_rank(b.severity))
        .then(ap.cmp(&bp))
        .then(al.cmp(&bl))
        .then(a.check_id.cmp(&b.check_id))
        .then(a.code.cmp(&b.code))
        .then(a.message.cmp(&b.message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Reference, Replacement};

    fn reference(raw: &str) -> Reference {
        Reference::parse(raw).expect("parse")
    }

    fn diag(line_index: usize, decision: Decision) -> Diagnostic {
        Diagnostic {
            line_index,
            column: 10,
            decision,
        }
    }

    #[test]
    fn display_matches_line_contract() {
        let ok = diag(
            3,
            Decision::Ok {
                reference: reference("actions/checkout@v4"),
            },
        );
        assert_eq!(ok.to_string(), "   3 OK. actions/checkout@v4");

        let replace = diag(
            12,
            Decision::Replace {
                reference: reference("actions/checkout@v2"),
                replacement: Replacement {
                    revision: "v4".to_string(),
                    display_tag: None,
                },
            },
        );
        assert_eq!(
            replace.to_string(),
            "  12 Replace. actions/checkout@v2 -> actions/checkout@v4"
        );

        let hash = diag(
            0,
            Decision::Replace {
                reference: reference("x/y@v2"),
                replacement: Replacement {
                    revision: "h123".to_string(),
                    display_tag: Some("v2".to_string()),
                },
            },
        );
        assert_eq!(hash.to_string(), "   0 Replace. x/y@v2 -> x/y@h123 (v2)");

        let denied = diag(
            7,
            Decision::Denied {
                reference: reference("foo/bar@abc123"),
                reason: "archived".to_string(),
            },
        );
        assert_eq!(denied.to_string(), "   7 Error. denied (archived): foo/bar@abc123");

        let unknown = diag(
            1,
            Decision::Unknown {
                reference: reference("acme/x@v1"),
            },
        );
        assert_eq!(unknown.to_string(), "   1 Error. unknown action: acme/x@v1");

        let malformed = diag(
            10000,
            Decision::Malformed {
                raw: "someorg/sometool".to_string(),
            },
        );
        assert_eq!(
            malformed.to_string(),
            "10000 Error. unknown format: someorg/sometool"
        );
    }

    #[test]
    fn findings_carry_location_and_codes() {
        let path = RepoPath::new(".github/workflows/ci.yml");
        let d = diag(
            4,
            Decision::Denied {
                reference: reference("foo/bar@abc123"),
                reason: "archived".to_string(),
            },
        );
        let f = d.to_finding(&path).expect("finding");
        assert_eq!(f.severity, Severity::Error);
        assert_eq!(f.check_id, ids::CHECK_REFS_ALLOWLIST);
        assert_eq!(f.code, ids::CODE_ACTION_DENIED);
        assert!(f.message.contains("archived"));
        let loc = f.location.expect("location");
        assert_eq!(loc.line, Some(5));
        assert_eq!(loc.col, Some(11));
        assert_eq!(f.data["reason"], "archived");
        assert!(f.fingerprint.is_some());

        let ok = diag(
            0,
            Decision::Ok {
                reference: reference("a/b@v1"),
            },
        );
        assert!(ok.to_finding(&path).is_none());
    }

    #[test]
    fn oversized_positions_drop_out_of_location() {
        let mut d = diag(
            usize::MAX,
            Decision::Malformed {
                raw: "a/b".to_string(),
            },
        );
        d.column = u32::MAX as usize;
        let loc = d
            .to_finding(&RepoPath::new("w.yml"))
            .and_then(|f| f.location)
            .expect("location");
        assert_eq!(loc.line, None);
        assert_eq!(loc.col, Some(u32::MAX));
    }

    #[test]
    fn outdated_pin_is_warning() {
        let d = diag(
            0,
            Decision::Replace {
                reference: reference("a/b@v1"),
                replacement: Replacement {
                    revision: "v2".to_string(),
                    display_tag: None,
                },
            },
        );
        let f = d.to_finding(&RepoPath::new("w.yml")).expect("finding");
        assert_eq!(f.severity, Severity::Warning);
        assert_eq!(f.code, ids::CODE_PIN_OUTDATED);
        assert_eq!(f.data["required"], "v2");
    }

    #[test]
    fn verdict_follows_fail_on() {
        let path = RepoPath::new("w.yml");
        let warn = diag(
            0,
            Decision::Replace {
                reference: reference("a/b@v1"),
                replacement: Replacement {
                    revision: "v2".to_string(),
                    display_tag: None,
                },
            },
        )
        .to_finding(&path)
        .expect("finding");
        let err = diag(
            1,
            Decision::Unknown {
                reference: reference("c/d@v1"),
            },
        )
        .to_finding(&path)
        .expect("finding");

        assert_eq!(compute_verdict(&[], FailOn::Error), VerdictStatus::Pass);
        assert_eq!(
            compute_verdict(std::slice::from_ref(&warn), FailOn::Error),
            VerdictStatus::Warn
        );
        assert_eq!(
            compute_verdict(std::slice::from_ref(&warn), FailOn::Warning),
            VerdictStatus::Fail
        );
        assert_eq!(
            compute_verdict(&[warn.clone(), err.clone()], FailOn::Error),
            VerdictStatus::Fail
        );

        let mut sorted = vec![warn, err];
        sort_findings(&mut sorted);
        assert_eq!(sorted[0].severity, Severity::Error);
        let counts = count_severities(&sorted);
        assert_eq!((counts.error, counts.warn, counts.info), (1, 1, 0));
    }
}
