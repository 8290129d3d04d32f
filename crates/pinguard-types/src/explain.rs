//! Explain registry for checks and codes.
//!
//! Maps check IDs and codes to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a check or code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the check/code.
    pub title: &'static str,
    /// What the check does and why it exists.
    pub description: &'static str,
    /// How to fix violations.
    pub remediation: &'static str,
    /// Before/after workflow snippets.
    pub examples: ExamplePair,
}

/// Before and after workflow snippets.
#[derive(Debug, Clone)]
pub struct ExamplePair {
    /// Workflow text that would trigger a finding.
    pub before: &'static str,
    /// Workflow text that passes the check.
    pub after: &'static str,
}

/// Look up an explanation by check_id or code.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    match identifier {
        // Check IDs
        ids::CHECK_REFS_ALLOWLIST => Some(explain_allowlist()),
        ids::CHECK_REFS_PINNED => Some(explain_pinned()),
        ids::CHECK_REFS_FORMAT => Some(explain_format()),

        // Codes
        ids::CODE_ACTION_DENIED => Some(explain_action_denied()),
        ids::CODE_ACTION_UNKNOWN => Some(explain_action_unknown()),
        ids::CODE_PIN_OUTDATED => Some(explain_pin_outdated()),
        ids::CODE_REFERENCE_MALFORMED => Some(explain_reference_malformed()),

        _ => None,
    }
}

/// List all known check IDs.
pub fn all_check_ids() -> &'static [&'static str] {
    &[
        ids::CHECK_REFS_ALLOWLIST,
        ids::CHECK_REFS_PINNED,
        ids::CHECK_REFS_FORMAT,
    ]
}

/// List all known codes.
pub fn all_codes() -> &'static [&'static str] {
    &[
        ids::CODE_ACTION_DENIED,
        ids::CODE_ACTION_UNKNOWN,
        ids::CODE_PIN_OUTDATED,
        ids::CODE_REFERENCE_MALFORMED,
    ]
}

// --- Check-level explanations ---

fn explain_allowlist() -> Explanation {
    Explanation {
        title: "Step References Must Be Governed by Policy",
        description: "\
Every `uses:` reference to an external component must name an identity that the
policy knows about.

- Identities on the deny list are forbidden outright (archived, compromised, or replaced).
- Identities missing from the allow list have never been reviewed.

The deny list always wins: an identity listed in both tables is treated as denied.",
        remediation: "\
Replace denied components with the recommended alternative, or add reviewed
components to the allow list in pinguard.toml:

    [[allow]]
    identity = \"owner/repo\"
    tag = \"v1\"",
        examples: ExamplePair {
            before: r#"steps:
  - uses: actions/create-release@v1"#,
            after: r#"steps:
  - uses: softprops/action-gh-release@v2"#,
        },
    }
}

fn explain_pinned() -> Explanation {
    Explanation {
        title: "Step References Use the Preferred Pin",
        description: "\
An allowed component is referenced at a revision other than the one the policy prefers.

When the policy entry carries a content hash, the hash is the required pin and the
tag is only written as a trailing annotation. A reference that matches the tag but not
the hash is still outdated.",
        remediation: "\
Run `pinguard update` to rewrite the pin in place. Only the reference value (and the
trailing annotation for hash pins) changes; indentation and keys are preserved.",
        examples: ExamplePair {
            before: r#"steps:
  - uses: actions/checkout@v2"#,
            after: r#"steps:
  - uses: actions/checkout@v4"#,
        },
    }
}

fn explain_format() -> Explanation {
    Explanation {
        title: "Step References Are Well Formed",
        description: "\
A `uses:` value must have the shape `identity@revision`, with both halves non-empty.
References without a revision float with the default branch and cannot be governed.

Local references (`./path`) and container references (`docker://image`) are not
evaluated.",
        remediation: "\
Add an explicit revision after `@`, preferably the one listed in the policy.",
        examples: ExamplePair {
            before: r#"steps:
  - uses: someorg/sometool"#,
            after: r#"steps:
  - uses: someorg/sometool@v1"#,
        },
    }
}

// --- Code-level explanations ---

fn explain_action_denied() -> Explanation {
    let mut exp = explain_allowlist();
    exp.title = "Denied Component";
    exp
}

fn explain_action_unknown() -> Explanation {
    Explanation {
        title: "Unknown Component",
        description: "\
The referenced identity is absent from the allow list. Unknown components are
reported but never rewritten.",
        remediation: "\
Review the component and add it to the allow list, or remove the step.",
        examples: ExamplePair {
            before: r#"# pinguard.toml has no entry for acme/deploy
  - uses: acme/deploy@v3"#,
            after: r#"# pinguard.toml
[[allow]]
identity = "acme/deploy"
tag = "v3""#,
        },
    }
}

fn explain_pin_outdated() -> Explanation {
    let mut exp = explain_pinned();
    exp.title = "Outdated Pin";
    exp
}

fn explain_reference_malformed() -> Explanation {
    let mut exp = explain_format();
    exp.title = "Malformed Reference";
    exp
}
