//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - lines that are not declarations passing through untouched
//! - rewrite idempotence
//! - deny precedence and hash-over-tag pin resolution
//! - document round-trips

use crate::engine::{LineOutcome, evaluate_line, rewrite_document};
use crate::model::{Decision, Evaluation};
use crate::policy::{AllowEntry, DenyEntry, Policy};
use proptest::prelude::*;

// ============================================================================
// Strategies for generating arbitrary values
// ============================================================================

/// Strategy for component identities: `owner/repo` with an optional nested path.
fn arb_identity() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,11}/[a-z][a-z0-9._-]{0,15}(/[a-z][a-z0-9-]{0,7})?")
        .unwrap()
}

/// Strategy for revisions: semantic tags or 40-hex content hashes.
fn arb_revision() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..20, 0u32..20, 0u32..20).prop_map(|(a, b, c)| format!("v{a}.{b}.{c}")),
        (1u32..10).prop_map(|a| format!("v{a}")),
        prop::string::string_regex("[0-9a-f]{40}").unwrap(),
    ]
}

/// Strategy for the text preceding the keyword: indentation plus an optional list marker.
fn arb_prefix() -> impl Strategy<Value = String> {
    (0usize..12, any::<bool>()).prop_map(|(indent, dash)| {
        let mut s = " ".repeat(indent);
        if dash {
            s.push_str("- ");
        }
        s
    })
}

/// Strategy for trailing text after the value.
fn arb_suffix() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        Just("  # pinned by hand".to_string()),
        Just(" # v0.0.1".to_string()),
    ]
}

/// Strategy for lines that cannot declare a reference (no `uses` token at all).
fn arb_plain_line() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ a-tv-zA-Z0-9:#@./_-]{0,60}").unwrap()
}

fn policy_with(entry: AllowEntry) -> Policy {
    Policy::new(vec![entry], Vec::<DenyEntry>::new()).expect("valid policy")
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn non_declaration_lines_pass_through(line in arb_plain_line(), id in arb_identity(), rev in arb_revision()) {
        let policy = policy_with(AllowEntry::tag(&id, &rev));
        prop_assert_eq!(evaluate_line(&line, &policy), LineOutcome::NoMatch);

        let doc = format!("{line}\n");
        let outcome = rewrite_document(&doc, &policy);
        prop_assert_eq!(outcome.text, doc);
        prop_assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn rewrite_is_idempotent(
        prefix in arb_prefix(),
        suffix in arb_suffix(),
        id in arb_identity(),
        current in arb_revision(),
        tag in arb_revision(),
        hash in prop::option::of(prop::string::string_regex("[0-9a-f]{40}").unwrap()),
    ) {
        let entry = AllowEntry { identity: id.clone(), tag, hash };
        let policy = policy_with(entry);
        let line = format!("{prefix}uses: {id}@{current}{suffix}");

        let LineOutcome::Evaluated { decision, rewritten, .. } = evaluate_line(&line, &policy) else {
            return Err(TestCaseError::fail("declaration line was not evaluated"));
        };

        match decision {
            Decision::Ok { .. } => prop_assert!(rewritten.is_none()),
            Decision::Replace { .. } => {
                let new_line = rewritten.expect("replace produces a line");
                let head = format!("{prefix}uses: ");
                prop_assert!(new_line.starts_with(&head), "prefix lost: {:?}", new_line);
                let again = evaluate_line(&new_line, &policy);
                prop_assert!(
                    matches!(again, LineOutcome::Evaluated { decision: Decision::Ok { .. }, rewritten: None, .. }),
                    "second pass was not OK: {:?}", again
                );
            }
            other => prop_assert!(false, "unexpected decision {:?}", other),
        }
    }

    #[test]
    fn deny_takes_precedence(id in arb_identity(), rev in arb_revision(), reason in "[a-z ]{1,20}") {
        let policy = Policy::new(
            vec![AllowEntry::tag(&id, &rev)],
            vec![DenyEntry::new(&id, &reason)],
        ).expect("overlap is allowed at build time");

        let eval = policy.evaluate(&format!("{id}@{rev}"));
        prop_assert!(
            matches!(&eval, Evaluation::Decided(Decision::Denied { reason: r, .. }) if *r == reason),
            "expected denied, got {:?}", eval
        );
    }

    #[test]
    fn hash_is_always_the_required_pin(id in arb_identity(), tag in arb_revision(), hash in "[0-9a-f]{40}") {
        let entry = AllowEntry::hash(&id, &tag, &hash);
        prop_assert_eq!(entry.required_pin().revision, hash.clone());

        let policy = policy_with(entry);
        if tag != hash {
            let eval = policy.evaluate(&format!("{id}@{tag}"));
            prop_assert!(
                matches!(&eval, Evaluation::Decided(Decision::Replace { replacement, .. }) if replacement.revision == hash),
                "expected replace to hash, got {:?}", eval
            );
        }
    }

    #[test]
    fn documents_keep_line_count(lines in prop::collection::vec(
        prop_oneof![arb_plain_line(), (arb_prefix(), arb_identity(), arb_revision()).prop_map(|(p, i, r)| format!("{p}uses: {i}@{r}"))],
        0..20,
    ), crlf in any::<bool>()) {
        let policy = policy_with(AllowEntry::tag("actions/checkout", "v4"));
        let eol = if crlf { "\r\n" } else { "\n" };
        let doc: String = lines.iter().map(|l| format!("{l}{eol}")).collect();

        let outcome = rewrite_document(&doc, &policy);
        prop_assert_eq!(outcome.text.matches(eol).count(), doc.matches(eol).count());
        prop_assert_eq!(outcome.text.lines().count(), doc.lines().count());
    }
}
