use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a reference finding.
///
/// Identity fields: check_id, code, workflow path (repo-relative), and the reference
/// identity (or the raw text for malformed references). The line number is left out so
/// moving a step does not change its fingerprint.
pub fn fingerprint_for_reference(
    check_id: &str,
    code: &str,
    workflow_path: &str,
    subject: &str,
) -> String {
    let canonical = [check_id, code, workflow_path, subject].join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
