//! Stable identifiers for checks and finding codes.
//!
//! `check_id` is a dotted namespace. `code` is a short snake_case discriminator.

// Checks
pub const CHECK_REFS_ALLOWLIST: &str = "refs.allowlist";
pub const CHECK_REFS_PINNED: &str = "refs.pinned";
pub const CHECK_REFS_FORMAT: &str = "refs.format";

// Codes: refs.allowlist
pub const CODE_ACTION_DENIED: &str = "action_denied";
pub const CODE_ACTION_UNKNOWN: &str = "action_unknown";

// Codes: refs.pinned
pub const CODE_PIN_OUTDATED: &str = "pin_outdated";

// Codes: refs.format
pub const CODE_REFERENCE_MALFORMED: &str = "reference_malformed";

// Tool-level
pub const CHECK_TOOL_RUNTIME: &str = "tool.runtime";
pub const CODE_RUNTIME_ERROR: &str = "runtime_error";
pub const CODE_IO_ERROR: &str = "io_error";

// Verdict reasons
pub const REASON_POLICY_VIOLATION: &str = "policy_violation";
pub const REASON_OUTDATED_PINS: &str = "outdated_pins";
pub const REASON_IO_FAILURE: &str = "io_failure";
pub const REASON_TRUNCATED: &str = "truncated";
pub const REASON_TOOL_ERROR: &str = "tool_error";
