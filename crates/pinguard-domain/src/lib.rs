//! Pure reference evaluation (no IO).
//!
//! Input: workflow text and an immutable [`Policy`].
//! Output: rewritten text plus one diagnostic per evaluated reference.

#![forbid(unsafe_code)]

pub mod extract;
pub mod fingerprint;
pub mod model;
pub mod policy;
pub mod report;
pub mod rewrite;

mod engine;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use engine::{DocumentOutcome, LineOutcome, evaluate_line, process_lines, rewrite_document};
pub use model::{Decision, Evaluation, Reference, Replacement};
pub use policy::{AllowEntry, DenyEntry, Policy, PolicyError};
pub use report::{Diagnostic, DiagnosticStatus, FailOn};
