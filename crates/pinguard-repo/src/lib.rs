//! Repository adapters: discover workflow files, run the engine over them, write results back.
//!
//! This crate is allowed to do filesystem IO. It should not spawn external processes.

#![forbid(unsafe_code)]

mod batch;
mod discover;
mod fs;

pub use batch::{BatchOutcome, FileError, FileReport, FileResult, Mode, run_batch};
pub use discover::discover_workflows;
pub use fs::{read_workflow, write_atomic};
