//! # Allvis Harvest
//!
//! Run orchestration shared by the `allvis-harvest` binary and the
//! end-to-end tests.
//!
//! Provides:
//! - The run controller and its state machine
//! - Run statistics
//! - Failure taxonomy and exit codes

pub mod error;
pub mod pipeline;

pub use error::{exit_code_for, RunFailure};
pub use pipeline::{RunController, RunState, RunStats};
