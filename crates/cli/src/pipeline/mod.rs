//! Run orchestration module.

mod controller;
mod stats;

pub use controller::{RunController, RunState};
pub use stats::RunStats;
