//! # Contracts
//!
//! Shared interface contracts for the harvester: the aggregate document
//! model, the run configuration blueprint, the sink trait and the common
//! error type. Business crates depend on this crate only; reverse
//! dependencies are prohibited.
//!
//! ## Document Model
//! - One `ResultDocument` per run, stamped before the first fetch
//! - `results` is keyed by organization id, each entry an `OrgResultBundle`
//!   holding the upstream organization plus one raw payload per endpoint

mod blueprint;
mod document;
mod error;
mod organization;
mod organization_id;
mod sink;

pub use blueprint::*;
pub use document::*;
pub use error::*;
pub use organization::Organization;
pub use organization_id::OrganizationId;
pub use sink::*;
