//! `push_gate`: a server-side git push gate.
//!
//! Two policies run for every pushed branch ref:
//!
//! - newly created branches must follow a naming convention, and
//! - files touched by the push must not introduce style violations on the
//!   lines the push added or changed. Pre-existing violations are tolerated.
//!
//! The library is organised as:
//! - [`model`]: push events, revisions, violations, gate outcomes and reports
//! - [`diff`]: LCS edit scripts and new-line classification
//! - [`repo`]: history access (git or in-memory)
//! - [`lint`]: external style checker invocation
//! - [`gate`]: base resolution, change extraction, filtering, branch policy
//! - [`config`]: layered configuration
//! - [`cli`]: command-line interface

#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod gate;
pub mod lint;
pub mod logging;
pub mod model;
pub mod repo;

pub use error::{ErrorCode, GateError, Result, StructuredError};
pub use gate::PushGate;
pub use model::{GateOutcome, PushEvent, PushReport, Violation};
