//! Session management
//!
//! This module provides the pieces that own session state:
//! - `Session` and its per-session control block
//! - `SessionRegistry` for code allocation, lookup and removal
//! - State transitions (binding, readiness, stop)
//! - Idle-session expiry

mod machine;
mod registry;
mod role;
mod session;
mod stats;
mod sweeper;

pub use machine::{BindOutcome, StopPlan};
pub use registry::{CodeGenerator, RandomCodes, SessionRegistry};
pub use role::{PerRole, Role};
pub use session::{Session, SessionControl, SessionState};
pub use stats::SessionSnapshot;
pub use sweeper::{spawn_idle_sweeper, sweep_idle};
