//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Probe each registered instance
//!     → Update instance health state
//!
//! Passive health checks (http/server.rs):
//!     Upstream call outcome observed
//!     → Connection errors and 502/503/504 count as failures
//!     → Anything else counts as success
//! ```
//!
//! # Design Decisions
//! - Active and passive checks are complementary
//! - State transitions require consecutive successes/failures
//! - Health state is per-instance, not per-service

pub mod active;

pub use active::HealthMonitor;
