//! Service discovery.
//!
//! # Data Flow
//! ```text
//! Outcome::Forward { upstream: "identity-service", .. }
//!     → ServiceResolver::resolve("identity-service")
//!     → registry.rs (instances grouped by service, load balancer per service)
//!     → InstanceGuard (concrete address + reserved connection slot)
//! ```
//!
//! # Design Decisions
//! - The router never resolves endpoints; it only names services
//! - Resolution is injected as a trait object so other registries can plug in
//! - Static registry built once from configuration

pub mod registry;

use std::sync::Arc;

use crate::load_balancer::{InstanceGuard, ServiceInstance};

pub use registry::StaticRegistry;

/// Why a logical service could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    #[error("service {0:?} is not registered")]
    UnknownService(String),

    #[error("service {0:?} has no healthy instance with spare capacity")]
    NoHealthyInstance(String),
}

impl DiscoveryError {
    pub fn service(&self) -> &str {
        match self {
            DiscoveryError::UnknownService(s) | DiscoveryError::NoHealthyInstance(s) => s,
        }
    }
}

/// Resolves a logical service name to a concrete instance.
pub trait ServiceResolver: Send + Sync + std::fmt::Debug {
    /// Pick an instance of `service` and reserve a connection slot on it.
    fn resolve(&self, service: &str) -> Result<InstanceGuard, DiscoveryError>;

    /// Every known instance, for health probing.
    fn instances(&self) -> Vec<Arc<ServiceInstance>>;
}
