//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Route matched → logical upstream name
//!     → discovery registry (instances of that service)
//!     → Apply load balancing algorithm:
//!         - round_robin.rs (rotate through instances)
//!         - least_conn.rs (pick instance with fewest in-flight requests)
//!     → instance.rs (reserve a connection slot)
//!     → Return guarded instance or nothing
//! ```
//!
//! # Design Decisions
//! - Algorithms hold no instance state; instances track their own counters
//! - Saturated instances excluded from selection
//! - Unhealthy instances excluded until their retry interval elapses

pub mod instance;
pub mod least_conn;
pub mod round_robin;

use std::sync::Arc;

use crate::config::LoadBalancingStrategy;
pub use instance::{HealthState, InstanceGuard, ServiceInstance};

/// Selects one instance from a service's instance list.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Returns the next instance to use, or `None` if none is eligible.
    fn next_instance(&self, instances: &[Arc<ServiceInstance>]) -> Option<Arc<ServiceInstance>>;
}

/// Build the balancer for a configured strategy.
pub fn for_strategy(strategy: LoadBalancingStrategy) -> Box<dyn LoadBalancer> {
    match strategy {
        LoadBalancingStrategy::RoundRobin => Box::new(round_robin::RoundRobin::new()),
        LoadBalancingStrategy::LeastConnections => Box::new(least_conn::LeastConnections::new()),
    }
}

fn eligible(instance: &ServiceInstance) -> bool {
    instance.accepts_traffic() && !instance.at_capacity()
}
