//! Least Connections load balancing strategy.

use std::sync::Arc;

use crate::load_balancer::{eligible, LoadBalancer, ServiceInstance};

/// Least connections selector.
/// Selects the instance with the fewest in-flight requests.
#[derive(Debug, Default)]
pub struct LeastConnections;

impl LeastConnections {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for LeastConnections {
    fn next_instance(&self, instances: &[Arc<ServiceInstance>]) -> Option<Arc<ServiceInstance>> {
        // On a tie the first one is selected (stability)
        instances
            .iter()
            .filter(|instance| eligible(instance))
            .min_by_key(|instance| instance.active_connections())
            .cloned()
    }
}
