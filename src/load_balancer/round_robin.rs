//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::{eligible, LoadBalancer, ServiceInstance};

/// Round-robin selector.
/// Stores an internal counter to rotate through instances.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_instance(&self, instances: &[Arc<ServiceInstance>]) -> Option<Arc<ServiceInstance>> {
        if instances.is_empty() {
            return None;
        }

        // Visit each instance at most once so an all-unhealthy pool terminates.
        let start = self.counter.fetch_add(1, Ordering::Relaxed);
        let len = instances.len();

        (0..len)
            .map(|i| &instances[(start + i) % len])
            .find(|instance| eligible(instance))
            .cloned()
    }
}
