//! Static service registry.
//!
//! # Responsibilities
//! - Group configured instances by logical service name
//! - Apply the configured load balancing algorithm per service
//! - Hand out connection guards for in-flight tracking

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{LoadBalancingStrategy, ServiceInstanceConfig};
use crate::discovery::{DiscoveryError, ServiceResolver};
use crate::load_balancer::{self, InstanceGuard, LoadBalancer, ServiceInstance};

#[derive(Debug)]
struct ServicePool {
    instances: Vec<Arc<ServiceInstance>>,
    balancer: Box<dyn LoadBalancer>,
}

/// Registry backed by the `[[services]]` configuration section.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    services: HashMap<String, ServicePool>,
}

impl StaticRegistry {
    /// Build the registry. Instances with unparseable addresses are skipped
    /// (validation rejects them before this point).
    ///
    /// `retry_interval` is how long an instance marked unhealthy is skipped
    /// before it is offered a trial request.
    pub fn new(
        configs: &[ServiceInstanceConfig],
        strategy: LoadBalancingStrategy,
        retry_interval: Duration,
    ) -> Self {
        let mut grouped: HashMap<String, Vec<Arc<ServiceInstance>>> = HashMap::new();

        for config in configs {
            match config.address.parse() {
                Ok(addr) => {
                    let instance = ServiceInstance::new(
                        config.id.clone(),
                        config.service.clone(),
                        addr,
                        config.max_connections,
                    )
                    .with_retry_interval(retry_interval);
                    grouped
                        .entry(config.service.clone())
                        .or_default()
                        .push(Arc::new(instance));
                }
                Err(_) => {
                    tracing::warn!(instance = %config.id, address = %config.address, "Invalid instance address");
                }
            }
        }

        let services = grouped
            .into_iter()
            .map(|(name, instances)| {
                tracing::debug!(service = %name, instances = instances.len(), ?strategy, "Service registered");
                let pool = ServicePool {
                    instances,
                    balancer: load_balancer::for_strategy(strategy),
                };
                (name, pool)
            })
            .collect();

        Self { services }
    }

    /// Registered logical service names, sorted.
    pub fn service_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ServiceResolver for StaticRegistry {
    fn resolve(&self, service: &str) -> Result<InstanceGuard, DiscoveryError> {
        let pool = self
            .services
            .get(service)
            .ok_or_else(|| DiscoveryError::UnknownService(service.to_string()))?;

        // The slot may be taken between selection and acquisition; try the next pick.
        for _ in 0..pool.instances.len() {
            let Some(instance) = pool.balancer.next_instance(&pool.instances) else {
                break;
            };
            if let Some(guard) = instance.try_acquire() {
                return Ok(guard);
            }
        }

        tracing::debug!(
            service = %service,
            instances = pool.instances.len(),
            "No eligible instance"
        );
        Err(DiscoveryError::NoHealthyInstance(service.to_string()))
    }

    fn instances(&self) -> Vec<Arc<ServiceInstance>> {
        self.services
            .values()
            .flat_map(|pool| pool.instances.iter())
            .cloned()
            .collect()
    }
}
