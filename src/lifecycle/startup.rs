//! Startup orchestration.
//!
//! # Responsibilities
//! - Compile the route table from validated configuration
//! - Build the service registry
//! - Bundle everything the HTTP layer needs
//!
//! # Design Decisions
//! - Fail fast: an invalid route table never serves traffic
//! - Subsystems initialize in order, not concurrently

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigurationError, GatewayConfig};
use crate::discovery::{ServiceResolver, StaticRegistry};
use crate::routing::RouteTable;

/// Fully initialized gateway core.
#[derive(Debug, Clone)]
pub struct Gateway {
    pub config: GatewayConfig,
    pub routes: Arc<RouteTable>,
    pub resolver: Arc<dyn ServiceResolver>,
}

impl Gateway {
    /// Build the gateway core from configuration.
    pub fn build(config: GatewayConfig) -> Result<Self, ConfigurationError> {
        let routes = RouteTable::from_config(&config.routes)?;
        tracing::info!(routes = routes.len(), "Route table compiled");

        let registry = StaticRegistry::new(
            &config.services,
            config.load_balancing.strategy,
            Duration::from_secs(config.health_check.interval_secs),
        );
        let known = registry.service_names();
        for rule in routes.rules() {
            if let crate::routing::RouteAction::Forward { upstream } = rule.action() {
                if !known.contains(&upstream.as_str()) {
                    tracing::warn!(
                        route = %rule.id(),
                        upstream = %upstream,
                        "Route forwards to a service with no registered instances"
                    );
                }
            }
        }

        Ok(Self::with_resolver(config, routes, Arc::new(registry)))
    }

    /// Assemble a gateway around an externally provided resolver.
    pub fn with_resolver(
        config: GatewayConfig,
        routes: RouteTable,
        resolver: Arc<dyn ServiceResolver>,
    ) -> Self {
        Self {
            config,
            routes: Arc::new(routes),
            resolver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_with_defaults() {
        let gateway = Gateway::build(GatewayConfig::default()).unwrap();
        assert_eq!(gateway.routes.len(), 8);
        assert!(gateway.resolver.instances().is_empty());
    }

    #[test]
    fn test_build_rejects_invalid_routes() {
        let mut config = GatewayConfig::default();
        config.routes.remove(7);
        assert!(matches!(
            Gateway::build(config),
            Err(ConfigurationError::Invalid(_))
        ));
    }
}
