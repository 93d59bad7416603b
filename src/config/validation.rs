//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile the route table to surface malformed patterns and rewrites
//! - Validate service instances and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;
use crate::routing::{PatternError, RouteTable};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("route table is empty")]
    NoRoutes,

    #[error("route #{index} has an empty id")]
    EmptyRouteId { index: usize },

    #[error("route id {0:?} is used more than once")]
    DuplicateRouteId(String),

    #[error("route {0:?} has no path patterns")]
    NoPathPatterns(String),

    #[error("route {route:?}: {source}")]
    InvalidPathPattern {
        route: String,
        #[source]
        source: PatternError,
    },

    #[error("route {route:?}: invalid rewrite regex: {message}")]
    InvalidRewrite { route: String, message: String },

    #[error("route {0:?} sets both upstream and terminal_status")]
    ConflictingAction(String),

    #[error("route {0:?} sets neither upstream nor terminal_status")]
    MissingAction(String),

    #[error("route {route:?}: invalid upstream {upstream:?}")]
    InvalidUpstream { route: String, upstream: String },

    #[error("route {route:?}: invalid terminal status {status}")]
    InvalidStatus { route: String, status: u16 },

    #[error("route {0:?} sets terminal_body without terminal_status")]
    BodyWithoutStatus(String),

    #[error("last route must contain the catch-all pattern '/**'")]
    MissingCatchAll,

    #[error("service instance #{index} has an empty id")]
    EmptyInstanceId { index: usize },

    #[error("service instance id {0:?} is used more than once")]
    DuplicateInstanceId(String),

    #[error("service instance {0:?} has an empty service name")]
    EmptyServiceName(String),

    #[error("service instance {id:?}: invalid address {address:?}")]
    InvalidInstanceAddress { id: String, address: String },

    #[error("service instance {0:?}: max_connections must be greater than zero")]
    ZeroInstanceConnections(String),

    #[error("invalid listener address {0:?}")]
    InvalidListenerAddress(String),

    #[error("invalid metrics address {0:?}")]
    InvalidMetricsAddress(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

/// Validate a full configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = match RouteTable::compile(&config.routes) {
        Ok(_) => Vec::new(),
        Err(route_errors) => route_errors,
    };

    validate_services(config, &mut errors);

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidListenerAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroValue("listener.max_connections"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let positive = [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("health_check.interval_secs", config.health_check.interval_secs),
        ("health_check.timeout_secs", config.health_check.timeout_secs),
        ("health_check.healthy_threshold", u64::from(config.health_check.healthy_threshold)),
        ("health_check.unhealthy_threshold", u64::from(config.health_check.unhealthy_threshold)),
    ];
    for (name, value) in positive {
        if value == 0 {
            errors.push(ValidationError::ZeroValue(name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_services(config: &GatewayConfig, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for (index, instance) in config.services.iter().enumerate() {
        if instance.id.is_empty() {
            errors.push(ValidationError::EmptyInstanceId { index });
        } else if !seen.insert(instance.id.as_str()) {
            errors.push(ValidationError::DuplicateInstanceId(instance.id.clone()));
        }
        if instance.service.trim().is_empty() {
            errors.push(ValidationError::EmptyServiceName(instance.id.clone()));
        }
        if instance.address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidInstanceAddress {
                id: instance.id.clone(),
                address: instance.address.clone(),
            });
        }
        if instance.max_connections == 0 {
            errors.push(ValidationError::ZeroInstanceConnections(instance.id.clone()));
        }
    }
}
