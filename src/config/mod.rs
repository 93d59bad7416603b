//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, route table compilation)
//!     → GatewayConfig (validated, immutable)
//!     → consumed once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults to allow minimal configs
//! - A config without routes gets the built-in route table (defaults.rs)
//! - Validation separates syntactic (serde) from semantic checks

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigurationError};
pub use schema::{
    GatewayConfig, HealthCheckConfig, ListenerConfig, LoadBalancingStrategy, LogFormat,
    ObservabilityConfig, RewriteConfig, RouteConfig, ServiceInstanceConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
