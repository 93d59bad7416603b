//! API gateway library.
//!
//! Path-based request routing in front of the platform's backend services:
//! an immutable, ordered route table decides per request whether to forward
//! to a logical upstream service or answer directly, and a thin axum/hyper
//! shell resolves upstreams through service discovery and proxies the call.

pub mod config;
pub mod discovery;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::{Gateway, Shutdown};
pub use routing::{Outcome, RouteTable};
