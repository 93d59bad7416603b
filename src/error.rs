//! Top-level error type for the gateway process.

use metrics_exporter_prometheus::BuildError;

use crate::config::ConfigurationError;

/// Anything that stops the gateway from starting or serving.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Config(#[from] ConfigurationError),

    #[error("invalid address {0:?}")]
    InvalidAddress(String),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("metrics exporter: {0}")]
    Metrics(#[from] BuildError),
}
