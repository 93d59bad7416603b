//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → routing::RouteTable (forward or terminate)
//!     → discovery (pick instance) → request.rs (build upstream request)
//!     → hyper client → headers.rs (strip hop-by-hop) → client
//!     → or response.rs (terminal / unavailable bodies)
//! ```

pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
