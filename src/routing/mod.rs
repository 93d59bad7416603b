//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouteConfig[] (configuration order)
//!     → pattern.rs (compile path patterns)
//!     → rewrite.rs (compile rewrite regexes)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (path, method)
//!     → router.rs (first matching rule in table order)
//!     → Return: Outcome::Forward { upstream, path } | Outcome::Terminate { status, body }
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in the matching path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins; the last route must be the `/**` catch-all

pub mod pattern;
pub mod rewrite;
pub mod router;

pub use pattern::{PathPattern, PatternError};
pub use rewrite::RewriteRule;
pub use router::{NoRouteMatched, Outcome, RouteAction, RouteRule, RouteTable};
