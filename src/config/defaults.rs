//! Built-in route table, used when the configuration file defines no routes.

use crate::config::schema::{RewriteConfig, RouteConfig};

/// Logical name of the integration service as registered in discovery.
pub const INTEGRATION_SERVICE: &str = "integration-service";

/// Id of the terminal catch-all route.
pub const FALLBACK_ROUTE_ID: &str = "fallback";

/// The platform route table, in evaluation order.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        forward("identity-service-auth", "auth", "identity-service"),
        forward("identity-service-users", "users", "identity-service"),
        forward("identity-service-orgs", "organizations", "identity-service"),
        forward("prompt-service", "prompts", "prompt-service"),
        forward("flow-service", "flows", "flow-service"),
        forward("agent-service", "agents", "agent-service"),
        forward("integration-service", "integrations", INTEGRATION_SERVICE),
        fallback(),
    ]
}

fn forward(id: &str, resource: &str, upstream: &str) -> RouteConfig {
    RouteConfig {
        id: id.to_string(),
        paths: vec![format!("/api/{resource}/**")],
        upstream: Some(format!("lb://{upstream}")),
        terminal_status: None,
        terminal_body: None,
        rewrite: Some(RewriteConfig {
            regex: format!("/api/{resource}/(?<segment>.*)"),
            replacement: format!("/api/{resource}/${{segment}}"),
        }),
    }
}

fn fallback() -> RouteConfig {
    RouteConfig {
        id: FALLBACK_ROUTE_ID.to_string(),
        paths: vec!["/**".to_string()],
        upstream: None,
        terminal_status: Some(404),
        terminal_body: None,
        rewrite: Some(RewriteConfig {
            regex: "/(?<remaining>.*)".to_string(),
            replacement: "/${remaining}".to_string(),
        }),
    }
}
