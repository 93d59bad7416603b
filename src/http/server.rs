//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler on every path
//! - Wire up middleware (request ID, tracing, timeout, concurrency limit)
//! - Dispatch requests through the route table
//! - Resolve upstream instances and forward requests
//! - Passive health updates and metrics

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{HealthCheckConfig, TimeoutConfig};
use crate::discovery::ServiceResolver;
use crate::health::HealthMonitor;
use crate::http::headers::strip_hop_by_hop;
use crate::http::request::{request_id, upstream_request, UuidRequestId, X_REQUEST_ID};
use crate::http::response;
use crate::lifecycle::{Gateway, Shutdown};
use crate::observability::metrics;
use crate::routing::{Outcome, RouteTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub resolver: Arc<dyn ServiceResolver>,
    pub client: Client<HttpConnector, Body>,
    pub health_config: HealthCheckConfig,
    pub timeouts: TimeoutConfig,
}

/// HTTP front end of the gateway.
pub struct HttpServer {
    router: Router,
    gateway: Gateway,
}

impl HttpServer {
    pub fn new(gateway: Gateway) -> Self {
        let config = &gateway.config;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            routes: gateway.routes.clone(),
            resolver: gateway.resolver.clone(),
            client,
            health_config: config.health_check.clone(),
            timeouts: config.timeouts.clone(),
        };

        let router = Self::build_router(&gateway, state);
        Self { router, gateway }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(gateway: &Gateway, state: AppState) -> Router {
        let timeouts = &gateway.config.timeouts;
        // Backstop only: upstream calls time out on their own with a 504 first.
        let deadline = Duration::from_secs(timeouts.request_secs + timeouts.connect_secs);

        // A single fallback service so every layer (and the concurrency limit) is shared.
        Router::new()
            .fallback(gateway_handler)
            .with_state(state)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TimeoutLayer::new(deadline))
            .layer(ConcurrencyLimitLayer::new(gateway.config.listener.max_connections))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = %request_id(req.headers()),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, routes = self.gateway.routes.len(), "HTTP server starting");

        if self.gateway.config.health_check.enabled {
            let monitor = HealthMonitor::new(
                self.gateway.resolver.clone(),
                self.gateway.config.health_check.clone(),
            );
            tokio::spawn(monitor.run(shutdown.subscribe()));
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.signalled())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main gateway handler: route, then forward or answer directly.
async fn gateway_handler(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let outcome = match state.routes.match_route(&path, &method) {
        Ok(outcome) => outcome,
        Err(e) => {
            metrics::record_request(method.as_str(), 500, "none", "none", start);
            return response::internal_error(&e.to_string());
        }
    };

    match outcome {
        Outcome::Terminate {
            route_id,
            status,
            body,
        } => {
            tracing::debug!(route = %route_id, status, "Terminal route");
            metrics::record_route_match(&route_id, "terminate");
            metrics::record_request(method.as_str(), status, &route_id, "none", start);
            response::terminal(status, body)
        }
        Outcome::Forward {
            route_id,
            upstream,
            path: upstream_path,
        } => {
            tracing::debug!(route = %route_id, upstream = %upstream, path = %upstream_path, "Forwarding request");
            metrics::record_route_match(&route_id, "forward");
            let res = forward(&state, request, client, &upstream, &upstream_path).await;
            metrics::record_request(method.as_str(), res.status().as_u16(), &route_id, &upstream, start);
            res
        }
    }
}

/// Resolve an instance of `upstream` and proxy the request to it.
async fn forward(
    state: &AppState,
    request: Request<Body>,
    client: SocketAddr,
    upstream: &str,
    path: &str,
) -> Response {
    let instance = match state.resolver.resolve(upstream) {
        Ok(guard) => guard,
        Err(e) => {
            tracing::warn!(upstream = %upstream, error = %e, "Upstream unavailable");
            return response::service_unavailable(e.service(), StatusCode::SERVICE_UNAVAILABLE);
        }
    };

    let upstream_req = match upstream_request(request, instance.addr, path, client) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(upstream = %upstream, path = %path, error = %e, "Failed to build upstream request");
            return response::internal_error("Failed to build upstream request");
        }
    };

    let unhealthy_threshold = state.health_config.unhealthy_threshold as usize;
    let healthy_threshold = state.health_config.healthy_threshold as usize;
    let timeout = Duration::from_secs(state.timeouts.request_secs);

    match tokio::time::timeout(timeout, state.client.request(upstream_req)).await {
        Ok(Ok(res)) => {
            let status = res.status();
            match status {
                StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT => instance.mark_failure(unhealthy_threshold),
                _ => instance.mark_success(healthy_threshold),
            }

            let (mut parts, body) = res.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Ok(Err(e)) => {
            tracing::error!(upstream = %upstream, instance = %instance.id, error = %e, "Upstream request failed");
            instance.mark_failure(unhealthy_threshold);
            response::service_unavailable(upstream, StatusCode::SERVICE_UNAVAILABLE)
        }
        Err(_) => {
            tracing::error!(upstream = %upstream, instance = %instance.id, ?timeout, "Upstream request timed out");
            instance.mark_failure(unhealthy_threshold);
            response::service_unavailable(upstream, StatusCode::GATEWAY_TIMEOUT)
        }
    }
}
