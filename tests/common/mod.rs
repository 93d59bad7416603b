//! Shared utilities for gateway integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use api_gateway::config::{GatewayConfig, ServiceInstanceConfig};
use api_gateway::http::HttpServer;
use api_gateway::lifecycle::{Gateway, Shutdown};

/// Start a mock upstream that echoes what it received as JSON.
///
/// The body reports the instance name, the path and query the gateway
/// forwarded, and the request headers.
pub async fn start_echo_upstream(name: &'static str) -> SocketAddr {
    start_upstream(move |req: Request| async move {
        let headers: BTreeMap<String, String> = req
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        Json(json!({
            "instance": name,
            "method": req.method().as_str(),
            "path": req.uri().path(),
            "query": req.uri().query(),
            "headers": headers,
        }))
        .into_response()
    })
    .await
}

/// Start a mock upstream that always answers with `status`.
pub async fn start_status_upstream(status: StatusCode) -> SocketAddr {
    start_upstream(move |_req: Request| async move { (status, "upstream says no").into_response() })
        .await
}

/// Start a mock upstream that answers 503 while `failing` is set and
/// 200 "recovered" otherwise. `hits` counts requests that reached it.
pub async fn start_switchable_upstream(failing: Arc<AtomicBool>, hits: Arc<AtomicUsize>) -> SocketAddr {
    start_upstream(move |_req: Request| {
        let failing = failing.clone();
        let hits = hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            if failing.load(Ordering::SeqCst) {
                (StatusCode::SERVICE_UNAVAILABLE, "down").into_response()
            } else {
                "recovered".into_response()
            }
        }
    })
    .await
}

/// Start a mock upstream that sleeps before answering.
pub async fn start_slow_upstream(delay: Duration) -> SocketAddr {
    start_upstream(move |_req: Request| async move {
        tokio::time::sleep(delay).await;
        "late".into_response()
    })
    .await
}

async fn start_upstream<F, Fut>(handler: F) -> SocketAddr
where
    F: Fn(Request) -> Fut + Clone + Send + Sync + 'static,
    Fut: std::future::Future<Output = Response> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(handler);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn instance(id: &str, service: &str, addr: SocketAddr) -> ServiceInstanceConfig {
    ServiceInstanceConfig {
        id: id.into(),
        service: service.into(),
        address: addr.to_string(),
        max_connections: 100,
    }
}

/// Config with the built-in routes and nothing running in the background.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.health_check.enabled = false;
    config.observability.metrics_enabled = false;
    config
}

/// A gateway running on an ephemeral loopback port.
pub struct RunningGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn start_gateway(config: GatewayConfig) -> RunningGateway {
    let gateway = Gateway::build(config).unwrap();
    let server = HttpServer::new(gateway);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let handle = tokio::spawn(server.run(listener, shutdown.clone()));

    RunningGateway {
        addr,
        shutdown,
        handle,
    }
}
