//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe service instances
//! - Update instance health state based on results

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::sync::broadcast;
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::discovery::ServiceResolver;
use crate::load_balancer::ServiceInstance;
use crate::observability::metrics;

pub struct HealthMonitor {
    resolver: Arc<dyn ServiceResolver>,
    config: HealthCheckConfig,
    client: Client<HttpConnector, Body>,
}

impl HealthMonitor {
    pub fn new(resolver: Arc<dyn ServiceResolver>, config: HealthCheckConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            resolver,
            config,
            client,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            path = %self.config.path,
            "Health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every instance once.
    pub async fn check_all(&self) {
        for instance in self.resolver.instances() {
            let healthy = self.probe(&instance).await;

            if healthy {
                instance.mark_success(self.config.healthy_threshold as usize);
            } else {
                instance.mark_failure(self.config.unhealthy_threshold as usize);
            }

            metrics::record_instance_health(&instance.service, &instance.id, instance.is_healthy());
        }
    }

    async fn probe(&self, instance: &ServiceInstance) -> bool {
        let uri = format!("http://{}{}", instance.addr, self.config.path);

        let request = match Request::builder()
            .method("GET")
            .uri(uri)
            .header("user-agent", "api-gateway-health-check")
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(instance = %instance.id, error = %e, "Failed to build health check request");
                return false;
            }
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let success = response.status().is_success();
                if !success {
                    tracing::warn!(instance = %instance.id, addr = %instance.addr, status = %response.status(), "Health check failed: non-success status");
                }
                success
            }
            Ok(Err(e)) => {
                tracing::warn!(instance = %instance.id, addr = %instance.addr, error = %e, "Health check failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(instance = %instance.id, addr = %instance.addr, "Health check failed: timeout");
                false
            }
        }
    }
}
