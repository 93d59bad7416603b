//! Service instance abstraction.
//!
//! # Responsibilities
//! - Represent a single network endpoint of a logical service
//! - Track active requests (for Least Connections LB)
//! - Enforce max connection limits
//! - Track health state (Unknown/Healthy/Unhealthy)
//! - Readmit an ejected instance for trial traffic after a retry interval

use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default wait before an unhealthy instance receives trial traffic again.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Health state of an instance.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Unknown = 0,
    Healthy = 1,
    Unhealthy = 2,
}

impl From<u8> for HealthState {
    fn from(val: u8) -> Self {
        match val {
            1 => HealthState::Healthy,
            2 => HealthState::Unhealthy,
            _ => HealthState::Unknown,
        }
    }
}

/// A single instance of a logical service.
#[derive(Debug)]
pub struct ServiceInstance {
    /// Instance identifier from configuration.
    pub id: String,
    /// Logical service name this instance serves.
    pub service: String,
    /// The address of the instance.
    pub addr: SocketAddr,
    /// Maximum concurrent requests allowed.
    pub max_connections: usize,
    /// Number of requests currently in flight.
    active_connections: AtomicUsize,
    state: AtomicU8,
    consecutive_failures: AtomicUsize,
    consecutive_successes: AtomicUsize,
    /// Reference point for `ejected_at_ms`.
    created: Instant,
    /// Milliseconds after `created` of the last failure seen while unhealthy.
    ejected_at_ms: AtomicU64,
    retry_interval: Duration,
}

impl ServiceInstance {
    pub fn new(
        id: impl Into<String>,
        service: impl Into<String>,
        addr: SocketAddr,
        max_connections: usize,
    ) -> Self {
        Self {
            id: id.into(),
            service: service.into(),
            addr,
            max_connections,
            active_connections: AtomicUsize::new(0),
            state: AtomicU8::new(HealthState::Unknown as u8),
            consecutive_failures: AtomicUsize::new(0),
            consecutive_successes: AtomicUsize::new(0),
            created: Instant::now(),
            ejected_at_ms: AtomicU64::new(0),
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }

    /// Set how long an unhealthy instance is skipped before it gets a trial request.
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    /// Get the current number of active requests.
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Returns true if another request would exceed the connection cap.
    pub fn at_capacity(&self) -> bool {
        self.active_connections() >= self.max_connections
    }

    /// Try to reserve a connection slot. Returns `None` at capacity.
    pub fn try_acquire(self: &Arc<Self>) -> Option<InstanceGuard> {
        let mut prev = self.active_connections.load(Ordering::Relaxed);
        loop {
            if prev >= self.max_connections {
                return None;
            }
            match self.active_connections.compare_exchange_weak(
                prev,
                prev + 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(x) => prev = x,
            }
        }
        Some(InstanceGuard {
            instance: self.clone(),
        })
    }

    // --- Health Logic ---

    pub fn health(&self) -> HealthState {
        HealthState::from(self.state.load(Ordering::Relaxed))
    }

    /// Return true if the instance may receive traffic (Healthy or Unknown).
    pub fn is_healthy(&self) -> bool {
        self.health() != HealthState::Unhealthy
    }

    /// Return true if the balancer may pick this instance.
    ///
    /// Unhealthy instances are readmitted once `retry_interval` has passed
    /// since their last failure, so passive checks alone can bring them back.
    pub fn accepts_traffic(&self) -> bool {
        if self.is_healthy() {
            return true;
        }
        let ejected_at = Duration::from_millis(self.ejected_at_ms.load(Ordering::Relaxed));
        self.created.elapsed().saturating_sub(ejected_at) >= self.retry_interval
    }

    /// Report a successful request/check.
    pub fn mark_success(&self, healthy_threshold: usize) {
        self.consecutive_failures.store(0, Ordering::Relaxed);

        if self.health() == HealthState::Healthy {
            return;
        }

        let successes = self.consecutive_successes.fetch_add(1, Ordering::Relaxed) + 1;
        if successes >= healthy_threshold {
            self.transition(HealthState::Healthy);
        }
    }

    /// Report a failed request/check.
    pub fn mark_failure(&self, unhealthy_threshold: usize) {
        self.consecutive_successes.store(0, Ordering::Relaxed);

        if self.health() == HealthState::Unhealthy {
            // A failed trial request restarts the wait.
            self.stamp_ejection();
            return;
        }

        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= unhealthy_threshold {
            self.transition(HealthState::Unhealthy);
        }
    }

    fn transition(&self, next: HealthState) {
        if next == HealthState::Unhealthy {
            self.stamp_ejection();
        }
        let prev = HealthState::from(self.state.swap(next as u8, Ordering::Relaxed));
        if prev != next {
            self.consecutive_failures.store(0, Ordering::Relaxed);
            self.consecutive_successes.store(0, Ordering::Relaxed);
            tracing::info!(
                service = %self.service,
                instance = %self.id,
                addr = %self.addr,
                from = ?prev,
                to = ?next,
                "Instance health changed"
            );
        }
    }

    fn stamp_ejection(&self) {
        let now = u64::try_from(self.created.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.ejected_at_ms.store(now, Ordering::Relaxed);
    }
}

/// A RAII guard holding one connection slot on an instance.
#[derive(Debug)]
pub struct InstanceGuard {
    instance: Arc<ServiceInstance>,
}

impl InstanceGuard {
    pub fn instance(&self) -> &Arc<ServiceInstance> {
        &self.instance
    }
}

impl Deref for InstanceGuard {
    type Target = ServiceInstance;
    fn deref(&self) -> &Self::Target {
        &self.instance
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        self.instance.active_connections.fetch_sub(1, Ordering::Relaxed);
    }
}
