//! Liveness and readiness endpoints.
//!
//! Readiness requires both a started server and a user store that answers a
//! ping, so traffic is withheld while the database is unreachable. Liveness
//! only reflects whether the process is draining.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, get, web};
use tracing::warn;

use crate::domain::ports::UserRepository;

/// Shared health state for the running service.
pub struct HealthState {
    started: AtomicBool,
    draining: AtomicBool,
    store: Arc<dyn UserRepository>,
}

impl HealthState {
    /// Not yet started, not draining, checking `store` on readiness.
    pub fn new(store: Arc<dyn UserRepository>) -> Self {
        Self {
            started: AtomicBool::new(false),
            draining: AtomicBool::new(false),
            store,
        }
    }

    /// Record that the listener is bound.
    pub fn mark_started(&self) {
        self.started.store(true, Ordering::Release);
    }

    /// Fail liveness from now on; used once the server stops.
    pub fn mark_unhealthy(&self) {
        self.draining.store(true, Ordering::Release);
    }

    /// Whether the process should keep receiving liveness traffic.
    pub fn is_alive(&self) -> bool {
        !self.draining.load(Ordering::Acquire)
    }

    /// Started, not draining, and the user store answers.
    pub async fn is_ready(&self) -> bool {
        if !self.started.load(Ordering::Acquire) || !self.is_alive() {
            return false;
        }
        match self.store.ping().await {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "user store unreachable; reporting not ready");
                false
            }
        }
    }
}

fn uncached(healthy: bool) -> HttpResponse {
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    HttpResponse::build(status)
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// Readiness check for load balancers.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is started and the user store is reachable"),
        (status = 503, description = "Server is starting, draining, or cannot reach the user store")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    uncached(state.is_ready().await)
}

/// Liveness check for the orchestrator.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Process is alive"),
        (status = 503, description = "Process is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    uncached(state.is_alive())
}
