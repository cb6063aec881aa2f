//! Default service endpoints shared by every service in the application.
//!
//! `/health` reports readiness by running every registered check;
//! `/alive` reports liveness by running only checks tagged [`LIVE_TAG`].
//! Both are mapped only in the development environment.

use std::{fmt, sync::Arc};

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};

pub const HEALTH_PATH: &str = "/health";
pub const ALIVE_PATH: &str = "/alive";
pub const LIVE_TAG: &str = "live";

/// Hosting environment name; only `Development` exposes the health endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment(String);

impl Environment {
    pub const DEVELOPMENT: &'static str = "Development";

    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn is_development(&self) -> bool {
        self.0.eq_ignore_ascii_case(Self::DEVELOPMENT)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(Self::DEVELOPMENT)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a health check. Ordered worst first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Unhealthy,
    Degraded,
    Healthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Unhealthy => "Unhealthy",
            HealthStatus::Degraded => "Degraded",
            HealthStatus::Healthy => "Healthy",
        }
    }

    /// Degraded still serves traffic.
    pub fn status_code(&self) -> StatusCode {
        match self {
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
            HealthStatus::Degraded | HealthStatus::Healthy => StatusCode::OK,
        }
    }
}

type CheckFn = Arc<dyn Fn() -> HealthStatus + Send + Sync>;

struct Registration {
    name: String,
    tags: Vec<String>,
    check: CheckFn,
}

/// Named, tagged health checks.
#[derive(Default)]
pub struct HealthChecks {
    checks: Vec<Registration>,
}

impl HealthChecks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default set: a `self` check tagged `live` that always reports healthy.
    pub fn with_defaults() -> Self {
        Self::new().add_check("self", &[LIVE_TAG], || HealthStatus::Healthy)
    }

    pub fn add_check<F>(mut self, name: &str, tags: &[&str], check: F) -> Self
    where
        F: Fn() -> HealthStatus + Send + Sync + 'static,
    {
        self.checks.push(Registration {
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            check: Arc::new(check),
        });
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.checks.iter().map(|r| r.name.as_str())
    }

    /// Worst status among the checks carrying `tag` (all checks when `None`).
    /// No matching checks means healthy.
    pub fn evaluate(&self, tag: Option<&str>) -> HealthStatus {
        self.checks
            .iter()
            .filter(|r| tag.is_none_or(|t| r.tags.iter().any(|own| own == t)))
            .map(|r| {
                let status = (r.check)();
                if status != HealthStatus::Healthy {
                    tracing::warn!(check = %r.name, status = status.as_str(), "health check not healthy");
                }
                status
            })
            .min()
            .unwrap_or(HealthStatus::Healthy)
    }
}

impl fmt::Debug for HealthChecks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Add `/health` and `/alive` to `router` when running in development.
pub fn map_default_endpoints(router: Router, environment: &Environment, checks: HealthChecks) -> Router {
    if !environment.is_development() {
        return router;
    }

    let health = Router::new()
        .route(HEALTH_PATH, get(readiness))
        .route(ALIVE_PATH, get(liveness))
        .with_state(Arc::new(checks));

    router.merge(health)
}

async fn readiness(State(checks): State<Arc<HealthChecks>>) -> impl IntoResponse {
    report(checks.evaluate(None))
}

async fn liveness(State(checks): State<Arc<HealthChecks>>) -> impl IntoResponse {
    report(checks.evaluate(Some(LIVE_TAG)))
}

fn report(status: HealthStatus) -> impl IntoResponse {
    (
        status.status_code(),
        [(header::CACHE_CONTROL, "no-store, no-cache")],
        status.as_str(),
    )
}
