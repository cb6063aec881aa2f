//! Backing service for the weather client.
//!
//! Serves `GET /weatherforecast` plus the default health endpoints, with
//! per-request tracing and a request counter on the global meter.

pub mod defaults;
pub mod forecast;

use axum::{Router, routing::get};
use forecast::ForecastMetrics;
use tower_http::trace::TraceLayer;
use weather_core::FORECAST_PATH;

pub use defaults::{Environment, HealthChecks, HealthStatus};

/// Build the application router for `environment`.
pub fn app(environment: &Environment) -> Router {
    let metrics = ForecastMetrics::new(&opentelemetry::global::meter("weather-api"));
    let router = Router::new()
        .route(FORECAST_PATH, get(forecast::weather_forecast))
        .with_state(metrics);

    defaults::map_default_endpoints(router, environment, HealthChecks::with_defaults())
        .layer(TraceLayer::new_for_http())
}
