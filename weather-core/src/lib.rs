//! Core library for the weather forecast service and its consumers.
//!
//! This crate defines:
//! - The `WeatherForecast` record shared by producer and consumer
//! - `WeatherApiClient`, a typed client for `/weatherforecast`
//! - The `Transport` capability the client is built on, with a reqwest implementation
//! - Configuration & tracing setup shared by the binaries

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod telemetry;
pub mod transport;

pub use client::{DEFAULT_MAX_ITEMS, FORECAST_PATH, WeatherApiClient};
pub use config::Config;
pub use error::ClientError;
pub use model::WeatherForecast;
pub use transport::{ReqwestTransport, Transport, TransportConfig};
