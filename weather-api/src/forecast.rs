use axum::{Json, extract::State};
use chrono::{Days, Local, NaiveDate};
use opentelemetry::metrics::{Counter, Meter};
use rand::RngExt;
use weather_core::WeatherForecast;

pub const SUMMARIES: [&str; 10] = [
    "Freezing",
    "Bracing",
    "Chilly",
    "Cool",
    "Mild",
    "Warm",
    "Balmy",
    "Hot",
    "Sweltering",
    "Scorching",
];

/// Number of days served, starting the day after `today`.
pub const FORECAST_DAYS: u64 = 5;

/// Random forecasts for the days following `today`.
pub fn generate(today: NaiveDate) -> Vec<WeatherForecast> {
    let mut rng = rand::rng();

    (1..=FORECAST_DAYS)
        .map(|offset| {
            let summary = SUMMARIES[rng.random_range(0..SUMMARIES.len())];
            WeatherForecast::new(
                today + Days::new(offset),
                rng.random_range(-20..55),
                Some(summary.to_string()),
            )
        })
        .collect()
}

/// Instruments for the forecast endpoint.
#[derive(Debug, Clone)]
pub struct ForecastMetrics {
    requests: Counter<u64>,
}

impl ForecastMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            requests: meter
                .u64_counter("weather.forecast.requests")
                .with_description("Requests served by /weatherforecast")
                .build(),
        }
    }
}

/// `GET /weatherforecast`
pub async fn weather_forecast(State(metrics): State<ForecastMetrics>) -> Json<Vec<WeatherForecast>> {
    metrics.requests.add(1, &[]);
    Json(generate(Local::now().date_naive()))
}
