use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{error::ClientError, model::WeatherForecast, transport::Transport};

/// Relative path of the forecast endpoint.
pub const FORECAST_PATH: &str = "/weatherforecast";

/// Item limit used when the caller does not pass one.
pub const DEFAULT_MAX_ITEMS: usize = 10;

/// Typed client for the `/weatherforecast` endpoint.
///
/// Holds nothing but the transport, so a single instance can serve
/// concurrent callers. Every call performs a fresh request.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    transport: Arc<dyn Transport>,
}

impl WeatherApiClient {
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch forecasts and keep at most `max_items` of them (10 when `None`),
    /// in the order the server sent them.
    pub async fn get_weather(
        &self,
        max_items: Option<usize>,
    ) -> Result<Vec<WeatherForecast>, ClientError> {
        let max_items = max_items.unwrap_or(DEFAULT_MAX_ITEMS);
        let body = self.transport.get(FORECAST_PATH).await?;
        parse_forecasts(&body, max_items)
    }

    /// Like [`get_weather`](Self::get_weather), but gives up with
    /// [`ClientError::Cancelled`] as soon as `cancel` fires.
    pub async fn get_weather_cancellable(
        &self,
        max_items: Option<usize>,
        cancel: &CancellationToken,
    ) -> Result<Vec<WeatherForecast>, ClientError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            result = self.get_weather(max_items) => result,
        }
    }
}

fn parse_forecasts(body: &[u8], max_items: usize) -> Result<Vec<WeatherForecast>, ClientError> {
    let records: Vec<Option<WeatherForecast>> = serde_json::from_slice(body)?;

    Ok(records.into_iter().flatten().take(max_items).collect())
}
