use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;

/// One day's forecast as served by `/weatherforecast`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "WireForecast")]
pub struct WeatherForecast {
    pub date: NaiveDate,
    pub temperature_c: i32,
    pub summary: Option<String>,
}

impl WeatherForecast {
    pub fn new(date: NaiveDate, temperature_c: i32, summary: Option<String>) -> Self {
        Self {
            date,
            temperature_c,
            summary,
        }
    }

    /// `32 + C / 0.5556`, truncated toward zero. Not the textbook `C * 9/5 + 32`:
    /// 25°C comes out as 76°F here and consumers rely on that.
    /// Negative quotients truncate too (-5°C is 24°F, not 23°F); do not switch to `floor`.
    pub fn temperature_f(&self) -> i32 {
        32 + (f64::from(self.temperature_c) / 0.5556) as i32
    }
}

/// JSON shape on the wire. Property names are camelCase when written and
/// matched case-insensitively when read.
#[derive(Debug, Serialize, Deserialize)]
struct WireForecast {
    date: NaiveDate,
    #[serde(rename = "temperatureC", alias = "temperaturec")]
    temperature_c: i32,
    #[serde(rename = "temperatureF", skip_deserializing)]
    temperature_f: i32,
    #[serde(default)]
    summary: Option<String>,
}

impl From<WeatherForecast> for WireForecast {
    fn from(f: WeatherForecast) -> Self {
        Self {
            temperature_f: f.temperature_f(),
            date: f.date,
            temperature_c: f.temperature_c,
            summary: f.summary,
        }
    }
}

impl<'de> Deserialize<'de> for WeatherForecast {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let wire: WireForecast = serde_json::from_value(fold_keys(value)).map_err(de::Error::custom)?;

        Ok(WeatherForecast {
            date: wire.date,
            temperature_c: wire.temperature_c,
            summary: wire.summary,
        })
    }
}

/// Lower-cases the property names of a JSON object so the derived
/// deserializer sees one canonical spelling. When two names differ only
/// in case the later one wins.
fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        ),
        other => other,
    }
}
