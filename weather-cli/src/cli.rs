use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Text};
use tokio_util::sync::CancellationToken;
use weather_core::{Config, DEFAULT_MAX_ITEMS, ReqwestTransport, WeatherApiClient, WeatherForecast};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather forecast CLI")]
pub struct Cli {
    /// Log level filter (e.g. "weather_core=debug"); falls back to RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the forecast service URL and defaults.
    Configure,

    /// Fetch and print forecasts.
    Forecast {
        /// Service base URL; overrides the configured one.
        #[arg(long)]
        base_url: Option<String>,

        /// Maximum number of forecasts to show.
        #[arg(short = 'n', long)]
        max_items: Option<usize>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Forecast {
                base_url,
                max_items,
                json,
            } => forecast(base_url.as_deref(), max_items, json).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut cfg = Config::load()?;

    let current = cfg.base_url.clone().unwrap_or_else(|| "http://localhost:5000".to_string());
    let url = Text::new("Forecast service URL:")
        .with_default(&current)
        .prompt()
        .context("Failed to read service URL")?;
    cfg.set_base_url(url.trim())?;

    let max_items = CustomType::<usize>::new("Default number of forecasts:")
        .with_default(cfg.max_items.unwrap_or(DEFAULT_MAX_ITEMS))
        .with_error_message("Please enter a non-negative whole number")
        .prompt()
        .context("Failed to read item limit")?;
    cfg.max_items = Some(max_items);

    cfg.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn forecast(base_url: Option<&str>, max_items: Option<usize>, json: bool) -> Result<()> {
    let cfg = Config::load()?;
    let transport = ReqwestTransport::new(cfg.transport_config(base_url)?)?;
    tracing::debug!(base_url = %transport.base_url(), "using forecast service");

    let client = WeatherApiClient::new(transport);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let forecasts = client
        .get_weather_cancellable(max_items.or(cfg.max_items), &cancel)
        .await
        .context("Failed to fetch forecasts")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&forecasts)?);
    } else {
        print!("{}", render_table(&forecasts));
    }

    Ok(())
}

fn render_table(forecasts: &[WeatherForecast]) -> String {
    if forecasts.is_empty() {
        return "No forecasts available.\n".to_string();
    }

    let mut out = format!("{:<12}{:>8}{:>8}  {}\n", "Date", "Temp C", "Temp F", "Summary");
    for f in forecasts {
        out.push_str(&format!(
            "{:<12}{:>8}{:>8}  {}\n",
            f.date.to_string(),
            f.temperature_c,
            f.temperature_f(),
            f.summary.as_deref().unwrap_or("-"),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_forecast_flags() {
        let cli = Cli::parse_from(["weather", "forecast", "-n", "3", "--base-url", "http://x:1", "--json"]);

        match cli.command {
            Command::Forecast {
                base_url,
                max_items,
                json,
            } => {
                assert_eq!(base_url.as_deref(), Some("http://x:1"));
                assert_eq!(max_items, Some(3));
                assert!(json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn table_lists_each_forecast() {
        let date = "2026-10-20".parse().expect("date");
        let rows = vec![
            WeatherForecast::new(date, 25, Some("Sunny".into())),
            WeatherForecast::new(date, -3, None),
        ];

        let table = render_table(&rows);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2026-10-20"));
        assert!(lines[1].contains("25") && lines[1].contains("76") && lines[1].ends_with("Sunny"));
        assert!(lines[2].ends_with("-"));
    }

    #[test]
    fn empty_table_says_so() {
        assert_eq!(render_table(&[]), "No forecasts available.\n");
    }
}
