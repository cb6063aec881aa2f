use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::transport::TransportConfig;

/// Configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// base_url = "http://localhost:5000"
/// max_items = 5
/// timeout_secs = 30
/// max_retries = 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base address of the forecast service.
    pub base_url: Option<String>,

    /// Default item limit for `weather forecast`; the client default applies when unset.
    pub max_items: Option<usize>,

    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            max_items: None,
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 200,
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Validate and store the base URL.
    pub fn set_base_url(&mut self, url: &str) -> Result<()> {
        let parsed = parse_base_url(url)?;
        self.base_url = Some(parsed.to_string());
        Ok(())
    }

    /// Build transport settings, preferring `base_url_override` over the stored URL.
    pub fn transport_config(&self, base_url_override: Option<&str>) -> Result<TransportConfig> {
        let raw = base_url_override
            .or(self.base_url.as_deref())
            .ok_or_else(|| {
                anyhow!(
                    "No forecast service URL configured.\n\
                     Hint: run `weather configure` or pass `--base-url <URL>`."
                )
            })?;

        Ok(TransportConfig {
            base_url: parse_base_url(raw)?,
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            retry_base_delay: Duration::from_millis(self.retry_base_delay_ms),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid service URL '{raw}'"))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow!(
            "Unsupported URL scheme '{other}' in '{raw}'. Use http or https."
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_config_errors_when_url_missing() {
        let cfg = Config::default();
        let err = cfg.transport_config(None).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No forecast service URL configured"));
        assert!(msg.contains("Hint: run `weather configure`"));
    }

    #[test]
    fn override_wins_over_stored_url() {
        let mut cfg = Config::default();
        cfg.set_base_url("http://stored:5000").expect("valid url");

        let transport = cfg
            .transport_config(Some("https://override.example"))
            .expect("transport config");

        assert_eq!(transport.base_url.as_str(), "https://override.example/");
    }

    #[test]
    fn transport_config_carries_timeouts_and_retries() {
        let cfg = Config {
            base_url: Some("http://localhost:5000".into()),
            timeout_secs: 5,
            max_retries: 0,
            retry_base_delay_ms: 50,
            ..Config::default()
        };

        let transport = cfg.transport_config(None).expect("transport config");

        assert_eq!(transport.timeout, Duration::from_secs(5));
        assert_eq!(transport.max_retries, 0);
        assert_eq!(transport.retry_base_delay, Duration::from_millis(50));
    }

    #[test]
    fn set_base_url_rejects_bad_input() {
        let mut cfg = Config::default();

        assert!(cfg.set_base_url("not a url").is_err());
        assert!(cfg.set_base_url("ftp://example.com").is_err());
        assert_eq!(cfg.base_url, None);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("absent.toml")).expect("load");

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_base_url("http://localhost:5000").expect("valid url");
        cfg.max_items = Some(5);
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = \"http://api:8080\"\n").expect("write");

        let cfg = Config::load_from(&path).expect("load");

        assert_eq!(cfg.base_url.as_deref(), Some("http://api:8080"));
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_retries, 3);
    }
}
