use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, fs, path::Path, path::PathBuf, time::Duration};

use crate::cycler::DisplayMode;

/// Value shipped in sample configs; treated the same as an empty key.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_OPENWEATHERMAP_API_KEY";

pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 1800;

/// Unit system passed straight through to the One Call API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Imperial, Units::Metric, Units::Standard]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "imperial" => Ok(Units::Imperial),
            "metric" => Ok(Units::Metric),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow!(
                "Unknown unit system '{value}'. Supported: imperial, metric, standard."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            city: "Dallas".to_string(),
            state: "Texas".to_string(),
            country: "US".to_string(),
        }
    }
}

impl LocationConfig {
    /// Geocoding query string, e.g. `Dallas,Texas,US`.
    pub fn query(&self) -> String {
        [&self.city, &self.state, &self.country]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for LocationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.state)
    }
}

/// Which screens rotate, for how long, and the matrix geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_current_weather: bool,
    pub show_hourly_forecast: bool,
    pub show_daily_forecast: bool,
    /// Seconds each mode stays on screen before the rotation advances.
    pub display_duration: u64,
    pub width: u32,
    pub height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_current_weather: true,
            show_hourly_forecast: true,
            show_daily_forecast: true,
            display_duration: 30,
            width: 128,
            height: 32,
        }
    }
}

/// Error backoff tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub base_secs: u64,
    pub cap_secs: u64,
    /// Failures tolerated before fetching is paused for the backoff window.
    pub max_consecutive_errors: u32,
    /// Minimum gap between two logged update errors.
    pub log_throttle_secs: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_secs: 60,
            cap_secs: 3600,
            max_consecutive_errors: 5,
            log_throttle_secs: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Overrides the platform cache location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// update_interval = 900
///
/// [location]
/// city = "Oslo"
/// state = ""
/// country = "NO"
///
/// [display]
/// show_hourly_forecast = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub units: Units,
    /// Seconds between successful API refreshes.
    #[serde(deserialize_with = "lenient_interval")]
    pub update_interval: u64,
    pub location: LocationConfig,
    pub display: DisplayConfig,
    pub backoff: BackoffConfig,
    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: PLACEHOLDER_API_KEY.to_string(),
            units: Units::default(),
            update_interval: DEFAULT_UPDATE_INTERVAL_SECS,
            location: LocationConfig::default(),
            display: DisplayConfig::default(),
            backoff: BackoffConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the platform path, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        Ok(cfg)
    }

    /// Save config to the platform path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config to disk, creating parent directories as needed.
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

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-matrix", "weather-matrix")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Where the last fetched report is kept between runs.
    pub fn cache_file_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.cache.path {
            return Ok(path.clone());
        }
        Ok(Self::project_dirs()?.cache_dir().join("weather.json"))
    }

    pub fn api_key_configured(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != PLACEHOLDER_API_KEY
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = api_key.trim().to_string();
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval)
    }

    pub fn display_duration(&self) -> Duration {
        Duration::from_secs(self.display.display_duration)
    }

    /// Enabled modes in their fixed rotation order.
    pub fn enabled_modes(&self) -> Vec<DisplayMode> {
        let mut modes = Vec::with_capacity(3);
        if self.display.show_current_weather {
            modes.push(DisplayMode::Current);
        }
        if self.display.show_hourly_forecast {
            modes.push(DisplayMode::Hourly);
        }
        if self.display.show_daily_forecast {
            modes.push(DisplayMode::Daily);
        }
        modes
    }
}

/// Accept `1800`, `1800.0` or `"1800"`; anything else falls back to the default.
fn lenient_interval<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    let parsed = match Raw::deserialize(deserializer)? {
        Raw::Int(n) => u64::try_from(n).ok(),
        Raw::Float(f) if f.is_finite() && f >= 0.0 => Some(f as u64),
        Raw::Text(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    Ok(parsed.unwrap_or_else(|| {
        log::warn!(
            "Invalid update_interval, using default of {DEFAULT_UPDATE_INTERVAL_SECS}s"
        );
        DEFAULT_UPDATE_INTERVAL_SECS
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();

        assert_eq!(cfg.location.query(), "Dallas,Texas,US");
        assert_eq!(cfg.units, Units::Imperial);
        assert_eq!(cfg.update_interval(), Duration::from_secs(1800));
        assert_eq!(cfg.display_duration(), Duration::from_secs(30));
        assert_eq!(cfg.backoff.base_secs, 60);
        assert_eq!(cfg.backoff.cap_secs, 3600);
        assert!(!cfg.api_key_configured());
    }

    #[test]
    fn placeholder_and_blank_keys_are_not_configured() {
        let mut cfg = Config::default();
        assert!(!cfg.api_key_configured());

        cfg.set_api_key("   ".into());
        assert!(!cfg.api_key_configured());

        cfg.set_api_key(" abc123 ".into());
        assert!(cfg.api_key_configured());
        assert_eq!(cfg.api_key, "abc123");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_toml(
            r#"
            api_key = "KEY"
            units = "metric"

            [location]
            city = "Oslo"
            state = ""
            country = "NO"

            [display]
            show_hourly_forecast = false
            "#,
        )
        .expect("config must parse");

        assert_eq!(cfg.units, Units::Metric);
        assert_eq!(cfg.location.query(), "Oslo,NO");
        assert_eq!(cfg.enabled_modes(), vec![DisplayMode::Current, DisplayMode::Daily]);
        assert_eq!(cfg.display.width, 128);
        assert_eq!(cfg.update_interval, DEFAULT_UPDATE_INTERVAL_SECS);
    }

    #[test]
    fn update_interval_accepts_strings_and_falls_back() {
        let cfg = Config::from_toml(r#"update_interval = "600""#).unwrap();
        assert_eq!(cfg.update_interval, 600);

        let cfg = Config::from_toml(r#"update_interval = "soon""#).unwrap();
        assert_eq!(cfg.update_interval, DEFAULT_UPDATE_INTERVAL_SECS);

        let cfg = Config::from_toml("update_interval = -5").unwrap();
        assert_eq!(cfg.update_interval, DEFAULT_UPDATE_INTERVAL_SECS);

        let cfg = Config::from_toml("update_interval = true").unwrap();
        assert_eq!(cfg.update_interval, DEFAULT_UPDATE_INTERVAL_SECS);
    }

    #[test]
    fn unknown_units_error() {
        let err = Units::try_from("kelvin").unwrap_err();
        assert!(err.to_string().contains("Unknown unit system"));
        assert_eq!(Units::try_from("METRIC").unwrap(), Units::Metric);
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = std::env::temp_dir().join(format!("weather-matrix-cfg-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("SECRET".into());
        cfg.display.show_daily_forecast = false;
        cfg.save_to(&path).expect("save must succeed");

        let loaded = Config::load_from(&path).expect("load must succeed");
        assert_eq!(loaded, cfg);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("weather-matrix-does-not-exist.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
    }
}
