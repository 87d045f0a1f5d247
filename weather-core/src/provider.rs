use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    config::{Config, LocationConfig, Units},
    error::WeatherError,
    model::WeatherReport,
    provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

/// Source of weather reports.
///
/// One call to [`WeatherProvider::fetch`] is one refresh cycle: it either
/// returns a complete report or an error, never partial data.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(
        &self,
        location: &LocationConfig,
        units: Units,
    ) -> Result<WeatherReport, WeatherError>;

    /// Outbound API calls made so far.
    fn api_calls(&self) -> u64 {
        0
    }
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> Result<OpenWeatherProvider, WeatherError> {
    if !config.api_key_configured() {
        return Err(WeatherError::MissingApiKey);
    }

    OpenWeatherProvider::new(config.api_key.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(matches!(err, WeatherError::MissingApiKey));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let provider = provider_from_config(&cfg).expect("provider must build");
        assert_eq!(provider.api_calls(), 0);
    }
}
