use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use crate::{
    config::{LocationConfig, Units},
    error::{WeatherError, truncate_body},
    forecast::{OneCallResponse, build_report},
    model::{Coordinates, WeatherReport},
};

use super::WeatherProvider;

const GEOCODING_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";
const ONE_CALL_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    api_calls: AtomicU64,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            api_key,
            http,
            api_calls: AtomicU64::new(0),
        })
    }

    /// Resolve a city/state/country triple to coordinates.
    async fn geocode(
        &self,
        location: &LocationConfig,
    ) -> Result<(String, Coordinates), WeatherError> {
        let query = location.query();

        let entries: Vec<GeoEntry> = self
            .get_json(
                "OpenWeather geocoding",
                GEOCODING_URL,
                &[("q", query.as_str()), ("limit", "1"), ("appid", self.api_key.as_str())],
            )
            .await?;

        let entry = entries
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound(location.to_string()))?;

        debug!("Geocoded {query} to ({}, {})", entry.lat, entry.lon);

        let coords = Coordinates {
            lat: entry.lat,
            lon: entry.lon,
        };
        Ok((entry.name, coords))
    }

    async fn one_call(
        &self,
        coords: Coordinates,
        units: Units,
    ) -> Result<OneCallResponse, WeatherError> {
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();

        self.get_json(
            "OpenWeather One Call",
            ONE_CALL_URL,
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("exclude", "minutely,alerts"),
                ("appid", self.api_key.as_str()),
                ("units", units.as_str()),
            ],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let res = self.http.get(url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        self.api_calls.fetch_add(1, Ordering::Relaxed);

        if !status.is_success() {
            return Err(WeatherError::Status {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| WeatherError::Parse { endpoint, source })
    }
}

#[derive(Debug, Deserialize)]
struct GeoEntry {
    name: String,
    lat: f64,
    lon: f64,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(
        &self,
        location: &LocationConfig,
        units: Units,
    ) -> Result<WeatherReport, WeatherError> {
        let (name, coords) = self.geocode(location).await?;
        let one_call = self.one_call(coords, units).await?;
        let report = build_report(name, units, &one_call, Utc::now())?;

        info!(
            "Weather data updated for {}: {}°",
            location.city, report.current.temp
        );

        Ok(report)
    }

    fn api_calls(&self) -> u64 {
        self.api_calls.load(Ordering::Relaxed)
    }
}
