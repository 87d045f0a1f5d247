//! Core library for the `weather-matrix` station.
//!
//! This crate defines:
//! - Configuration handling (TOML file under the platform config dir)
//! - The OpenWeather provider and the report model it produces
//! - Update scheduling with exponential backoff
//! - Display-mode rotation and redraw skipping
//! - Pixel rendering onto an RGB matrix
//!
//! It is used by `weather-cli`, but the [`WeatherStation`] can be driven by
//! any binary that owns a [`MatrixDisplay`].

pub mod cache;
pub mod config;
pub mod cycler;
pub mod display;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod render;
pub mod scheduler;
pub mod station;

pub use config::{Config, Units};
pub use cycler::DisplayMode;
pub use display::{MatrixDisplay, MemoryDisplay};
pub use error::WeatherError;
pub use model::WeatherReport;
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use station::{RenderOutcome, StationInfo, UpdateOutcome, WeatherStation};
