use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Units;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Current conditions, replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temp: f64,
    /// Today's low, taken from the first daily forecast entry.
    pub temp_min: f64,
    /// Today's high, taken from the first daily forecast entry.
    pub temp_max: f64,
    pub humidity: u8,
    pub pressure: u32,
    pub uvi: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    /// Short condition group, e.g. "Clouds".
    pub condition: String,
    pub description: String,
    /// OpenWeather icon code, e.g. "04d".
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyEntry {
    /// "2:00 PM"
    pub hour_label: String,
    pub temp: i32,
    pub condition: String,
    pub icon: String,
}

impl HourlyEntry {
    /// Compact label for narrow columns: "2:00 PM" becomes "2p".
    pub fn short_label(&self) -> String {
        self.hour_label
            .replace(":00 ", "")
            .replace("PM", "p")
            .replace("AM", "a")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEntry {
    /// "Mon"
    pub day_label: String,
    /// "04/08"
    pub date_label: String,
    pub temp_high: i32,
    pub temp_low: i32,
    pub condition: String,
    pub icon: String,
}

/// Everything one refresh produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location_name: String,
    pub units: Units,
    pub fetched_at: DateTime<Utc>,
    pub current: WeatherSnapshot,
    pub hourly: Vec<HourlyEntry>,
    pub daily: Vec<DailyEntry>,
}
