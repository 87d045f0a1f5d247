//! One Call payload types and the reduction of a raw payload into a
//! [`WeatherReport`].

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Deserialize;

use crate::{
    config::Units,
    error::WeatherError,
    model::{DailyEntry, HourlyEntry, WeatherReport, WeatherSnapshot},
};

/// Hours kept from the hourly forecast.
pub const HOURLY_COUNT: usize = 5;
/// Days kept from the daily forecast, after skipping today.
pub const DAILY_COUNT: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct OneCallResponse {
    /// Seconds east of UTC for the requested location.
    #[serde(default)]
    pub timezone_offset: i32,
    pub current: OcCurrent,
    #[serde(default)]
    pub hourly: Vec<OcHourly>,
    #[serde(default)]
    pub daily: Vec<OcDaily>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcCondition {
    pub main: String,
    #[serde(default)]
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcCurrent {
    pub dt: i64,
    pub temp: f64,
    pub humidity: u8,
    pub pressure: u32,
    #[serde(default)]
    pub uvi: f64,
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_deg: f64,
    pub weather: Vec<OcCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcHourly {
    pub dt: i64,
    pub temp: f64,
    pub weather: Vec<OcCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcDailyTemp {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcDaily {
    pub dt: i64,
    pub temp: OcDailyTemp,
    pub weather: Vec<OcCondition>,
}

pub fn build_report(
    location_name: String,
    units: Units,
    raw: &OneCallResponse,
    fetched_at: DateTime<Utc>,
) -> Result<WeatherReport, WeatherError> {
    let offset = FixedOffset::east_opt(raw.timezone_offset).unwrap_or(Utc.fix());

    Ok(WeatherReport {
        location_name,
        units,
        fetched_at,
        current: current_snapshot(raw)?,
        hourly: hourly_entries(raw, offset)?,
        daily: daily_entries(raw, offset)?,
    })
}

fn first_condition<'a>(
    weather: &'a [OcCondition],
    what: &'static str,
) -> Result<&'a OcCondition, WeatherError> {
    weather.first().ok_or(WeatherError::MissingData(what))
}

fn current_snapshot(raw: &OneCallResponse) -> Result<WeatherSnapshot, WeatherError> {
    let today = raw
        .daily
        .first()
        .ok_or(WeatherError::MissingData("daily[0] (today's high/low)"))?;
    let condition = first_condition(&raw.current.weather, "current.weather")?;

    Ok(WeatherSnapshot {
        temp: raw.current.temp,
        temp_min: today.temp.min,
        temp_max: today.temp.max,
        humidity: raw.current.humidity,
        pressure: raw.current.pressure,
        uvi: raw.current.uvi,
        wind_speed: raw.current.wind_speed,
        wind_deg: raw.current.wind_deg,
        condition: condition.main.clone(),
        description: condition.description.clone(),
        icon: condition.icon.clone(),
    })
}

fn local_time(ts: i64, offset: FixedOffset) -> Result<DateTime<FixedOffset>, WeatherError> {
    DateTime::from_timestamp(ts, 0)
        .map(|utc| utc.with_timezone(&offset))
        .ok_or(WeatherError::MissingData("valid forecast timestamp"))
}

fn hourly_entries(
    raw: &OneCallResponse,
    offset: FixedOffset,
) -> Result<Vec<HourlyEntry>, WeatherError> {
    raw.hourly
        .iter()
        .take(HOURLY_COUNT)
        .map(|hour| {
            let condition = first_condition(&hour.weather, "hourly.weather")?;
            Ok(HourlyEntry {
                hour_label: local_time(hour.dt, offset)?.format("%-I:00 %p").to_string(),
                temp: hour.temp.round() as i32,
                condition: condition.main.clone(),
                icon: condition.icon.clone(),
            })
        })
        .collect()
}

fn daily_entries(
    raw: &OneCallResponse,
    offset: FixedOffset,
) -> Result<Vec<DailyEntry>, WeatherError> {
    // index 0 is today, already shown on the current conditions screen
    raw.daily
        .iter()
        .skip(1)
        .take(DAILY_COUNT)
        .map(|day| {
            let condition = first_condition(&day.weather, "daily.weather")?;
            let dt = local_time(day.dt, offset)?;
            Ok(DailyEntry {
                day_label: dt.format("%a").to_string(),
                date_label: dt.format("%m/%d").to_string(),
                temp_high: day.temp.max.round() as i32,
                temp_low: day.temp.min.round() as i32,
                condition: condition.main.clone(),
                icon: condition.icon.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Trimmed One Call 3.0 payload for Dallas, 2024-04-08 (UTC-5).
    pub(crate) const SAMPLE_ONE_CALL: &str = r#"{
        "lat": 32.7763, "lon": -96.7969,
        "timezone": "America/Chicago",
        "timezone_offset": -18000,
        "current": {
            "dt": 1712592000, "temp": 72.4, "feels_like": 72.0, "pressure": 1012,
            "humidity": 61, "uvi": 6.2, "wind_speed": 9.8, "wind_deg": 170,
            "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}]
        },
        "hourly": [
            {"dt": 1712592000, "temp": 72.4, "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}]},
            {"dt": 1712595600, "temp": 73.6, "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}]},
            {"dt": 1712599200, "temp": 74.5, "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}]},
            {"dt": 1712602800, "temp": 74.1, "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}]},
            {"dt": 1712606400, "temp": 71.0, "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}]},
            {"dt": 1712610000, "temp": 68.2, "weather": [{"id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04n"}]},
            {"dt": 1712613600, "temp": 66.9, "weather": [{"id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04n"}]}
        ],
        "daily": [
            {"dt": 1712599200, "temp": {"min": 61.3, "max": 78.6}, "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}]},
            {"dt": 1712685600, "temp": {"min": 63.5, "max": 80.2}, "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}]},
            {"dt": 1712772000, "temp": {"min": 65.0, "max": 70.4}, "weather": [{"id": 501, "main": "Rain", "description": "moderate rain", "icon": "10d"}]},
            {"dt": 1712858400, "temp": {"min": 58.7, "max": 66.1}, "weather": [{"id": 211, "main": "Thunderstorm", "description": "thunderstorm", "icon": "11d"}]},
            {"dt": 1712944800, "temp": {"min": 55.2, "max": 69.9}, "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}]}
        ]
    }"#;

    pub(crate) fn sample_response() -> OneCallResponse {
        serde_json::from_str(SAMPLE_ONE_CALL).expect("sample payload must parse")
    }

    pub(crate) fn sample_report() -> WeatherReport {
        build_report("Dallas".into(), Units::Imperial, &sample_response(), Utc::now())
            .expect("sample report must build")
    }

    #[test]
    fn sample_payload_is_truncated_to_expected_counts() {
        let report = sample_report();

        assert_eq!(report.hourly.len(), HOURLY_COUNT);
        assert_eq!(report.daily.len(), DAILY_COUNT);
    }

    #[test]
    fn current_snapshot_takes_high_low_from_today() {
        let current = sample_report().current;

        assert_eq!(current.temp, 72.4);
        assert_eq!(current.temp_min, 61.3);
        assert_eq!(current.temp_max, 78.6);
        assert_eq!(current.humidity, 61);
        assert_eq!(current.pressure, 1012);
        assert_eq!(current.uvi, 6.2);
        assert_eq!(current.wind_deg, 170.0);
        assert_eq!(current.condition, "Clouds");
        assert_eq!(current.description, "broken clouds");
        assert_eq!(current.icon, "04d");
    }

    #[test]
    fn hourly_labels_use_location_offset() {
        let hourly = sample_report().hourly;

        // 1712592000 is 16:00 UTC, 11:00 in Dallas
        assert_eq!(hourly[0].hour_label, "11:00 AM");
        assert_eq!(hourly[1].hour_label, "12:00 PM");
        assert_eq!(hourly[2].hour_label, "1:00 PM");
        assert_eq!(hourly[1].temp, 74);
        assert_eq!(hourly[3].condition, "Rain");
        assert_eq!(hourly[4].icon, "10d");
    }

    #[test]
    fn daily_skips_today_and_rounds_temperatures() {
        let daily = sample_report().daily;

        assert_eq!(daily[0].day_label, "Tue");
        assert_eq!(daily[0].date_label, "04/09");
        assert_eq!(daily[0].temp_high, 80);
        assert_eq!(daily[0].temp_low, 64);
        assert_eq!(daily[2].day_label, "Thu");
        assert_eq!(daily[2].condition, "Thunderstorm");
    }

    #[test]
    fn short_forecasts_are_not_padded() {
        let mut raw = sample_response();
        raw.hourly.truncate(2);
        raw.daily.truncate(2);

        let report = build_report("Dallas".into(), Units::Metric, &raw, Utc::now()).unwrap();
        assert_eq!(report.hourly.len(), 2);
        assert_eq!(report.daily.len(), 1);
    }

    #[test]
    fn missing_today_is_an_error() {
        let mut raw = sample_response();
        raw.daily.clear();

        let err = build_report("Dallas".into(), Units::Imperial, &raw, Utc::now()).unwrap_err();
        assert!(matches!(err, WeatherError::MissingData(_)));
    }

    #[test]
    fn optional_current_fields_default_to_zero() {
        let raw: OneCallResponse = serde_json::from_str(
            r#"{
                "current": {"dt": 0, "temp": 1.0, "humidity": 10, "pressure": 1000, "wind_speed": 0.5,
                            "weather": [{"main": "Mist", "icon": "50n"}]},
                "daily": [{"dt": 0, "temp": {"min": 0.0, "max": 2.0}, "weather": [{"main": "Mist", "icon": "50n"}]}]
            }"#,
        )
        .unwrap();

        let report = build_report("X".into(), Units::Metric, &raw, Utc::now()).unwrap();
        assert_eq!(report.current.uvi, 0.0);
        assert_eq!(report.current.wind_deg, 0.0);
        assert!(report.hourly.is_empty());
        assert!(report.daily.is_empty());
    }
}
