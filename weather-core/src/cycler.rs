//! Rotation over the enabled display modes, plus the per-mode fingerprint
//! cache that lets an unchanged screen skip its redraw.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt,
    time::{Duration, Instant},
};

use crate::{model::WeatherReport, render::wind_direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayMode {
    #[serde(rename = "weather")]
    Current,
    #[serde(rename = "hourly_forecast")]
    Hourly,
    #[serde(rename = "daily_forecast")]
    Daily,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Current => "weather",
            DisplayMode::Hourly => "hourly_forecast",
            DisplayMode::Daily => "daily_forecast",
        }
    }

    pub const fn all() -> &'static [DisplayMode] {
        &[DisplayMode::Current, DisplayMode::Hourly, DisplayMode::Daily]
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DisplayMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "weather" | "current" => Ok(DisplayMode::Current),
            "hourly_forecast" | "hourly" => Ok(DisplayMode::Hourly),
            "daily_forecast" | "daily" => Ok(DisplayMode::Daily),
            _ => Err(anyhow::anyhow!(
                "Unknown display mode '{value}'. Supported modes: weather, hourly_forecast, daily_forecast."
            )),
        }
    }
}

/// Cheap summary of what a screen shows; equal fingerprints render equal screens.
#[derive(Debug, Clone, PartialEq)]
pub enum Fingerprint {
    Current {
        temp: i64,
        temp_min: i64,
        temp_max: i64,
        condition: String,
        icon: String,
        humidity: u8,
        uvi: f64,
        wind_speed: i64,
        wind_direction: &'static str,
    },
    /// Hour label, temperature, condition, icon.
    Hourly(Vec<(String, i32, String, String)>),
    /// Day label, high, low, condition, icon.
    Daily(Vec<(String, i32, i32, String, String)>),
}

impl Fingerprint {
    /// Hourly entries that take part in the comparison.
    pub const HOURLY_ENTRIES: usize = 4;
    /// Daily entries that take part in the comparison.
    pub const DAILY_ENTRIES: usize = 4;

    /// `None` when the report has nothing to show for `mode`.
    pub fn of(mode: DisplayMode, report: &WeatherReport) -> Option<Self> {
        match mode {
            DisplayMode::Current => {
                let c = &report.current;
                Some(Fingerprint::Current {
                    temp: c.temp.round() as i64,
                    temp_min: c.temp_min.round() as i64,
                    temp_max: c.temp_max.round() as i64,
                    condition: c.condition.clone(),
                    icon: c.icon.clone(),
                    humidity: c.humidity,
                    uvi: c.uvi,
                    wind_speed: c.wind_speed.round() as i64,
                    wind_direction: wind_direction(c.wind_deg),
                })
            }
            DisplayMode::Hourly if !report.hourly.is_empty() => Some(Fingerprint::Hourly(
                report
                    .hourly
                    .iter()
                    .take(Self::HOURLY_ENTRIES)
                    .map(|h| (h.hour_label.clone(), h.temp, h.condition.clone(), h.icon.clone()))
                    .collect(),
            )),
            DisplayMode::Daily if !report.daily.is_empty() => Some(Fingerprint::Daily(
                report
                    .daily
                    .iter()
                    .take(Self::DAILY_ENTRIES)
                    .map(|d| {
                        let label = d.day_label.clone();
                        (label, d.temp_high, d.temp_low, d.condition.clone(), d.icon.clone())
                    })
                    .collect(),
            )),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSelection {
    pub mode: DisplayMode,
    pub changed: bool,
}

#[derive(Debug, Clone)]
pub struct ModeCycler {
    modes: Vec<DisplayMode>,
    index: usize,
    current: Option<DisplayMode>,
    last_switch: Option<Instant>,
    rendered: HashMap<DisplayMode, Fingerprint>,
}

impl ModeCycler {
    /// An empty list falls back to the current conditions screen.
    pub fn new(mut modes: Vec<DisplayMode>) -> Self {
        if modes.is_empty() {
            modes.push(DisplayMode::Current);
        }
        Self {
            modes,
            index: 0,
            current: None,
            last_switch: None,
            rendered: HashMap::new(),
        }
    }

    pub fn modes(&self) -> &[DisplayMode] {
        &self.modes
    }

    pub fn current(&self) -> Option<DisplayMode> {
        self.current
    }

    /// Pick the mode to render.
    ///
    /// An enabled `requested` mode wins. Otherwise the rotation continues:
    /// the very first call shows the first enabled mode, and `advance`
    /// (the caller's end-of-period trigger) steps to the next one, wrapping.
    pub fn select(
        &mut self,
        requested: Option<DisplayMode>,
        advance: bool,
        now: Instant,
    ) -> ModeSelection {
        let requested_index =
            requested.and_then(|mode| self.modes.iter().position(|m| *m == mode));

        if let Some(index) = requested_index {
            let mode = self.modes[index];
            self.index = index;
            let changed = self.switch_to(mode, now);
            return ModeSelection { mode, changed };
        }

        if self.current.is_some() && advance {
            self.index = (self.index + 1) % self.modes.len();
        }
        let mode = self.modes[self.index];
        let changed = self.switch_to(mode, now);
        ModeSelection { mode, changed }
    }

    /// Whether `duration` has passed since the last mode switch.
    pub fn switch_due(&self, now: Instant, duration: Duration) -> bool {
        self.last_switch
            .is_none_or(|t| now.saturating_duration_since(t) >= duration)
    }

    fn switch_to(&mut self, mode: DisplayMode, now: Instant) -> bool {
        if self.current == Some(mode) {
            return false;
        }

        match self.current {
            Some(previous) => info!("Display mode changed from {previous} to {mode}"),
            None => info!("Display mode set to {mode}"),
        }
        if self.rendered.remove(&mode).is_some() {
            debug!("Reset {mode} state cache for mode switch");
        }

        self.current = Some(mode);
        self.last_switch = Some(now);
        true
    }

    pub fn needs_redraw(&self, mode: DisplayMode, fingerprint: &Fingerprint) -> bool {
        self.rendered.get(&mode) != Some(fingerprint)
    }

    pub fn mark_rendered(&mut self, mode: DisplayMode, fingerprint: Fingerprint) {
        self.rendered.insert(mode, fingerprint);
    }

    /// Forget every rendered fingerprint, forcing a full redraw next time.
    pub fn invalidate(&mut self) {
        self.rendered.clear();
    }
}
