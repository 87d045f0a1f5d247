use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{error::WeatherError, model::WeatherReport};

/// On-disk copy of the last good report, so a restart within the refresh
/// interval does not spend API calls.
#[derive(Debug, Clone)]
pub struct ReportCache {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// Geocoding query the report was fetched for.
    location: String,
    report: WeatherReport,
}

impl ReportCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached report for `location`, if it is younger than `max_age`.
    ///
    /// A missing, stale or unreadable cache is simply a miss.
    pub fn load_fresh(
        &self,
        location: &str,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Option<WeatherReport> {
        let contents = fs::read_to_string(&self.path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&contents) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring unreadable weather cache {}: {e}", self.path.display());
                return None;
            }
        };

        if entry.location != location {
            debug!("Weather cache is for {}, not {location}", entry.location);
            return None;
        }

        let age = (now - entry.report.fetched_at).to_std().ok()?;
        if age >= max_age {
            debug!("Weather cache is {}s old, refetching", age.as_secs());
            return None;
        }

        Some(entry.report)
    }

    pub fn store(&self, location: &str, report: &WeatherReport) -> Result<(), WeatherError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                WeatherError::Cache(format!("create {}: {e}", parent.display()))
            })?;
        }

        let entry = CacheEntry {
            location: location.to_string(),
            report: report.clone(),
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| WeatherError::Cache(format!("serialize: {e}")))?;

        fs::write(&self.path, json)
            .map_err(|e| WeatherError::Cache(format!("write {}: {e}", self.path.display())))
    }

    pub fn clear(&self) {
        fs::remove_file(&self.path).ok();
    }
}
