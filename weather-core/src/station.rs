//! The weather station: one explicitly owned object holding the fetched
//! data, the update scheduler, the mode cycler and the display.
//!
//! The owner drives it cooperatively by calling [`WeatherStation::update`]
//! and [`WeatherStation::display`] on its own cadence.

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::{
    cache::ReportCache,
    config::{Config, LocationConfig, Units},
    cycler::{DisplayMode, Fingerprint, ModeCycler},
    display::MatrixDisplay,
    model::WeatherReport,
    provider::WeatherProvider,
    render::{Frame, screens},
    scheduler::{SchedulerConfig, UpdateDecision, UpdateScheduler},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    NotDue,
    BackingOff { remaining: Duration },
    MissingApiKey,
    /// A fresh enough report was found in the on-disk cache.
    Cached,
    Fetched,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The placeholder screen was drawn.
    NoData,
    /// The screen for this mode was drawn from scratch.
    Redrawn(DisplayMode),
    /// Nothing changed; the previous frame was presented again.
    Refreshed(DisplayMode),
    /// Drawing succeeded but the display rejected the frame.
    Failed(DisplayMode),
}

/// Status summary for status pages and `weather-matrix info`.
#[derive(Debug, Clone, Serialize)]
pub struct StationInfo {
    pub location: LocationConfig,
    pub units: Units,
    pub api_key_configured: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub current_temp: Option<f64>,
    pub current_humidity: Option<u8>,
    pub current_description: String,
    pub forecast_available: bool,
    pub hourly_forecast_count: usize,
    pub daily_forecast_count: usize,
    pub current_mode: Option<DisplayMode>,
    pub consecutive_errors: u32,
    pub api_calls: u64,
}

#[derive(Debug)]
pub struct WeatherStation<P, D> {
    config: Config,
    provider: P,
    display: D,
    scheduler: UpdateScheduler,
    cycler: ModeCycler,
    cache: Option<ReportCache>,
    report: Option<WeatherReport>,
    warned_missing_key: bool,
}

impl<P, D> WeatherStation<P, D>
where
    P: WeatherProvider,
    D: MatrixDisplay,
{
    pub fn new(config: Config, provider: P, display: D) -> Self {
        let cache = if config.cache.enabled {
            match config.cache_file_path() {
                Ok(path) => Some(ReportCache::new(path)),
                Err(e) => {
                    warn!("Weather cache disabled: {e}");
                    None
                }
            }
        } else {
            None
        };

        info!("Weather station initialized for {}", config.location.city);
        info!(
            "Units: {}, Update interval: {}s",
            config.units, config.update_interval
        );

        Self {
            scheduler: UpdateScheduler::new(SchedulerConfig::from_config(&config)),
            cycler: ModeCycler::new(config.enabled_modes()),
            config,
            provider,
            display,
            cache,
            report: None,
            warned_missing_key: false,
        }
    }

    /// Replace the cache chosen from config (`None` turns caching off).
    pub fn with_cache(mut self, cache: Option<ReportCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Refresh the weather data if the scheduler allows it.
    ///
    /// Never fails: errors are logged (throttled) and turned into backoff.
    pub async fn update(&mut self, now: Instant) -> UpdateOutcome {
        match self.scheduler.check(now) {
            UpdateDecision::NotDue { .. } => return UpdateOutcome::NotDue,
            UpdateDecision::BackingOff { remaining } => {
                return UpdateOutcome::BackingOff { remaining };
            }
            UpdateDecision::Due => {}
        }

        if !self.config.api_key_configured() {
            if !self.warned_missing_key {
                warn!("No valid OpenWeatherMap API key configured");
                self.warned_missing_key = true;
            }
            return UpdateOutcome::MissingApiKey;
        }

        let location = self.config.location.query();

        // the cache only bridges restarts; a held report is always refetched
        let cached = match (&self.cache, &self.report) {
            (Some(cache), None) => {
                cache.load_fresh(&location, self.config.update_interval(), Utc::now())
            }
            _ => None,
        };
        if let Some(report) = cached {
            info!("Using cached weather data");
            self.accept(report, now);
            return UpdateOutcome::Cached;
        }

        match self.provider.fetch(&self.config.location, self.config.units).await {
            Ok(report) => {
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.store(&location, &report) {
                        warn!("{e}");
                    }
                }
                self.accept(report, now);
                UpdateOutcome::Fetched
            }
            Err(e) => {
                self.scheduler.record_failure(now, &e);
                UpdateOutcome::Failed
            }
        }
    }

    fn accept(&mut self, report: WeatherReport, now: Instant) {
        self.report = Some(report);
        self.scheduler.record_success(now);
    }

    /// Render the current screen.
    ///
    /// `requested` pins an enabled mode; otherwise the rotation continues and
    /// `advance` (typically [`WeatherStation::switch_due`]) moves it on.
    pub fn display(
        &mut self,
        requested: Option<DisplayMode>,
        advance: bool,
        now: Instant,
    ) -> RenderOutcome {
        if self.report.is_none() {
            return self.show_no_data();
        }

        let mode = self.cycler.select(requested, advance, now).mode;

        let Some(fingerprint) = self.report.as_ref().and_then(|r| Fingerprint::of(mode, r)) else {
            debug!("No {mode} data available, showing no data message");
            return self.show_no_data();
        };

        if !self.cycler.needs_redraw(mode, &fingerprint) {
            // unchanged, but preview consumers still expect a refresh
            if let Err(e) = self.display.update_display() {
                error!("Error refreshing {mode} display: {e}");
                return RenderOutcome::Failed(mode);
            }
            return RenderOutcome::Refreshed(mode);
        }

        self.display.clear();
        let mut frame = self.blank_frame();
        if let Some(report) = &self.report {
            screens::render_mode(&mut frame, mode, report);
        }

        match self.present(frame) {
            Ok(()) => {
                self.cycler.mark_rendered(mode, fingerprint);
                RenderOutcome::Redrawn(mode)
            }
            Err(e) => {
                error!("Error displaying {mode}: {e}");
                RenderOutcome::Failed(mode)
            }
        }
    }

    pub fn display_weather(&mut self, advance: bool, now: Instant) -> RenderOutcome {
        self.display(Some(DisplayMode::Current), advance, now)
    }

    pub fn display_hourly_forecast(&mut self, advance: bool, now: Instant) -> RenderOutcome {
        self.display(Some(DisplayMode::Hourly), advance, now)
    }

    pub fn display_daily_forecast(&mut self, advance: bool, now: Instant) -> RenderOutcome {
        self.display(Some(DisplayMode::Daily), advance, now)
    }

    /// Whether the current mode has been on screen for `display_duration`.
    pub fn switch_due(&self, now: Instant) -> bool {
        self.cycler.switch_due(now, self.config.display_duration())
    }

    fn show_no_data(&mut self) -> RenderOutcome {
        // the placeholder replaces whatever mode frame was on screen
        self.cycler.invalidate();
        let mut frame = self.blank_frame();
        screens::render_no_data(&mut frame);
        if let Err(e) = self.present(frame) {
            error!("Error displaying no data message: {e}");
        }
        RenderOutcome::NoData
    }

    fn blank_frame(&self) -> Frame {
        let size = self.display.size();
        Frame::new(size.width, size.height)
    }

    fn present(&mut self, frame: Frame) -> Result<(), crate::display::DisplayError> {
        self.display.set_image(frame)?;
        self.display.update_display()
    }

    pub fn info(&self) -> StationInfo {
        let current = self.report.as_ref().map(|r| &r.current);

        StationInfo {
            location: self.config.location.clone(),
            units: self.config.units,
            api_key_configured: self.config.api_key_configured(),
            last_update: self.report.as_ref().map(|r| r.fetched_at),
            current_temp: current.map(|c| c.temp),
            current_humidity: current.map(|c| c.humidity),
            current_description: current.map(|c| c.description.clone()).unwrap_or_default(),
            forecast_available: self
                .report
                .as_ref()
                .is_some_and(|r| !r.hourly.is_empty() || !r.daily.is_empty()),
            hourly_forecast_count: self.report.as_ref().map_or(0, |r| r.hourly.len()),
            daily_forecast_count: self.report.as_ref().map_or(0, |r| r.daily.len()),
            current_mode: self.cycler.current(),
            consecutive_errors: self.scheduler.errors().consecutive_errors,
            api_calls: self.provider.api_calls(),
        }
    }

    /// Drop the fetched data; the next `display` shows the placeholder.
    pub fn cleanup(&mut self) {
        self.report = None;
        self.cycler.invalidate();
        info!("Weather station cleaned up");
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        self.report.as_ref()
    }

    pub fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        display::MemoryDisplay, error::WeatherError, forecast::tests::sample_report,
    };
    use async_trait::async_trait;
    use std::{
        collections::VecDeque,
        sync::{
            Mutex,
            atomic::{AtomicU64, Ordering},
        },
    };

    #[derive(Debug, Default)]
    struct MockProvider {
        responses: Mutex<VecDeque<Result<WeatherReport, WeatherError>>>,
        calls: AtomicU64,
    }

    impl MockProvider {
        fn with(responses: Vec<Result<WeatherReport, WeatherError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicU64::new(0),
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for MockProvider {
        async fn fetch(
            &self,
            _location: &LocationConfig,
            _units: Units,
        ) -> Result<WeatherReport, WeatherError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(sample_report()))
        }

        fn api_calls(&self) -> u64 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    fn configured() -> Config {
        let mut config = Config::default();
        config.set_api_key("KEY".into());
        config
    }

    fn station(
        config: Config,
        provider: MockProvider,
    ) -> (WeatherStation<MockProvider, MemoryDisplay>, MemoryDisplay) {
        let display = MemoryDisplay::new(config.display.width, config.display.height);
        let station = WeatherStation::new(config, provider, display.clone()).with_cache(None);
        (station, display)
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[tokio::test]
    async fn fetches_once_per_interval() {
        let (mut station, _) = station(configured(), MockProvider::default());
        let t0 = Instant::now();

        assert_eq!(station.update(t0).await, UpdateOutcome::Fetched);
        assert_eq!(station.update(t0 + secs(60)).await, UpdateOutcome::NotDue);
        assert_eq!(station.update(t0 + secs(1799)).await, UpdateOutcome::NotDue);
        assert_eq!(station.update(t0 + secs(1800)).await, UpdateOutcome::Fetched);
        assert_eq!(station.info().api_calls, 2);
    }

    #[tokio::test]
    async fn missing_api_key_disables_fetching() {
        let (mut station, _) = station(Config::default(), MockProvider::default());

        assert_eq!(station.update(Instant::now()).await, UpdateOutcome::MissingApiKey);
        assert_eq!(station.update(Instant::now()).await, UpdateOutcome::MissingApiKey);
        assert_eq!(station.info().api_calls, 0);
        assert_eq!(station.scheduler().errors().consecutive_errors, 0);
        assert!(station.report().is_none());
    }

    #[tokio::test]
    async fn failures_back_off_and_keep_previous_data() {
        let failures = (0..5)
            .map(|_| Err(WeatherError::MissingData("current.weather")))
            .collect::<Vec<_>>();
        let mut responses = vec![Ok(sample_report())];
        responses.extend(failures);

        let (mut station, _) = station(configured(), MockProvider::with(responses));
        let t0 = Instant::now();

        assert_eq!(station.update(t0).await, UpdateOutcome::Fetched);
        let later = t0 + secs(1800);
        for i in 0..5 {
            assert_eq!(station.update(later + secs(i)).await, UpdateOutcome::Failed);
        }
        assert!(matches!(
            station.update(later + secs(10)).await,
            UpdateOutcome::BackingOff { .. }
        ));

        assert!(station.report().is_some());
        assert_eq!(station.info().consecutive_errors, 5);
        assert_eq!(station.info().api_calls, 6);
    }

    #[tokio::test]
    async fn success_after_failure_resets_backoff() {
        let responses = vec![Err(WeatherError::LocationNotFound("Nowhere".into()))];
        let (mut station, _) = station(configured(), MockProvider::with(responses));
        let t0 = Instant::now();

        assert_eq!(station.update(t0).await, UpdateOutcome::Failed);
        assert_eq!(station.scheduler().errors().backoff, secs(120));

        assert_eq!(station.update(t0 + secs(1)).await, UpdateOutcome::Fetched);
        assert_eq!(station.scheduler().errors().backoff, secs(60));
        assert_eq!(station.scheduler().errors().consecutive_errors, 0);
    }

    #[tokio::test]
    async fn cache_hit_skips_the_provider() {
        let path = std::env::temp_dir()
            .join(format!("weather-matrix-station-{}", std::process::id()))
            .join("weather.json");
        let cache = ReportCache::new(&path);
        let config = configured();
        cache
            .store(&config.location.query(), &sample_report())
            .expect("store must succeed");

        let display = MemoryDisplay::new(128, 32);
        let mut station = WeatherStation::new(config, MockProvider::default(), display)
            .with_cache(Some(cache.clone()));

        assert_eq!(station.update(Instant::now()).await, UpdateOutcome::Cached);
        assert_eq!(station.info().api_calls, 0);
        assert!(station.report().is_some());
        cache.clear();
    }

    #[tokio::test]
    async fn own_cache_entry_does_not_delay_the_next_refresh() {
        let path = std::env::temp_dir()
            .join(format!("weather-matrix-refresh-{}", std::process::id()))
            .join("weather.json");
        let cache = ReportCache::new(&path);
        cache.clear();

        let display = MemoryDisplay::new(128, 32);
        let mut station = WeatherStation::new(configured(), MockProvider::default(), display)
            .with_cache(Some(cache.clone()));
        let t0 = Instant::now();

        assert_eq!(station.update(t0).await, UpdateOutcome::Fetched);
        // the entry just written is still fresh by wall clock
        assert_eq!(station.update(t0 + secs(1800)).await, UpdateOutcome::Fetched);
        assert_eq!(station.info().api_calls, 2);
        cache.clear();
    }

    #[test]
    fn no_data_placeholder_before_first_fetch() {
        let (mut station, display) = station(configured(), MockProvider::default());

        assert_eq!(station.display(None, false, Instant::now()), RenderOutcome::NoData);

        let state = display.snapshot();
        assert_eq!(state.update_count, 1);
        assert!(state.presented.is_some_and(|f| f.lit_pixels() > 0));
    }

    #[tokio::test]
    async fn unchanged_data_refreshes_without_redraw() {
        let (mut station, display) = station(configured(), MockProvider::default());
        let t0 = Instant::now();
        station.update(t0).await;

        assert_eq!(
            station.display(None, false, t0),
            RenderOutcome::Redrawn(DisplayMode::Current)
        );
        assert_eq!(
            station.display(None, false, t0 + secs(1)),
            RenderOutcome::Refreshed(DisplayMode::Current)
        );

        let state = display.snapshot();
        assert_eq!(state.set_image_count, 1);
        assert_eq!(state.clear_count, 1);
        assert_eq!(state.update_count, 2);
    }

    #[tokio::test]
    async fn changed_data_is_redrawn() {
        let mut changed = sample_report();
        changed.current.humidity = 90;
        let provider = MockProvider::with(vec![Ok(sample_report()), Ok(changed)]);
        let (mut station, display) = station(configured(), provider);
        let t0 = Instant::now();

        station.update(t0).await;
        station.display(None, false, t0);
        station.update(t0 + secs(1800)).await;

        assert_eq!(
            station.display(None, false, t0 + secs(1800)),
            RenderOutcome::Redrawn(DisplayMode::Current)
        );
        assert_eq!(display.snapshot().set_image_count, 2);
    }

    #[tokio::test]
    async fn rotation_redraws_on_every_mode_switch() {
        let (mut station, _) = station(configured(), MockProvider::default());
        let t0 = Instant::now();
        station.update(t0).await;

        let outcomes: Vec<_> = (0..4)
            .map(|i| station.display(None, i > 0, t0 + secs(30 * i)))
            .collect();

        assert_eq!(
            outcomes,
            vec![
                RenderOutcome::Redrawn(DisplayMode::Current),
                RenderOutcome::Redrawn(DisplayMode::Hourly),
                RenderOutcome::Redrawn(DisplayMode::Daily),
                RenderOutcome::Redrawn(DisplayMode::Current),
            ]
        );
    }

    #[tokio::test]
    async fn disabled_modes_are_never_shown() {
        let mut config = configured();
        config.display.show_hourly_forecast = false;
        let (mut station, _) = station(config, MockProvider::default());
        let t0 = Instant::now();
        station.update(t0).await;

        let modes: Vec<_> = (0..4)
            .map(|i| match station.display(None, i > 0, t0) {
                RenderOutcome::Redrawn(mode) | RenderOutcome::Refreshed(mode) => mode,
                other => panic!("unexpected outcome {other:?}"),
            })
            .collect();
        assert_eq!(
            modes,
            vec![DisplayMode::Current, DisplayMode::Daily, DisplayMode::Current, DisplayMode::Daily]
        );

        assert_eq!(
            station.display_hourly_forecast(false, t0),
            RenderOutcome::Refreshed(DisplayMode::Daily)
        );
    }

    #[tokio::test]
    async fn missing_forecast_shows_placeholder() {
        let mut report = sample_report();
        report.hourly.clear();
        let (mut station, _) = station(configured(), MockProvider::with(vec![Ok(report)]));
        let t0 = Instant::now();
        station.update(t0).await;

        assert_eq!(station.display_hourly_forecast(false, t0), RenderOutcome::NoData);
        assert_eq!(
            station.display_daily_forecast(false, t0),
            RenderOutcome::Redrawn(DisplayMode::Daily)
        );
    }

    #[tokio::test]
    async fn data_returning_after_placeholder_is_redrawn() {
        let mut without_hourly = sample_report();
        without_hourly.hourly.clear();
        let provider = MockProvider::with(vec![
            Ok(sample_report()),
            Ok(without_hourly),
            Ok(sample_report()),
        ]);
        let (mut station, display) = station(configured(), provider);
        let t0 = Instant::now();

        station.update(t0).await;
        assert_eq!(
            station.display_hourly_forecast(false, t0),
            RenderOutcome::Redrawn(DisplayMode::Hourly)
        );
        let hourly_frame = display.snapshot().presented;

        station.update(t0 + secs(1800)).await;
        assert_eq!(
            station.display_hourly_forecast(false, t0 + secs(1800)),
            RenderOutcome::NoData
        );

        station.update(t0 + secs(3600)).await;
        assert_eq!(
            station.display_hourly_forecast(false, t0 + secs(3600)),
            RenderOutcome::Redrawn(DisplayMode::Hourly)
        );
        assert_eq!(display.snapshot().presented, hourly_frame);
    }

    #[tokio::test]
    async fn switch_due_follows_display_duration() {
        let (mut station, _) = station(configured(), MockProvider::default());
        let t0 = Instant::now();
        station.update(t0).await;
        station.display(None, false, t0);

        assert!(!station.switch_due(t0 + secs(29)));
        assert!(station.switch_due(t0 + secs(30)));
    }

    #[tokio::test]
    async fn info_and_cleanup() {
        let (mut station, _) = station(configured(), MockProvider::default());
        let t0 = Instant::now();
        station.update(t0).await;
        station.display(None, false, t0);

        let info = station.info();
        assert!(info.api_key_configured);
        assert_eq!(info.current_temp, Some(72.4));
        assert_eq!(info.current_humidity, Some(61));
        assert_eq!(info.current_description, "broken clouds");
        assert!(info.forecast_available);
        assert_eq!(info.hourly_forecast_count, 5);
        assert_eq!(info.daily_forecast_count, 3);
        assert_eq!(info.current_mode, Some(DisplayMode::Current));

        station.cleanup();
        assert!(station.report().is_none());
        assert_eq!(station.display(None, false, t0), RenderOutcome::NoData);
    }
}
