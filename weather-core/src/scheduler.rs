//! Decides when the weather API may be called.
//!
//! Two gates apply, in order: the refresh interval measured from the last
//! successful update, and the error backoff window that opens once too many
//! consecutive fetches have failed. All methods take `now` explicitly so the
//! caller owns the clock.

use log::{debug, error};
use std::{
    fmt::Display,
    time::{Duration, Instant},
};

use crate::config::{BackoffConfig, Config};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub update_interval: Duration,
    pub backoff_base: Duration,
    pub backoff_cap: Duration,
    pub max_consecutive_errors: u32,
    pub log_throttle: Duration,
}

impl SchedulerConfig {
    pub fn from_config(config: &Config) -> Self {
        let BackoffConfig {
            base_secs,
            cap_secs,
            max_consecutive_errors,
            log_throttle_secs,
        } = config.backoff;

        let backoff_base = Duration::from_secs(base_secs);
        Self {
            update_interval: config.update_interval(),
            backoff_base,
            backoff_cap: Duration::from_secs(cap_secs).max(backoff_base),
            max_consecutive_errors: max_consecutive_errors.max(1),
            log_throttle: Duration::from_secs(log_throttle_secs),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Consecutive failures and the current backoff window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorState {
    pub consecutive_errors: u32,
    pub backoff: Duration,
    pub last_error: Option<Instant>,
    pub last_error_log: Option<Instant>,
}

impl ErrorState {
    fn new(base: Duration) -> Self {
        Self {
            consecutive_errors: 0,
            backoff: base,
            last_error: None,
            last_error_log: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateDecision {
    /// The last successful update is still fresh.
    NotDue { remaining: Duration },
    /// Too many failures; wait out the backoff window.
    BackingOff { remaining: Duration },
    Due,
}

#[derive(Debug, Clone)]
pub struct UpdateScheduler {
    config: SchedulerConfig,
    last_update: Option<Instant>,
    errors: ErrorState,
}

impl UpdateScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        let errors = ErrorState::new(config.backoff_base);
        Self {
            config,
            last_update: None,
            errors,
        }
    }

    pub fn check(&mut self, now: Instant) -> UpdateDecision {
        if let Some(last) = self.last_update {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.config.update_interval {
                return UpdateDecision::NotDue {
                    remaining: self.config.update_interval - elapsed,
                };
            }
        }

        if self.errors.consecutive_errors >= self.config.max_consecutive_errors {
            let since_error = self
                .errors
                .last_error
                .map(|t| now.saturating_duration_since(t))
                .unwrap_or(Duration::MAX);

            if since_error < self.errors.backoff {
                let remaining = self.errors.backoff - since_error;
                debug!(
                    "In error backoff period, retrying in {}s",
                    remaining.as_secs()
                );
                return UpdateDecision::BackingOff { remaining };
            }

            // window expired, start counting again from scratch
            self.errors.consecutive_errors = 0;
            self.errors.backoff = self.config.backoff_base;
        }

        UpdateDecision::Due
    }

    pub fn record_success(&mut self, now: Instant) {
        self.last_update = Some(now);
        self.errors.consecutive_errors = 0;
        self.errors.backoff = self.config.backoff_base;
    }

    /// Count a failed fetch and grow the backoff. Returns whether the
    /// failure was logged; at most one error is logged per throttle window.
    pub fn record_failure(&mut self, now: Instant, err: &dyn Display) -> bool {
        self.errors.consecutive_errors = self.errors.consecutive_errors.saturating_add(1);
        self.errors.last_error = Some(now);
        self.errors.backoff = self
            .errors
            .backoff
            .saturating_mul(2)
            .min(self.config.backoff_cap);

        let may_log = self
            .errors
            .last_error_log
            .is_none_or(|t| now.saturating_duration_since(t) > self.config.log_throttle);
        if !may_log {
            return false;
        }

        error!(
            "Error updating weather (attempt {}/{}): {err}",
            self.errors.consecutive_errors, self.config.max_consecutive_errors
        );
        if self.errors.consecutive_errors >= self.config.max_consecutive_errors {
            error!(
                "Weather API disabled for {} seconds due to repeated failures",
                self.errors.backoff.as_secs()
            );
        }
        self.errors.last_error_log = Some(now);
        true
    }

    pub fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    pub fn errors(&self) -> &ErrorState {
        &self.errors
    }
}
