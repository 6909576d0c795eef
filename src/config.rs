use chrono::NaiveDate;
use std::env;
use std::str::FromStr;
use tracing::warn;

use crate::calendar::SlotCalendar;
use crate::error::{CalendarError, ConfigError};

pub const DEFAULT_START_HOUR: u32 = 9;
pub const DEFAULT_END_HOUR: u32 = 17;
pub const DEFAULT_SLOT_MINUTES: u32 = 30;

/// Settings applied to every provider calendar and to cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub reference_day: NaiveDate,
    pub start_hour: u32,
    pub end_hour: u32,
    pub slot_minutes: u32,
    /// When set, cancelling a booking also drops its urgent-queue entry.
    pub purge_urgent_on_cancel: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reference_day: default_reference_day(),
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
            slot_minutes: DEFAULT_SLOT_MINUTES,
            purge_urgent_on_cancel: false,
        }
    }
}

fn default_reference_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 22).unwrap_or_default()
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            reference_day: env_or("SLOTBOOK_REFERENCE_DAY", defaults.reference_day),
            start_hour: env_or("SLOTBOOK_START_HOUR", defaults.start_hour),
            end_hour: env_or("SLOTBOOK_END_HOUR", defaults.end_hour),
            slot_minutes: env_or("SLOTBOOK_SLOT_MINUTES", defaults.slot_minutes),
            purge_urgent_on_cancel: env_or(
                "SLOTBOOK_PURGE_URGENT_ON_CANCEL",
                defaults.purge_urgent_on_cancel,
            ),
        };

        if let Err(e) = config.validate() {
            warn!("Invalid scheduler configuration ({}), using defaults", e);
            return defaults;
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_hour >= self.end_hour || self.end_hour > 24 {
            return Err(CalendarError::InvalidHours {
                start: self.start_hour,
                end: self.end_hour,
            }
            .into());
        }
        if self.slot_minutes == 0 {
            return Err(CalendarError::InvalidGranularity(self.slot_minutes).into());
        }
        Ok(())
    }

    /// A fresh calendar covering the configured business hours.
    pub fn new_calendar(&self) -> Result<SlotCalendar, CalendarError> {
        SlotCalendar::initialize(
            self.reference_day,
            self.start_hour,
            self.end_hour,
            self.slot_minutes,
        )
    }
}

/// Parse a single configuration value.
pub fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw).unwrap_or_else(|e| {
            warn!("{}, using default", e);
            default
        }),
        Err(_) => default,
    }
}
