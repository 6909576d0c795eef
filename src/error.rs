/// Error types for the booking system.
///
/// Every failure here is recoverable: the caller reports it and carries on.
use thiserror::Error;

use crate::models::SlotTime;

/// Reasons a booking request is rejected.
///
/// Variants are listed in the order they are checked; the first failure wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("unknown patient: {0}")]
    UnknownPatient(String),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("invalid time format: '{0}' (expected YYYY-MM-DD HH:MM)")]
    InvalidTimeFormat(String),

    #[error("slot {instant} is not available for provider {provider_id}")]
    SlotUnavailable {
        provider_id: String,
        instant: SlotTime,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CancelError {
    #[error("invalid time format: '{0}' (expected YYYY-MM-DD HH:MM)")]
    InvalidTimeFormat(String),

    #[error("no appointment for patient {patient_id} with provider {provider_id} at {instant}")]
    AppointmentNotFound {
        patient_id: String,
        provider_id: String,
        instant: SlotTime,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("invalid business hours: {start}:00 - {end}:00")]
    InvalidHours { start: u32, end: u32 },

    #[error("slot granularity must be positive, got {0} minutes")]
    InvalidGranularity(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("ID already in use: {0}")]
    DuplicateId(String),

    #[error("calendar error: {0}")]
    Calendar(#[from] CalendarError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("calendar error: {0}")]
    Calendar(#[from] CalendarError),
}

/// A slot literal that does not follow `YYYY-MM-DD HH:MM` exactly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time format: '{0}' (expected YYYY-MM-DD HH:MM)")]
pub struct InvalidSlotTime(pub String);

impl From<InvalidSlotTime> for BookingError {
    fn from(err: InvalidSlotTime) -> Self {
        BookingError::InvalidTimeFormat(err.0)
    }
}

impl From<InvalidSlotTime> for CancelError {
    fn from(err: InvalidSlotTime) -> Self {
        CancelError::InvalidTimeFormat(err.0)
    }
}
