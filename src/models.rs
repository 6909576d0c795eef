/// Data models for the booking system.
///
/// This module defines the records the core reads and writes:
/// - SlotTime: a bookable instant at minute precision
/// - Priority: urgency level derived from the urgent flag
/// - Patient / Provider: identity records held by the registries
/// - Appointment: a confirmed booking in the ledger
/// - UrgentQueueEntry: an urgent booking waiting to be handled
use chrono::{DateTime, Local, NaiveDateTime};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::calendar::SlotCalendar;
use crate::error::{InvalidSlotTime, RegistrationError};

/// Literal format accepted for slot instants.
pub const SLOT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A single bookable instant. Compared by (date, hour, minute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(NaiveDateTime);

impl SlotTime {
    pub fn new(at: NaiveDateTime) -> Self {
        SlotTime(at)
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl FromStr for SlotTime {
    type Err = InvalidSlotTime;

    /// Parse `YYYY-MM-DD HH:MM`. The input must be exactly the canonical
    /// rendering of the parsed value, so padding and stray whitespace fail.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parsed = NaiveDateTime::parse_from_str(input, SLOT_TIME_FORMAT)
            .map_err(|_| InvalidSlotTime(input.to_string()))?;

        if parsed.format(SLOT_TIME_FORMAT).to_string() != input {
            return Err(InvalidSlotTime(input.to_string()));
        }

        Ok(SlotTime(parsed))
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SLOT_TIME_FORMAT))
    }
}

/// Priority levels for bookings.
///
/// Higher numeric values are handled first by the urgency scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Routine = 0,
    Urgent = 1,
}

impl Priority {
    pub fn from_urgent(urgent: bool) -> Self {
        if urgent {
            Priority::Urgent
        } else {
            Priority::Routine
        }
    }

    pub fn value(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &str {
        match self {
            Priority::Routine => "ROUTINE",
            Priority::Urgent => "URGENT",
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), RegistrationError> {
    if value.trim().is_empty() {
        return Err(RegistrationError::EmptyField(field));
    }
    Ok(())
}

/// Represents a patient in the booking system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub patient_id: String,
    pub name: String,
    pub contact: String,
}

impl Patient {
    /// Create a new patient with validation.
    pub fn new(patient_id: String, name: String, contact: String) -> Result<Self, RegistrationError> {
        require("patient ID", &patient_id)?;
        require("patient name", &name)?;
        require("patient contact", &contact)?;

        Ok(Patient {
            patient_id,
            name,
            contact,
        })
    }
}

/// A provider together with the calendar it exclusively owns.
#[derive(Debug, Clone)]
pub struct Provider {
    pub provider_id: String,
    pub name: String,
    pub specialty: String,
    pub calendar: SlotCalendar,
}

impl Provider {
    /// Create a new provider with validation.
    pub fn new(
        provider_id: String,
        name: String,
        specialty: String,
        calendar: SlotCalendar,
    ) -> Result<Self, RegistrationError> {
        require("provider ID", &provider_id)?;
        require("provider name", &name)?;
        require("provider specialty", &specialty)?;

        Ok(Provider {
            provider_id,
            name,
            specialty,
            calendar,
        })
    }
}

/// Represents a confirmed appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub appointment_id: Uuid,
    pub instant: SlotTime,
    pub patient_id: String,
    pub provider_id: String,
    pub urgent: bool,
    pub booked_at: DateTime<Local>,
}

impl Appointment {
    pub fn new(instant: SlotTime, patient_id: String, provider_id: String, urgent: bool) -> Self {
        Appointment {
            appointment_id: Uuid::new_v4(),
            instant,
            patient_id,
            provider_id,
            urgent,
            booked_at: Local::now(),
        }
    }

    pub fn priority(&self) -> Priority {
        Priority::from_urgent(self.urgent)
    }

    /// Exact match on patient, provider and instant.
    pub fn matches(&self, patient_id: &str, provider_id: &str, instant: SlotTime) -> bool {
        self.patient_id == patient_id && self.provider_id == provider_id && self.instant == instant
    }
}

/// An urgent booking awaiting handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrgentQueueEntry {
    pub priority: Priority,
    pub instant: SlotTime,
    pub patient_id: String,
    pub provider_id: String,
}

impl PartialOrd for UrgentQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UrgentQueueEntry {
    /// Compare entries for max-heap ordering.
    ///
    /// Higher priority is greater. For equal priorities the earlier instant
    /// is greater, then the lexically smaller patient and provider IDs.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.instant.cmp(&self.instant))
            .then_with(|| other.patient_id.cmp(&self.patient_id))
            .then_with(|| other.provider_id.cmp(&self.provider_id))
    }
}
