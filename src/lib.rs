//! Slot-based appointment booking between patients and providers.
//!
//! Each provider owns a [`calendar::SlotCalendar`] of free instants. The
//! [`ledger::BookingLedger`] confirms bookings against it, and urgent
//! bookings are sequenced by the [`scheduler::UrgencyScheduler`]. The
//! [`service::SchedulingService`] ties them together.

pub mod calendar;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod registry;
pub mod scheduler;
pub mod service;

pub use config::SchedulerConfig;
pub use error::{BookingError, CancelError, LookupError, RegistrationError};
pub use ledger::BookingRequest;
pub use models::{Appointment, Priority, SlotTime, UrgentQueueEntry};
pub use service::{SchedulingService, SharedSchedulingService};
