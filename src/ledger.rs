/// The authoritative record of confirmed appointments.
///
/// The ledger is the only place slot state changes: booking reserves a slot
/// in the provider's calendar and cancellation releases it.
use tracing::{debug, info, warn};

use crate::error::{BookingError, CancelError};
use crate::models::{Appointment, SlotTime};
use crate::registry::{PatientRegistry, ProviderRegistry};
use crate::scheduler::UrgencyScheduler;

/// A request to book one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub patient_id: String,
    pub provider_id: String,
    /// Literal in `YYYY-MM-DD HH:MM` form; parsed during validation.
    pub instant: String,
    pub urgent: bool,
}

impl BookingRequest {
    pub fn new(
        patient_id: impl Into<String>,
        provider_id: impl Into<String>,
        instant: impl Into<String>,
        urgent: bool,
    ) -> Self {
        BookingRequest {
            patient_id: patient_id.into(),
            provider_id: provider_id.into(),
            instant: instant.into(),
            urgent,
        }
    }
}

/// Insertion-ordered collection of confirmed appointments.
#[derive(Debug, Default)]
pub struct BookingLedger {
    appointments: Vec<Appointment>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and confirm a booking.
    ///
    /// Checks run in order (patient, provider, time format, slot) and the
    /// first failure is returned with no state touched. Urgent bookings are
    /// also forwarded to `urgent_queue`.
    pub fn book(
        &mut self,
        patients: &PatientRegistry,
        providers: &mut ProviderRegistry,
        urgent_queue: &mut UrgencyScheduler,
        request: BookingRequest,
    ) -> Result<Appointment, BookingError> {
        debug!(
            "Booking request: patient {} provider {} at '{}' (urgent: {})",
            request.patient_id, request.provider_id, request.instant, request.urgent
        );

        if !patients.exists(&request.patient_id) {
            warn!("Rejected booking: unknown patient {}", request.patient_id);
            return Err(BookingError::UnknownPatient(request.patient_id));
        }

        let calendar = match providers.calendar_of_mut(&request.provider_id) {
            Some(calendar) => calendar,
            None => {
                warn!("Rejected booking: unknown provider {}", request.provider_id);
                return Err(BookingError::UnknownProvider(request.provider_id));
            }
        };

        let instant: SlotTime = request.instant.parse().map_err(|err| {
            warn!("Rejected booking: {}", err);
            BookingError::from(err)
        })?;

        if !calendar.is_free(instant) {
            warn!(
                "Rejected booking: slot {} unavailable for provider {}",
                instant, request.provider_id
            );
            return Err(BookingError::SlotUnavailable {
                provider_id: request.provider_id,
                instant,
            });
        }

        calendar.reserve(instant);
        let appointment = Appointment::new(
            instant,
            request.patient_id,
            request.provider_id,
            request.urgent,
        );
        self.appointments.push(appointment.clone());

        if appointment.urgent {
            urgent_queue.push(
                appointment.priority(),
                appointment.instant,
                appointment.patient_id.clone(),
                appointment.provider_id.clone(),
            );
        }

        info!(
            "Booked {} for patient {} with provider {} at {}",
            appointment.priority().name(),
            appointment.patient_id,
            appointment.provider_id,
            appointment.instant
        );
        Ok(appointment)
    }

    /// Remove the appointment matching all three fields and free its slot.
    ///
    /// The urgency queue is left untouched; see `SchedulingService::cancel`
    /// for the optional purge.
    pub fn cancel(
        &mut self,
        providers: &mut ProviderRegistry,
        patient_id: &str,
        provider_id: &str,
        instant: &str,
    ) -> Result<Appointment, CancelError> {
        let instant: SlotTime = instant.parse()?;

        let position = self
            .appointments
            .iter()
            .position(|apt| apt.matches(patient_id, provider_id, instant))
            .ok_or_else(|| {
                warn!(
                    "Cancellation target not found: patient {} provider {} at {}",
                    patient_id, provider_id, instant
                );
                CancelError::AppointmentNotFound {
                    patient_id: patient_id.to_string(),
                    provider_id: provider_id.to_string(),
                    instant,
                }
            })?;

        let appointment = self.appointments.remove(position);
        if let Some(calendar) = providers.calendar_of_mut(provider_id) {
            calendar.release(instant);
        }

        info!(
            "Cancelled appointment for patient {} with provider {} at {}",
            patient_id, provider_id, instant
        );
        Ok(appointment)
    }

    /// Appointments for one provider, in booking order.
    pub fn list_for_provider<'a>(
        &'a self,
        provider_id: &'a str,
    ) -> impl Iterator<Item = &'a Appointment> + 'a {
        self.appointments
            .iter()
            .filter(move |apt| apt.provider_id == provider_id)
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }
}
