/// The scheduling service: one owner for the registries, the ledger and the
/// urgency queue, constructed once at start-up.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use crate::config::SchedulerConfig;
use crate::error::{BookingError, CancelError, LookupError, RegistrationError};
use crate::ledger::{BookingLedger, BookingRequest};
use crate::models::{Appointment, Patient, Provider, SlotTime, UrgentQueueEntry};
use crate::registry::{PatientRegistry, ProviderRegistry};
use crate::scheduler::UrgencyScheduler;

/// One row of a provider's booked schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledAppointment {
    pub instant: SlotTime,
    pub patient_id: String,
    pub patient_name: String,
    pub urgent: bool,
}

/// Snapshot of a provider's free slots and confirmed appointments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSchedule {
    pub provider_id: String,
    pub provider_name: String,
    /// Ascending.
    pub free_slots: Vec<SlotTime>,
    /// Ledger insertion order.
    pub appointments: Vec<ScheduledAppointment>,
}

/// An urgent case taken off the queue, with display names resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrgentCase {
    pub entry: UrgentQueueEntry,
    pub patient_name: String,
    pub provider_name: String,
}

#[derive(Debug)]
pub struct SchedulingService {
    config: SchedulerConfig,
    patients: PatientRegistry,
    providers: ProviderRegistry,
    ledger: BookingLedger,
    urgent: UrgencyScheduler,
}

impl Default for SchedulingService {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl SchedulingService {
    pub fn new(config: SchedulerConfig) -> Self {
        SchedulingService {
            config,
            patients: PatientRegistry::new(),
            providers: ProviderRegistry::new(),
            ledger: BookingLedger::new(),
            urgent: UrgencyScheduler::new(),
        }
    }

    pub fn register_patient(
        &mut self,
        patient_id: &str,
        name: &str,
        contact: &str,
    ) -> Result<&Patient, RegistrationError> {
        let patient = Patient::new(patient_id.to_string(), name.to_string(), contact.to_string())?;
        self.patients.register(patient)
    }

    /// Register a provider; its calendar is initialized from the config.
    pub fn register_provider(
        &mut self,
        provider_id: &str,
        name: &str,
        specialty: &str,
    ) -> Result<&Provider, RegistrationError> {
        let calendar = self.config.new_calendar()?;
        let provider = Provider::new(
            provider_id.to_string(),
            name.to_string(),
            specialty.to_string(),
            calendar,
        )?;
        self.providers.register(provider)
    }

    pub fn book(&mut self, request: BookingRequest) -> Result<Appointment, BookingError> {
        self.ledger
            .book(&self.patients, &mut self.providers, &mut self.urgent, request)
    }

    /// Cancel a confirmed booking.
    ///
    /// Stale urgent-queue entries are kept unless `purge_urgent_on_cancel`
    /// is configured.
    pub fn cancel(
        &mut self,
        patient_id: &str,
        provider_id: &str,
        instant: &str,
    ) -> Result<(), CancelError> {
        let removed = self
            .ledger
            .cancel(&mut self.providers, patient_id, provider_id, instant)?;

        if self.config.purge_urgent_on_cancel && removed.urgent {
            let purged = self
                .urgent
                .purge(&removed.patient_id, &removed.provider_id, removed.instant);
            debug!("Purged {} urgent entries for cancelled booking", purged);
        }
        Ok(())
    }

    pub fn provider_schedule(&self, provider_id: &str) -> Result<ProviderSchedule, LookupError> {
        let provider = self
            .providers
            .get(provider_id)
            .ok_or_else(|| LookupError::UnknownProvider(provider_id.to_string()))?;

        let appointments = self
            .ledger
            .list_for_provider(provider_id)
            .map(|apt| ScheduledAppointment {
                instant: apt.instant,
                patient_id: apt.patient_id.clone(),
                patient_name: self
                    .patients
                    .name_of(&apt.patient_id)
                    .unwrap_or(&apt.patient_id)
                    .to_string(),
                urgent: apt.urgent,
            })
            .collect();

        Ok(ProviderSchedule {
            provider_id: provider.provider_id.clone(),
            provider_name: provider.name.clone(),
            free_slots: provider.calendar.list_free().collect(),
            appointments,
        })
    }

    /// Handle the single most urgent pending case.
    pub fn process_next_urgent(&mut self) -> Option<UrgentCase> {
        let entry = self.urgent.process_one()?;
        let patient_name = self
            .patients
            .name_of(&entry.patient_id)
            .unwrap_or(&entry.patient_id)
            .to_string();
        let provider_name = self
            .providers
            .name_of(&entry.provider_id)
            .unwrap_or(&entry.provider_id)
            .to_string();

        Some(UrgentCase {
            entry,
            patient_name,
            provider_name,
        })
    }

    pub fn pending_urgent(&self) -> usize {
        self.urgent.pending_count()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn patients(&self) -> &PatientRegistry {
        &self.patients
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn ledger(&self) -> &BookingLedger {
        &self.ledger
    }
}

/// Cloneable, thread-safe handle to a `SchedulingService`.
///
/// Every operation takes the single lock, so concurrent requests for the
/// same provider and instant are serialized.
#[derive(Debug, Clone, Default)]
pub struct SharedSchedulingService {
    inner: Arc<Mutex<SchedulingService>>,
}

impl SharedSchedulingService {
    pub fn new(service: SchedulingService) -> Self {
        info!("Starting shared scheduling service");
        SharedSchedulingService {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SchedulingService> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register_patient(&self, patient_id: &str, name: &str, contact: &str) -> Result<(), RegistrationError> {
        self.lock().register_patient(patient_id, name, contact).map(|_| ())
    }

    pub fn register_provider(&self, provider_id: &str, name: &str, specialty: &str) -> Result<(), RegistrationError> {
        self.lock().register_provider(provider_id, name, specialty).map(|_| ())
    }

    pub fn book(&self, request: BookingRequest) -> Result<Appointment, BookingError> {
        self.lock().book(request)
    }

    pub fn cancel(&self, patient_id: &str, provider_id: &str, instant: &str) -> Result<(), CancelError> {
        self.lock().cancel(patient_id, provider_id, instant)
    }

    pub fn provider_schedule(&self, provider_id: &str) -> Result<ProviderSchedule, LookupError> {
        self.lock().provider_schedule(provider_id)
    }

    pub fn process_next_urgent(&self) -> Option<UrgentCase> {
        self.lock().process_next_urgent()
    }

    /// Run `f` with exclusive access to the service.
    pub fn with<R>(&self, f: impl FnOnce(&mut SchedulingService) -> R) -> R {
        f(&mut self.lock())
    }
}
