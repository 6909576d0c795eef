/// Identity registries read by the booking core.
use std::collections::HashMap;
use tracing::info;

use crate::calendar::SlotCalendar;
use crate::error::RegistrationError;
use crate::models::{Patient, Provider};

#[derive(Debug, Default)]
pub struct PatientRegistry {
    patients: HashMap<String, Patient>,
}

impl PatientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a patient under an unused ID.
    pub fn register(&mut self, patient: Patient) -> Result<&Patient, RegistrationError> {
        if self.patients.contains_key(&patient.patient_id) {
            return Err(RegistrationError::DuplicateId(patient.patient_id));
        }
        info!("Registered patient {} ({})", patient.name, patient.patient_id);

        let id = patient.patient_id.clone();
        Ok(self.patients.entry(id).or_insert(patient))
    }

    pub fn exists(&self, patient_id: &str) -> bool {
        self.patients.contains_key(patient_id)
    }

    pub fn get(&self, patient_id: &str) -> Option<&Patient> {
        self.patients.get(patient_id)
    }

    pub fn name_of(&self, patient_id: &str) -> Option<&str> {
        self.get(patient_id).map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Provider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under an unused ID.
    pub fn register(&mut self, provider: Provider) -> Result<&Provider, RegistrationError> {
        if self.providers.contains_key(&provider.provider_id) {
            return Err(RegistrationError::DuplicateId(provider.provider_id));
        }
        info!(
            "Registered provider {} ({}, {})",
            provider.name, provider.provider_id, provider.specialty
        );

        let id = provider.provider_id.clone();
        Ok(self.providers.entry(id).or_insert(provider))
    }

    pub fn exists(&self, provider_id: &str) -> bool {
        self.providers.contains_key(provider_id)
    }

    pub fn get(&self, provider_id: &str) -> Option<&Provider> {
        self.providers.get(provider_id)
    }

    pub fn name_of(&self, provider_id: &str) -> Option<&str> {
        self.get(provider_id).map(|p| p.name.as_str())
    }

    pub fn calendar_of(&self, provider_id: &str) -> Option<&SlotCalendar> {
        self.get(provider_id).map(|p| &p.calendar)
    }

    pub fn calendar_of_mut(&mut self, provider_id: &str) -> Option<&mut SlotCalendar> {
        self.providers.get_mut(provider_id).map(|p| &mut p.calendar)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
