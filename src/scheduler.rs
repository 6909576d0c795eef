/// Urgent-case sequencing.
///
/// The `UrgencyScheduler` records urgent bookings in a max-priority queue so
/// they can be handled one at a time, independently of ledger order.
use std::collections::BinaryHeap;
use tracing::{debug, info};

use crate::models::{Priority, SlotTime, UrgentQueueEntry};

/// Priority queue of pending urgent bookings.
///
/// Highest priority surfaces first; among equal priorities the earliest
/// instant wins (see `UrgentQueueEntry`'s `Ord`).
#[derive(Debug, Default)]
pub struct UrgencyScheduler {
    queue: BinaryHeap<UrgentQueueEntry>,
}

impl UrgencyScheduler {
    pub fn new() -> Self {
        UrgencyScheduler {
            queue: BinaryHeap::new(),
        }
    }

    /// Add an entry to the queue.
    pub fn push(
        &mut self,
        priority: Priority,
        instant: SlotTime,
        patient_id: String,
        provider_id: String,
    ) {
        debug!(
            "Queued {} case for patient {} with provider {} at {}",
            priority.name(),
            patient_id,
            provider_id,
            instant
        );
        self.queue.push(UrgentQueueEntry {
            priority,
            instant,
            patient_id,
            provider_id,
        });
    }

    /// Remove and return the most urgent, earliest entry.
    pub fn pop_next(&mut self) -> Option<UrgentQueueEntry> {
        self.queue.pop()
    }

    /// Take exactly one entry off the queue and report it as being handled.
    ///
    /// Does not drain: call repeatedly to work through several cases.
    pub fn process_one(&mut self) -> Option<UrgentQueueEntry> {
        let entry = self.pop_next()?;
        info!(
            "Handling urgent case: patient {} with provider {} at {}",
            entry.patient_id, entry.provider_id, entry.instant
        );
        Some(entry)
    }

    pub fn peek(&self) -> Option<&UrgentQueueEntry> {
        self.queue.peek()
    }

    /// Drop every entry for the given booking. Returns how many were removed.
    pub fn purge(&mut self, patient_id: &str, provider_id: &str, instant: SlotTime) -> usize {
        let before = self.queue.len();
        self.queue.retain(|entry| {
            !(entry.patient_id == patient_id
                && entry.provider_id == provider_id
                && entry.instant == instant)
        });
        before - self.queue.len()
    }

    /// Get the number of pending entries in the queue.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Clear all pending entries from the queue.
    pub fn clear(&mut self) -> usize {
        let count = self.queue.len();
        self.queue.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(at: &str) -> SlotTime {
        at.parse().unwrap()
    }

    #[test]
    fn pops_highest_priority_then_earliest() {
        let mut scheduler = UrgencyScheduler::new();
        scheduler.push(Priority::Urgent, slot("2025-05-22 14:00"), "P002".into(), "D001".into());
        scheduler.push(Priority::Routine, slot("2025-05-22 09:00"), "P003".into(), "D001".into());
        scheduler.push(Priority::Urgent, slot("2025-05-22 10:30"), "P001".into(), "D002".into());

        let order: Vec<String> = std::iter::from_fn(|| scheduler.pop_next())
            .map(|e| format!("{} {}", e.patient_id, e.instant))
            .collect();

        assert_eq!(
            order,
            vec![
                "P001 2025-05-22 10:30",
                "P002 2025-05-22 14:00",
                "P003 2025-05-22 09:00"
            ]
        );
    }

    #[test]
    fn process_one_pops_a_single_entry() {
        let mut scheduler = UrgencyScheduler::new();
        scheduler.push(Priority::Urgent, slot("2025-05-22 09:00"), "P001".into(), "D001".into());
        scheduler.push(Priority::Urgent, slot("2025-05-22 09:30"), "P002".into(), "D001".into());

        let handled = scheduler.process_one().unwrap();
        assert_eq!(handled.instant, slot("2025-05-22 09:00"));
        assert_eq!(scheduler.pending_count(), 1);

        scheduler.process_one();
        assert!(scheduler.process_one().is_none());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn purge_removes_only_matching_entries() {
        let mut scheduler = UrgencyScheduler::new();
        scheduler.push(Priority::Urgent, slot("2025-05-22 09:00"), "P001".into(), "D001".into());
        scheduler.push(Priority::Urgent, slot("2025-05-22 09:30"), "P001".into(), "D001".into());

        assert_eq!(scheduler.purge("P001", "D001", slot("2025-05-22 09:00")), 1);
        assert_eq!(scheduler.purge("P001", "D001", slot("2025-05-22 09:00")), 0);
        assert_eq!(scheduler.peek().unwrap().instant, slot("2025-05-22 09:30"));
    }

    #[test]
    fn clear_reports_dropped_count() {
        let mut scheduler = UrgencyScheduler::new();
        scheduler.push(Priority::Urgent, slot("2025-05-22 09:00"), "P001".into(), "D001".into());
        assert_eq!(scheduler.clear(), 1);
        assert!(scheduler.pop_next().is_none());
    }
}
