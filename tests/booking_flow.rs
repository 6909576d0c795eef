use assert_matches::assert_matches;
use std::collections::BTreeSet;
use std::thread;

use slotbook::{
    BookingError, BookingRequest, CancelError, Priority, SchedulerConfig, SchedulingService,
    SharedSchedulingService, SlotTime,
};

// ==============================================================================
// FIXTURES
// ==============================================================================

fn service() -> SchedulingService {
    let mut service = SchedulingService::new(SchedulerConfig::default());
    service.register_patient("P", "Patient P", "p@example.com").unwrap();
    service.register_patient("Q", "Patient Q", "q@example.com").unwrap();
    service.register_provider("D", "Dr. D", "General Practice").unwrap();
    service.register_provider("E", "Dr. E", "Pediatrics").unwrap();
    service
}

fn slot(at: &str) -> SlotTime {
    at.parse().unwrap()
}

fn free_slots(service: &SchedulingService, provider_id: &str) -> BTreeSet<SlotTime> {
    service
        .providers()
        .calendar_of(provider_id)
        .unwrap()
        .list_free()
        .collect()
}

/// Free slots plus booked instants must always equal the initialized range.
fn assert_conserved(service: &SchedulingService, provider_id: &str) {
    let calendar = service.providers().calendar_of(provider_id).unwrap();
    let full: BTreeSet<SlotTime> = calendar.slots_in_range().collect();

    let free = free_slots(service, provider_id);
    let booked: Vec<SlotTime> = service
        .ledger()
        .list_for_provider(provider_id)
        .map(|apt| apt.instant)
        .collect();

    assert!(booked.iter().all(|at| !free.contains(at)), "booked slot still free");
    let mut union = free.clone();
    union.extend(booked.iter().copied());
    assert_eq!(union.len(), free.len() + booked.len(), "duplicate booking");
    assert_eq!(union, full);
}

// ==============================================================================
// SCENARIOS
// ==============================================================================

#[test]
fn end_to_end_book_cancel_rebook_and_process() {
    let mut svc = service();

    let apt = svc
        .book(BookingRequest::new("P", "D", "2025-05-22 09:00", false))
        .unwrap();
    assert_eq!(apt.priority(), Priority::Routine);
    assert!(!free_slots(&svc, "D").contains(&slot("2025-05-22 09:00")));

    assert_matches!(
        svc.book(BookingRequest::new("P", "D", "2025-05-22 09:00", false)),
        Err(BookingError::SlotUnavailable { provider_id, instant })
            if provider_id == "D" && instant == slot("2025-05-22 09:00")
    );

    svc.cancel("P", "D", "2025-05-22 09:00").unwrap();
    assert!(free_slots(&svc, "D").contains(&slot("2025-05-22 09:00")));

    let urgent = svc
        .book(BookingRequest::new("P", "D", "2025-05-22 09:30", true))
        .unwrap();
    assert_eq!(urgent.priority(), Priority::Urgent);
    assert_eq!(svc.pending_urgent(), 1);

    let case = svc.process_next_urgent().unwrap();
    assert_eq!(case.entry.instant, slot("2025-05-22 09:30"));
    assert_eq!(case.entry.patient_id, "P");
    assert_eq!(case.entry.provider_id, "D");
    assert!(svc.process_next_urgent().is_none());
}

#[test]
fn cancel_then_rebook_same_slot_succeeds() {
    let mut svc = service();
    svc.book(BookingRequest::new("P", "D", "2025-05-22 14:00", false)).unwrap();
    svc.cancel("P", "D", "2025-05-22 14:00").unwrap();

    let rebooked = svc
        .book(BookingRequest::new("Q", "D", "2025-05-22 14:00", false))
        .unwrap();
    assert_eq!(rebooked.patient_id, "Q");
    assert_conserved(&svc, "D");
}

#[test]
fn same_instant_with_different_providers_is_independent() {
    let mut svc = service();
    svc.book(BookingRequest::new("P", "D", "2025-05-22 10:00", false)).unwrap();
    svc.book(BookingRequest::new("Q", "E", "2025-05-22 10:00", false)).unwrap();

    assert_conserved(&svc, "D");
    assert_conserved(&svc, "E");
}

#[test]
fn rejected_requests_leave_no_partial_effects() {
    let mut svc = service();
    svc.book(BookingRequest::new("P", "D", "2025-05-22 11:00", true)).unwrap();
    let before = free_slots(&svc, "D");

    assert_matches!(
        svc.book(BookingRequest::new("nobody", "D", "2025-05-22 12:00", true)),
        Err(BookingError::UnknownPatient(_))
    );
    assert_matches!(
        svc.book(BookingRequest::new("P", "nobody", "2025-05-22 12:00", true)),
        Err(BookingError::UnknownProvider(_))
    );
    assert_matches!(
        svc.book(BookingRequest::new("P", "D", "2025-13-40", true)),
        Err(BookingError::InvalidTimeFormat(input)) if input == "2025-13-40"
    );
    assert_matches!(
        svc.book(BookingRequest::new("P", "D", "2025-05-22 17:00", true)),
        Err(BookingError::SlotUnavailable { .. })
    );

    assert_eq!(free_slots(&svc, "D"), before);
    assert_eq!(svc.ledger().len(), 1);
    assert_eq!(svc.pending_urgent(), 1);
}

#[test]
fn cancel_errors() {
    let mut svc = service();
    svc.book(BookingRequest::new("P", "D", "2025-05-22 09:00", false)).unwrap();

    assert_matches!(
        svc.cancel("Q", "D", "2025-05-22 09:00"),
        Err(CancelError::AppointmentNotFound { .. })
    );
    assert_matches!(
        svc.cancel("P", "D", "2025-13-40"),
        Err(CancelError::InvalidTimeFormat(_))
    );
    assert_eq!(svc.ledger().len(), 1);
    assert_conserved(&svc, "D");
}

#[test]
fn slot_conservation_holds_across_mixed_operations() {
    let mut svc = service();
    let times = ["09:00", "10:30", "12:00", "15:30", "16:30"];

    for (i, hm) in times.iter().enumerate() {
        let patient = if i % 2 == 0 { "P" } else { "Q" };
        svc.book(BookingRequest::new(patient, "D", format!("2025-05-22 {hm}"), i % 3 == 0))
            .unwrap();
        assert_conserved(&svc, "D");
    }

    svc.cancel("Q", "D", "2025-05-22 10:30").unwrap();
    assert_conserved(&svc, "D");
    svc.cancel("P", "D", "2025-05-22 16:30").unwrap();
    assert_conserved(&svc, "D");

    assert_eq!(svc.ledger().len(), 3);
    assert_eq!(free_slots(&svc, "D").len(), 13);
}

#[test]
fn urgent_cases_surface_earliest_first_regardless_of_booking_order() {
    let mut svc = service();
    svc.book(BookingRequest::new("P", "D", "2025-05-22 15:00", true)).unwrap();
    svc.book(BookingRequest::new("Q", "E", "2025-05-22 09:30", true)).unwrap();
    svc.book(BookingRequest::new("Q", "D", "2025-05-22 09:00", false)).unwrap();
    svc.book(BookingRequest::new("P", "E", "2025-05-22 12:00", true)).unwrap();

    let handled: Vec<String> = std::iter::from_fn(|| svc.process_next_urgent())
        .map(|case| case.entry.instant.to_string())
        .collect();
    assert_eq!(
        handled,
        vec!["2025-05-22 09:30", "2025-05-22 12:00", "2025-05-22 15:00"]
    );

    let ledger_order: Vec<String> = svc
        .ledger()
        .appointments()
        .iter()
        .map(|apt| apt.instant.to_string())
        .collect();
    assert_eq!(
        ledger_order,
        vec![
            "2025-05-22 15:00",
            "2025-05-22 09:30",
            "2025-05-22 09:00",
            "2025-05-22 12:00"
        ]
    );
}

#[test]
fn concurrent_bookings_for_one_slot_have_a_single_winner() {
    let shared = SharedSchedulingService::new(service());
    for i in 0..8 {
        shared
            .register_patient(&format!("T{i}"), "Tester", "t@example.com")
            .unwrap();
    }

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let shared = shared.clone();
            thread::spawn(move || {
                shared.book(BookingRequest::new(format!("T{i}"), "D", "2025-05-22 13:00", true))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, BookingError::SlotUnavailable { .. })));

    shared.with(|svc| {
        assert_eq!(svc.ledger().len(), 1);
        assert_eq!(svc.pending_urgent(), 1);
        assert_conserved(svc, "D");
    });
}
