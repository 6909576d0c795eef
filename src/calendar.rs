/// Slot tracking for a single provider.
///
/// A `SlotCalendar` holds the set of instants that are still bookable. An
/// instant is a member if and only if no confirmed appointment occupies it.
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::CalendarError;
use crate::models::SlotTime;

#[derive(Debug, Clone)]
pub struct SlotCalendar {
    day: NaiveDate,
    start_hour: u32,
    end_hour: u32,
    slot_minutes: u32,
    free: BTreeSet<SlotTime>,
}

impl SlotCalendar {
    /// Build a calendar with every instant in `[start_hour, end_hour)` on
    /// `day`, stepped by `slot_minutes`.
    pub fn initialize(
        day: NaiveDate,
        start_hour: u32,
        end_hour: u32,
        slot_minutes: u32,
    ) -> Result<Self, CalendarError> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(CalendarError::InvalidHours {
                start: start_hour,
                end: end_hour,
            });
        }
        if slot_minutes == 0 {
            return Err(CalendarError::InvalidGranularity(slot_minutes));
        }

        let mut calendar = SlotCalendar {
            day,
            start_hour,
            end_hour,
            slot_minutes,
            free: BTreeSet::new(),
        };
        calendar.free = calendar.slots_in_range().collect();

        debug!(
            "Initialized calendar for {} with {} slots",
            day,
            calendar.free.len()
        );
        Ok(calendar)
    }

    fn hour_on_day(&self, hour: u32) -> NaiveDateTime {
        self.day.and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour))
    }

    /// Every instant the calendar was initialized with, booked or not.
    pub fn slots_in_range(&self) -> impl Iterator<Item = SlotTime> {
        let step = Duration::minutes(i64::from(self.slot_minutes));
        let end = self.hour_on_day(self.end_hour);
        let mut current = self.hour_on_day(self.start_hour);

        std::iter::from_fn(move || {
            if current >= end {
                return None;
            }
            let slot = SlotTime::new(current);
            current += step;
            Some(slot)
        })
    }

    /// Whether `instant` lies on the initialized grid.
    pub fn in_range(&self, instant: SlotTime) -> bool {
        self.slots_in_range().any(|slot| slot == instant)
    }

    pub fn is_free(&self, instant: SlotTime) -> bool {
        self.free.contains(&instant)
    }

    /// Remove `instant` from the free set. Callers check `is_free` first;
    /// returns false if the instant was not free.
    pub fn reserve(&mut self, instant: SlotTime) -> bool {
        let removed = self.free.remove(&instant);
        debug_assert!(removed, "reserve called on occupied slot {instant}");
        debug!("Reserved slot {}", instant);
        removed
    }

    /// Put `instant` back into the free set. Releasing a free instant is a
    /// no-op; returns whether the set changed.
    pub fn release(&mut self, instant: SlotTime) -> bool {
        let added = self.free.insert(instant);
        debug!("Released slot {} (changed: {})", instant, added);
        added
    }

    /// Free instants in ascending order.
    pub fn list_free(&self) -> impl Iterator<Item = SlotTime> + '_ {
        self.free.iter().copied()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}

impl std::fmt::Display for SlotCalendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SlotCalendar({}, {:02}:00-{:02}:00 every {}m, free={})",
            self.day,
            self.start_hour,
            self.end_hour,
            self.slot_minutes,
            self.free.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 22).unwrap()
    }

    fn slot(at: &str) -> SlotTime {
        at.parse().unwrap()
    }

    #[test]
    fn initialize_covers_business_hours() {
        let calendar = SlotCalendar::initialize(day(), 9, 17, 30).unwrap();
        let free: Vec<String> = calendar.list_free().map(|s| s.to_string()).collect();

        assert_eq!(free.len(), 16);
        assert_eq!(free.first().unwrap(), "2025-05-22 09:00");
        assert_eq!(free.last().unwrap(), "2025-05-22 16:30");
        assert!(!calendar.is_free(slot("2025-05-22 17:00")));
    }

    #[test]
    fn initialize_rejects_bad_ranges() {
        assert_eq!(
            SlotCalendar::initialize(day(), 17, 9, 30).unwrap_err(),
            CalendarError::InvalidHours { start: 17, end: 9 }
        );
        assert_eq!(
            SlotCalendar::initialize(day(), 9, 17, 0).unwrap_err(),
            CalendarError::InvalidGranularity(0)
        );
    }

    #[test]
    fn end_of_day_is_allowed() {
        let calendar = SlotCalendar::initialize(day(), 23, 24, 15).unwrap();
        assert_eq!(calendar.free_count(), 4);
        assert!(calendar.is_free(slot("2025-05-22 23:45")));
    }

    #[test]
    fn reserve_and_release_round_trip() {
        let mut calendar = SlotCalendar::initialize(day(), 9, 17, 30).unwrap();
        let at = slot("2025-05-22 10:00");

        assert!(calendar.reserve(at));
        assert!(!calendar.is_free(at));
        assert_eq!(calendar.free_count(), 15);

        assert!(calendar.release(at));
        assert!(!calendar.release(at));
        assert!(calendar.is_free(at));
        assert_eq!(calendar.free_count(), 16);
    }

    #[test]
    fn list_free_is_sorted_and_restartable() {
        let mut calendar = SlotCalendar::initialize(day(), 9, 11, 30).unwrap();
        calendar.reserve(slot("2025-05-22 09:30"));

        let first: Vec<SlotTime> = calendar.list_free().collect();
        let second: Vec<SlotTime> = calendar.list_free().collect();
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                slot("2025-05-22 09:00"),
                slot("2025-05-22 10:00"),
                slot("2025-05-22 10:30")
            ]
        );
    }

    #[test]
    fn in_range_tracks_the_grid_not_occupancy() {
        let mut calendar = SlotCalendar::initialize(day(), 9, 17, 30).unwrap();
        let at = slot("2025-05-22 09:00");
        calendar.reserve(at);

        assert!(calendar.in_range(at));
        assert!(!calendar.in_range(slot("2025-05-22 09:15")));
        assert!(!calendar.in_range(slot("2025-05-23 09:00")));
    }
}
