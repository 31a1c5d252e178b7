use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Generate the ordered sequence of fixed-length candidate slots inside a
/// working window. Slots are back-to-back starting at `window_start`; a
/// slot is emitted only when it fits entirely, so a trailing partial slot
/// is dropped rather than truncated. Empty when the window is empty,
/// inverted, or the interval is non-positive.
pub fn generate_slots(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    interval_minutes: i64,
) -> Vec<Slot> {
    if interval_minutes <= 0 || window_end <= window_start {
        return Vec::new();
    }

    // try_minutes guards against intervals too large for a Duration.
    let Some(interval) = Duration::try_minutes(interval_minutes) else {
        return Vec::new();
    };
    let mut slots = Vec::new();
    let mut current = window_start;

    while current + interval <= window_end {
        slots.push(Slot {
            start_time: current,
            end_time: current + interval,
        });
        current += interval;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 11, hour, minute, 0).unwrap()
    }

    #[test]
    fn trailing_partial_slot_is_dropped() {
        let slots = generate_slots(at(9, 0), at(10, 5), 30);
        assert_eq!(
            slots,
            vec![
                Slot { start_time: at(9, 0), end_time: at(9, 30) },
                Slot { start_time: at(9, 30), end_time: at(10, 0) },
            ]
        );
    }

    #[test]
    fn exact_fit_emits_every_slot() {
        let slots = generate_slots(at(9, 0), at(12, 0), 30);
        assert_eq!(slots.len(), 6);
        assert_eq!(slots[5].end_time, at(12, 0));
    }

    #[test]
    fn slots_are_back_to_back_and_ordered() {
        let slots = generate_slots(at(9, 0), at(11, 0), 20);
        for pair in slots.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
        }
    }

    #[test]
    fn empty_or_inverted_window_yields_nothing() {
        assert!(generate_slots(at(10, 0), at(10, 0), 30).is_empty());
        assert!(generate_slots(at(11, 0), at(10, 0), 30).is_empty());
    }

    #[test]
    fn non_positive_interval_yields_nothing() {
        assert!(generate_slots(at(9, 0), at(17, 0), 0).is_empty());
        assert!(generate_slots(at(9, 0), at(17, 0), -30).is_empty());
    }

    #[test]
    fn interval_too_large_for_a_duration_yields_nothing() {
        assert!(generate_slots(at(9, 0), at(12, 0), i64::MAX).is_empty());
    }

    #[test]
    fn window_shorter_than_interval_yields_nothing() {
        assert!(generate_slots(at(9, 0), at(9, 20), 30).is_empty());
    }
}
