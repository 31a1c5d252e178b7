use chrono::{DateTime, Utc};
use uuid::Uuid;

use shared_models::scheduling::Appointment;

/// Half-open overlap test: `[a_start, a_end)` against `[b_start, b_end)`.
/// Touching endpoints do not overlap.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Whether a candidate interval conflicts with any `Scheduled` appointment
/// in `existing`. Canceled and completed appointments never block, and
/// `exclude` lets a reschedule ignore the appointment being moved.
pub fn conflicts_with_any(
    candidate_start: DateTime<Utc>,
    candidate_end: DateTime<Utc>,
    existing: &[Appointment],
    exclude: Option<Uuid>,
) -> bool {
    existing.iter().any(|appointment| {
        if Some(appointment.id) == exclude {
            return false;
        }
        appointment.is_scheduled()
            && intervals_overlap(
                candidate_start,
                candidate_end,
                appointment.start_time,
                appointment.end_time,
            )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared_models::scheduling::AppointmentStatus;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 11, hour, minute, 0).unwrap()
    }

    fn appointment(start: DateTime<Utc>, end: DateTime<Utc>, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            doctor_id: "doc-1".to_string(),
            patient_id: "patient-1".to_string(),
            created_by: "reception-1".to_string(),
            start_time: start,
            end_time: end,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn touching_endpoints_do_not_overlap() {
        let existing = vec![appointment(at(10, 30), at(11, 0), AppointmentStatus::Scheduled)];
        assert!(!conflicts_with_any(at(10, 0), at(10, 30), &existing, None));
    }

    #[test]
    fn one_minute_past_the_boundary_overlaps() {
        let existing = vec![appointment(at(10, 30), at(11, 0), AppointmentStatus::Scheduled)];
        assert!(conflicts_with_any(at(10, 0), at(10, 31), &existing, None));
    }

    #[test]
    fn containment_overlaps() {
        let existing = vec![appointment(at(9, 30), at(10, 0), AppointmentStatus::Scheduled)];
        assert!(conflicts_with_any(at(9, 0), at(11, 0), &existing, None));
    }

    #[test]
    fn overlap_is_symmetric() {
        assert_eq!(
            intervals_overlap(at(9, 0), at(9, 45), at(9, 30), at(10, 0)),
            intervals_overlap(at(9, 30), at(10, 0), at(9, 0), at(9, 45)),
        );
    }

    #[test]
    fn canceled_and_completed_never_block() {
        let existing = vec![
            appointment(at(10, 0), at(10, 30), AppointmentStatus::Canceled),
            appointment(at(10, 0), at(10, 30), AppointmentStatus::Completed),
        ];
        assert!(!conflicts_with_any(at(10, 0), at(10, 30), &existing, None));
    }

    #[test]
    fn excluded_appointment_is_ignored() {
        let blocker = appointment(at(10, 0), at(10, 30), AppointmentStatus::Scheduled);
        let id = blocker.id;
        let existing = vec![blocker];
        assert!(conflicts_with_any(at(10, 0), at(10, 30), &existing, None));
        assert!(!conflicts_with_any(at(10, 0), at(10, 30), &existing, Some(id)));
    }
}
