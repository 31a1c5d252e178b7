use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime};
use tracing::debug;

use shared_models::scheduling::{DayOfWeek, DoctorAvailability};
use shared_store::AppState;

use crate::models::{AppointmentError, DoctorSlotStatus, DoctorSlots};
use crate::services::booking::{day_window_utc, day_start_utc};
use crate::services::conflict::{conflicts_with_any, intervals_overlap};
use crate::services::slots::{generate_slots, Slot};

/// No working window spans more than a day, so no slot interval should.
const MAX_SLOT_INTERVAL_MINUTES: i64 = 24 * 60;

/// Read-side slot discovery. Works from the same availability windows and
/// overlap rules as the booking engine, but never takes the booking lease;
/// results are a snapshot and booking revalidates on write.
pub struct DiscoveryService {
    state: Arc<AppState>,
}

impl DiscoveryService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Free slots on a civil date, either for one doctor or across the
    /// whole clinic. A doctor with no window on that weekday contributes
    /// an empty slot list rather than an error.
    pub async fn free_slots(
        &self,
        date: NaiveDate,
        doctor_id: Option<String>,
        interval_minutes: Option<i64>,
    ) -> Result<Vec<DoctorSlots>, AppointmentError> {
        let interval = interval_minutes.unwrap_or(self.state.config.slot_interval_minutes);
        if interval <= 0 || interval > MAX_SLOT_INTERVAL_MINUTES {
            return Err(AppointmentError::Validation(format!(
                "interval_minutes must be between 1 and {}",
                MAX_SLOT_INTERVAL_MINUTES
            )));
        }

        let records = match doctor_id {
            Some(id) => {
                let record = self
                    .state
                    .store
                    .availability(&id)
                    .await?
                    .ok_or(AppointmentError::AvailabilityNotSet)?;
                vec![record]
            }
            None => self.state.store.all_availability().await?,
        };

        let day = DayOfWeek::from_weekday(date.weekday());

        let mut results = Vec::with_capacity(records.len());
        for record in records {
            let slots = self.free_slots_for(&record, date, day, interval).await?;
            results.push(DoctorSlots {
                doctor_id: record.doctor_id,
                available_slots: slots,
            });
        }
        Ok(results)
    }

    async fn free_slots_for(
        &self,
        record: &DoctorAvailability,
        date: NaiveDate,
        day: DayOfWeek,
        interval: i64,
    ) -> Result<Vec<Slot>, AppointmentError> {
        let Some(window) = record.window_for(day) else {
            debug!("Doctor {} has no window on {}", record.doctor_id, day);
            return Ok(Vec::new());
        };

        let tz = self.state.config.clinic_timezone();
        let (window_start, window_end) = day_window_utc(tz, date, window)?;

        let booked = self
            .state
            .store
            .scheduled_for_doctor(&record.doctor_id)
            .await?;

        let slots = generate_slots(window_start, window_end, interval)
            .into_iter()
            .filter(|slot| !conflicts_with_any(slot.start_time, slot.end_time, &booked, None))
            .collect();
        Ok(slots)
    }

    /// For a civil date and time range, report each doctor whose window on
    /// that weekday contains the whole range, flagged `Available` or
    /// `Booked` by whether a scheduled appointment overlaps it. Doctors
    /// without a window on that weekday are omitted.
    pub async fn doctors_free_for_range(
        &self,
        date: NaiveDate,
        range_start: NaiveTime,
        range_end: NaiveTime,
    ) -> Result<Vec<DoctorSlotStatus>, AppointmentError> {
        if range_start >= range_end {
            return Err(AppointmentError::Validation(
                "start_time must be before end_time".to_string(),
            ));
        }

        let tz = self.state.config.clinic_timezone();
        let day = DayOfWeek::from_weekday(date.weekday());
        let start = day_start_utc(tz, date)? + (range_start - NaiveTime::MIN);
        let end = day_start_utc(tz, date)? + (range_end - NaiveTime::MIN);

        let mut statuses = Vec::new();
        for record in self.state.store.all_availability().await? {
            let Some(window) = record.window_for(day) else {
                continue;
            };
            if range_start < window.start_time || range_end > window.end_time {
                continue;
            }

            let booked = self
                .state
                .store
                .scheduled_for_doctor(&record.doctor_id)
                .await?;
            let taken = booked
                .iter()
                .any(|a| intervals_overlap(start, end, a.start_time, a.end_time));

            statuses.push(DoctorSlotStatus {
                doctor_id: record.doctor_id,
                available: !taken,
                slot_status: if taken { "Booked" } else { "Available" }.to_string(),
            });
        }
        Ok(statuses)
    }
}
