use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::scheduling::{Appointment, AppointmentStatus, DayAvailability, DayOfWeek};
use shared_store::{AppointmentFilter, AppState};

use crate::models::{
    AppointmentError, AppointmentQueryParams, BookAppointmentRequest,
    RescheduleAppointmentRequest,
};
use crate::services::conflict::conflicts_with_any;
use crate::services::lifecycle::AppointmentLifecycleService;

/// The single booking engine behind every actor path. Receptionist,
/// doctor, and patient flows all shape parameters and permissions around
/// these operations; none re-implements the availability or overlap rules.
pub struct BookingEngine {
    state: Arc<AppState>,
    lifecycle: AppointmentLifecycleService,
}

impl BookingEngine {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    fn clinic_tz(&self) -> FixedOffset {
        self.state.config.clinic_timezone()
    }

    /// Book a new appointment. The availability check, overlap check, and
    /// insert all run while holding the doctor's booking lease, so among
    /// concurrently racing bookings for one doctor at most one wins.
    pub async fn book(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        validate_ids(&[
            ("doctor_id", &request.doctor_id),
            ("patient_id", &request.patient_id),
            ("created_by", &request.created_by),
        ])?;
        validate_interval(request.start_time, request.end_time)?;

        debug!(
            "Booking appointment for patient {} with doctor {} at {}",
            request.patient_id, request.doctor_id, request.start_time
        );

        let _lease = self.state.store.lock_doctor(&request.doctor_id).await?;

        self.check_within_available_hours(&request.doctor_id, request.start_time, request.end_time)
            .await?;

        let existing = self.state.store.scheduled_for_doctor(&request.doctor_id).await?;
        if conflicts_with_any(request.start_time, request.end_time, &existing, None) {
            warn!(
                "Booking conflict for doctor {} at {}",
                request.doctor_id, request.start_time
            );
            return Err(AppointmentError::DoctorAlreadyBooked);
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id: request.doctor_id,
            patient_id: request.patient_id,
            created_by: request.created_by,
            start_time: request.start_time,
            end_time: request.end_time,
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };

        self.state.store.insert_appointment(appointment.clone()).await?;

        info!(
            "Appointment {} booked for doctor {}",
            appointment.id, appointment.doctor_id
        );
        Ok(appointment)
    }

    /// Cancel an appointment. Patients may only cancel their own; any
    /// other role may cancel on a patient's behalf.
    pub async fn cancel(&self, id: Uuid, actor: &User) -> Result<Appointment, AppointmentError> {
        let found = self
            .state
            .store
            .appointment(id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        if actor.is_patient() && actor.id != found.patient_id {
            return Err(AppointmentError::NotOwner);
        }

        // Status writes serialize on the same lease as bookings so a
        // racing reschedule cannot resurrect a canceled appointment.
        let _lease = self.state.store.lock_doctor(&found.doctor_id).await?;
        let mut appointment = self
            .state
            .store
            .appointment(id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        self.lifecycle
            .validate_transition(appointment.status, AppointmentStatus::Canceled)?;

        appointment.status = AppointmentStatus::Canceled;
        appointment.updated_at = Utc::now();
        self.persist_update(&appointment).await?;

        info!("Appointment {} canceled", id);
        Ok(appointment)
    }

    pub async fn complete(&self, id: Uuid) -> Result<Appointment, AppointmentError> {
        let found = self
            .state
            .store
            .appointment(id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        let _lease = self.state.store.lock_doctor(&found.doctor_id).await?;
        let mut appointment = self
            .state
            .store
            .appointment(id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        self.lifecycle
            .validate_transition(appointment.status, AppointmentStatus::Completed)?;

        appointment.status = AppointmentStatus::Completed;
        appointment.updated_at = Utc::now();
        self.persist_update(&appointment).await?;

        info!("Appointment {} completed", id);
        Ok(appointment)
    }

    /// Reschedule a `Scheduled` appointment onto a new interval. The new
    /// interval passes the same pipeline as booking, with the overlap
    /// check excluding the appointment being moved so rescheduling onto
    /// its own slot never self-conflicts. Status is untouched.
    pub async fn reschedule(
        &self,
        id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        validate_interval(request.new_start_time, request.new_end_time)?;

        let found = self
            .state
            .store
            .appointment(id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        let _lease = self.state.store.lock_doctor(&found.doctor_id).await?;
        let mut appointment = self
            .state
            .store
            .appointment(id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        self.lifecycle
            .validate_transition(appointment.status, AppointmentStatus::Scheduled)?;

        self.check_within_available_hours(
            &appointment.doctor_id,
            request.new_start_time,
            request.new_end_time,
        )
        .await?;

        let existing = self
            .state
            .store
            .scheduled_for_doctor(&appointment.doctor_id)
            .await?;
        if conflicts_with_any(
            request.new_start_time,
            request.new_end_time,
            &existing,
            Some(id),
        ) {
            return Err(AppointmentError::DoctorAlreadyBooked);
        }

        appointment.start_time = request.new_start_time;
        appointment.end_time = request.new_end_time;
        appointment.updated_at = Utc::now();
        self.persist_update(&appointment).await?;

        info!("Appointment {} rescheduled to {}", id, appointment.start_time);
        Ok(appointment)
    }

    pub async fn get(&self, id: Uuid) -> Result<Appointment, AppointmentError> {
        self.state
            .store
            .appointment(id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    /// Range query over appointments. Dates are civil dates in the clinic
    /// timezone; each expands to its full day.
    pub async fn search(
        &self,
        params: AppointmentQueryParams,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let tz = self.clinic_tz();

        let from = params
            .start_date
            .map(|date| day_start_utc(tz, date))
            .transpose()?;
        let to = params
            .end_date
            .map(|date| day_start_utc(tz, date).map(|start| start + Duration::days(1) - Duration::milliseconds(1)))
            .transpose()?;

        let filter = AppointmentFilter {
            doctor_id: params.doctor_id,
            patient_id: params.patient_id,
            status: params.status,
            from,
            to,
        };

        Ok(self.state.store.search(&filter).await?)
    }

    /// Today's `Scheduled` appointments, with "today" resolved through the
    /// injected clock in the clinic timezone.
    pub async fn today(&self) -> Result<Vec<Appointment>, AppointmentError> {
        let tz = self.clinic_tz();
        let today = self.state.clock.now_utc().with_timezone(&tz).date_naive();
        let from = day_start_utc(tz, today)?;
        let to = from + Duration::days(1) - Duration::milliseconds(1);

        let filter = AppointmentFilter {
            status: Some(AppointmentStatus::Scheduled),
            from: Some(from),
            to: Some(to),
            ..Default::default()
        };
        Ok(self.state.store.search(&filter).await?)
    }

    /// A doctor's upcoming book: every `Scheduled` appointment.
    pub async fn doctor_appointments(
        &self,
        doctor_id: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.state.store.scheduled_for_doctor(doctor_id).await?)
    }

    /// A patient's full appointment history, all statuses.
    pub async fn patient_history(
        &self,
        patient_id: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let filter = AppointmentFilter {
            patient_id: Some(patient_id.to_string()),
            ..Default::default()
        };
        Ok(self.state.store.search(&filter).await?)
    }

    /// Steps 2-6 of the booking pipeline: resolve the civil weekday of the
    /// start in the clinic timezone, find the doctor's window for that
    /// day, anchor it to the start's calendar date, and require full
    /// containment.
    async fn check_within_available_hours(
        &self,
        doctor_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), AppointmentError> {
        let availability = self
            .state
            .store
            .availability(doctor_id)
            .await?
            .ok_or(AppointmentError::AvailabilityNotSet)?;

        let tz = self.clinic_tz();
        let local_start = start.with_timezone(&tz);
        let day = DayOfWeek::from_weekday(local_start.weekday());

        let window = availability
            .window_for(day)
            .ok_or(AppointmentError::DayNotAvailable(day))?;

        let (window_start, window_end) = day_window_utc(tz, local_start.date_naive(), window)?;

        if start < window_start || end > window_end {
            return Err(AppointmentError::OutsideAvailableHours);
        }
        Ok(())
    }

    async fn persist_update(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        if !self.state.store.update_appointment(appointment.clone()).await? {
            return Err(AppointmentError::NotFound);
        }
        Ok(())
    }
}

/// Anchor a weekday window to a calendar date, producing absolute UTC
/// bounds in the clinic timezone.
pub(crate) fn day_window_utc(
    tz: FixedOffset,
    date: NaiveDate,
    window: &DayAvailability,
) -> Result<(DateTime<Utc>, DateTime<Utc>), AppointmentError> {
    let start = local_to_utc(tz, date, window.start_time)?;
    let end = local_to_utc(tz, date, window.end_time)?;
    Ok((start, end))
}

pub(crate) fn day_start_utc(
    tz: FixedOffset,
    date: NaiveDate,
) -> Result<DateTime<Utc>, AppointmentError> {
    local_to_utc(tz, date, chrono::NaiveTime::MIN)
}

fn local_to_utc(
    tz: FixedOffset,
    date: NaiveDate,
    time: chrono::NaiveTime,
) -> Result<DateTime<Utc>, AppointmentError> {
    tz.from_local_datetime(&date.and_time(time))
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            AppointmentError::Validation("time does not exist in the clinic timezone".to_string())
        })
}

fn validate_ids(fields: &[(&str, &str)]) -> Result<(), AppointmentError> {
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(AppointmentError::Validation(format!("{} is required", name)));
        }
    }
    Ok(())
}

fn validate_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppointmentError> {
    if start >= end {
        return Err(AppointmentError::Validation(
            "start_time must be before end_time".to_string(),
        ));
    }
    Ok(())
}
