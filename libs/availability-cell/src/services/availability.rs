use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use shared_models::scheduling::{DayAvailability, DoctorAvailability};
use shared_store::AppState;

use crate::models::{AvailabilityError, AvailabilityRequest, UpdateDayRequest};

pub struct AvailabilityService {
    state: Arc<AppState>,
}

impl AvailabilityService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Create a doctor's schedule unless one already exists. Re-adding is
    /// an idempotent no-op returning the stored record, never a merge;
    /// callers that want to overwrite must use `reset`.
    pub async fn add(
        &self,
        request: AvailabilityRequest,
    ) -> Result<(DoctorAvailability, bool), AvailabilityError> {
        validate_request(&request)?;
        debug!("Adding availability for doctor {}", request.doctor_id);

        let now = Utc::now();
        let record = DoctorAvailability {
            doctor_id: request.doctor_id,
            days: request.days,
            created_at: now,
            updated_at: now,
        };

        let (stored, created) = self.state.store.insert_availability_if_absent(record).await?;
        if !created {
            debug!("Availability already present for doctor {}", stored.doctor_id);
        }
        Ok((stored, created))
    }

    /// Replace the stored day list in full. Fails if the doctor has no
    /// schedule yet.
    pub async fn reset(
        &self,
        request: AvailabilityRequest,
    ) -> Result<DoctorAvailability, AvailabilityError> {
        validate_request(&request)?;
        debug!("Resetting availability for doctor {}", request.doctor_id);

        let existing = self
            .state
            .store
            .availability(&request.doctor_id)
            .await?
            .ok_or(AvailabilityError::NotFound)?;

        let record = DoctorAvailability {
            doctor_id: request.doctor_id,
            days: request.days,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        if !self.state.store.update_availability(record.clone()).await? {
            return Err(AvailabilityError::NotFound);
        }
        Ok(record)
    }

    /// Rewrite the working window of a single weekday entry.
    pub async fn update_day(
        &self,
        request: UpdateDayRequest,
    ) -> Result<DoctorAvailability, AvailabilityError> {
        if request.doctor_id.trim().is_empty() {
            return Err(AvailabilityError::Validation(
                "doctor_id is required".to_string(),
            ));
        }
        validate_window(&DayAvailability {
            day: request.day,
            start_time: request.start_time,
            end_time: request.end_time,
        })?;

        debug!(
            "Updating {} availability for doctor {}",
            request.day, request.doctor_id
        );

        let mut record = self
            .state
            .store
            .availability(&request.doctor_id)
            .await?
            .ok_or(AvailabilityError::NotFound)?;

        let entry = record
            .days
            .iter_mut()
            .find(|entry| entry.day == request.day)
            .ok_or(AvailabilityError::DayNotFound(request.day))?;

        entry.start_time = request.start_time;
        entry.end_time = request.end_time;
        record.updated_at = Utc::now();

        if !self.state.store.update_availability(record.clone()).await? {
            return Err(AvailabilityError::NotFound);
        }
        Ok(record)
    }

    pub async fn get(&self, doctor_id: &str) -> Result<DoctorAvailability, AvailabilityError> {
        if doctor_id.trim().is_empty() {
            return Err(AvailabilityError::Validation(
                "doctor_id is required".to_string(),
            ));
        }
        self.state
            .store
            .availability(doctor_id)
            .await?
            .ok_or(AvailabilityError::NotFound)
    }
}

fn validate_request(request: &AvailabilityRequest) -> Result<(), AvailabilityError> {
    if request.doctor_id.trim().is_empty() {
        return Err(AvailabilityError::Validation(
            "doctor_id is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in &request.days {
        validate_window(entry)?;
        if !seen.insert(entry.day) {
            return Err(AvailabilityError::Validation(format!(
                "duplicate availability entry for {}",
                entry.day
            )));
        }
    }
    Ok(())
}

fn validate_window(entry: &DayAvailability) -> Result<(), AvailabilityError> {
    if entry.start_time >= entry.end_time {
        return Err(AvailabilityError::Validation(format!(
            "start_time must be before end_time for {}",
            entry.day
        )));
    }
    Ok(())
}
