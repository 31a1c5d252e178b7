use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::scheduling::{AppointmentStatus, DayOfWeek};
use shared_store::StoreError;

use crate::services::slots::Slot;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: String,
    pub patient_id: String,
    pub created_by: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_start_time: DateTime<Utc>,
    pub new_end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentQueryParams {
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotQueryParams {
    pub date: NaiveDate,
    pub doctor_id: Option<String>,
    pub interval_minutes: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FreeDoctorsQuery {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

/// Free slots for one doctor on one date. Doctors with no window that
/// weekday are reported with an empty list, never omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSlots {
    pub doctor_id: String,
    pub available_slots: Vec<Slot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSlotStatus {
    pub doctor_id: String,
    pub available: bool,
    pub slot_status: String,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor's availability not set")]
    AvailabilityNotSet,

    #[error("Doctor is not available on {0}")]
    DayNotAvailable(DayOfWeek),

    #[error("Appointment time is outside of the doctor's available hours")]
    OutsideAvailableHours,

    #[error("The doctor already has an appointment at this time")]
    DoctorAlreadyBooked,

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Not authorized to modify this appointment")]
    NotOwner,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Scheduling store is unavailable, retry later")]
    Unavailable,
}

impl From<StoreError> for AppointmentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => AppointmentError::Unavailable,
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound | AppointmentError::AvailabilityNotSet => {
                AppError::NotFound(err.to_string())
            }
            AppointmentError::DayNotAvailable(_)
            | AppointmentError::OutsideAvailableHours
            | AppointmentError::Validation(_) => AppError::Validation(err.to_string()),
            AppointmentError::DoctorAlreadyBooked
            | AppointmentError::InvalidStatusTransition(_) => AppError::Conflict(err.to_string()),
            AppointmentError::NotOwner => AppError::Forbidden(err.to_string()),
            AppointmentError::Unavailable => AppError::Unavailable(err.to_string()),
        }
    }
}

/// Appointment ids arrive as path parameters; anything that is not a UUID
/// can never name a stored appointment.
pub fn parse_appointment_id(raw: &str) -> Result<Uuid, AppointmentError> {
    Uuid::parse_str(raw).map_err(|_| AppointmentError::Validation("Invalid appointment ID".to_string()))
}
