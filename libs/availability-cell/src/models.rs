use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;
use shared_models::scheduling::{DayAvailability, DayOfWeek};
use shared_store::StoreError;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Body for both add (create-if-absent) and reset (full replacement).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub doctor_id: String,
    pub days: Vec<DayAvailability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDayRequest {
    pub doctor_id: String,
    pub day: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub doctor_id: String,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("Doctor's schedule not found")]
    NotFound,

    #[error("No availability entry for {0}")]
    DayNotFound(DayOfWeek),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Scheduling store is unavailable, retry later")]
    Unavailable,
}

impl From<StoreError> for AvailabilityError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => AvailabilityError::Unavailable,
        }
    }
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::NotFound => AppError::NotFound(err.to_string()),
            AvailabilityError::DayNotFound(_) => AppError::NotFound(err.to_string()),
            AvailabilityError::Validation(msg) => AppError::Validation(msg),
            AvailabilityError::Unavailable => AppError::Unavailable(err.to_string()),
        }
    }
}
