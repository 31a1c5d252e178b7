use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use shared_models::error::AppError;
use shared_store::AppState;

use crate::models::{AvailabilityQuery, AvailabilityRequest, UpdateDayRequest};
use crate::services::availability::AvailabilityService;

#[axum::debug_handler]
pub async fn add_availability(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AvailabilityRequest>,
) -> Result<impl IntoResponse, AppError> {
    let service = AvailabilityService::new(state);

    let (availability, created) = service.add(request).await.map_err(AppError::from)?;

    let (status, message) = if created {
        (StatusCode::CREATED, "Doctor availability added successfully.")
    } else {
        (StatusCode::OK, "Availability is already added.")
    };

    Ok((
        status,
        Json(json!({
            "message": message,
            "availability": availability
        })),
    ))
}

#[axum::debug_handler]
pub async fn reset_availability(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AvailabilityRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = AvailabilityService::new(state);

    let availability = service.reset(request).await.map_err(AppError::from)?;

    Ok(Json(json!({
        "message": "Doctor's schedule updated successfully.",
        "availability": availability
    })))
}

#[axum::debug_handler]
pub async fn update_availability_day(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateDayRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = AvailabilityService::new(state);

    let availability = service.update_day(request).await.map_err(AppError::from)?;

    Ok(Json(json!({
        "message": "Doctor's schedule updated successfully.",
        "availability": availability
    })))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = AvailabilityService::new(state);

    let availability = service
        .get(&query.doctor_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "availability": availability })))
}
