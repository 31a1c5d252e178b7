use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_store::AppState;

use crate::models::{
    parse_appointment_id, AppointmentQueryParams, BookAppointmentRequest, FreeDoctorsQuery,
    RescheduleAppointmentRequest, SlotQueryParams,
};
use crate::services::booking::BookingEngine;
use crate::services::discovery::DiscoveryService;

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let engine = BookingEngine::new(state);

    let appointment = engine.book(request).await.map_err(AppError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Appointment booked successfully.",
            "appointment": appointment
        })),
    ))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_appointment_id(&appointment_id).map_err(AppError::from)?;
    let engine = BookingEngine::new(state);

    let appointment = engine.cancel(id, &user).await.map_err(AppError::from)?;

    Ok(Json(json!({
        "message": "Appointment canceled successfully.",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_appointment_id(&appointment_id).map_err(AppError::from)?;
    let engine = BookingEngine::new(state);

    let appointment = engine.complete(id).await.map_err(AppError::from)?;

    Ok(Json(json!({
        "message": "Appointment completed successfully.",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<String>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_appointment_id(&appointment_id).map_err(AppError::from)?;
    let engine = BookingEngine::new(state);

    let appointment = engine.reschedule(id, request).await.map_err(AppError::from)?;

    Ok(Json(json!({
        "message": "Appointment rescheduled successfully.",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_appointment_id(&appointment_id).map_err(AppError::from)?;
    let engine = BookingEngine::new(state);

    let appointment = engine.get(id).await.map_err(AppError::from)?;

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AppointmentQueryParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = BookingEngine::new(state);

    let appointments = engine.search(params).await.map_err(AppError::from)?;

    Ok(Json(json!({ "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn today_appointments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = BookingEngine::new(state);

    let appointments = engine.today().await.map_err(AppError::from)?;

    Ok(Json(json!({ "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn doctor_appointments(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = BookingEngine::new(state);

    let appointments = engine
        .doctor_appointments(&doctor_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn patient_appointments(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let engine = BookingEngine::new(state);

    let appointments = engine
        .patient_history(&patient_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn free_slots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SlotQueryParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = DiscoveryService::new(state);

    let doctors = service
        .free_slots(params.date, params.doctor_id, params.interval_minutes)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "doctors": doctors })))
}

#[axum::debug_handler]
pub async fn free_doctors(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FreeDoctorsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = DiscoveryService::new(state);

    let doctors = service
        .doctors_free_for_range(params.date, params.start_time, params.end_time)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "doctors": doctors })))
}
