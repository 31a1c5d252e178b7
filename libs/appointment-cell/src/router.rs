use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/", get(handlers::search_appointments))
        .route("/slots", get(handlers::free_slots))
        .route("/today", get(handlers::today_appointments))
        .route("/doctors/free", get(handlers::free_doctors))
        .route("/doctors/{doctor_id}", get(handlers::doctor_appointments))
        .route("/patients/{patient_id}", get(handlers::patient_appointments))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/cancel", put(handlers::cancel_appointment))
        .route(
            "/{appointment_id}/reschedule",
            put(handlers::reschedule_appointment),
        )
        .route(
            "/{appointment_id}/complete",
            post(handlers::complete_appointment),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
