//! Rutas HTTP
//!
//! Un router por entidad, anidados bajo su prefijo en el router principal.

pub mod booking_routes;
pub mod customer_routes;
pub mod destination_routes;
pub mod feedback_routes;
pub mod payment_routes;
pub mod schedule_routes;
pub mod staff_routes;
pub mod vehicle_routes;

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::{cors_middleware, cors_middleware_with_origins};
use crate::state::AppState;

/// Router completo de la aplicación con CORS y trazas de petición
pub fn create_app_router(state: AppState) -> Router {
    let cors = if state.config.cors_origins.is_empty() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(&state.config.cors_origins)
    };

    Router::new()
        .route("/health", get(health))
        .nest("/customers", customer_routes::create_customer_router())
        .nest("/destinations", destination_routes::create_destination_router())
        .nest("/bookings", booking_routes::create_booking_router())
        .nest("/schedules", schedule_routes::create_schedule_router())
        .nest("/payments", payment_routes::create_payment_router())
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/staff", staff_routes::create_staff_router())
        .nest("/feedback", feedback_routes::create_feedback_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
