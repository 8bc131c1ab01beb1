use axum::Json;
use serde::Serialize;

pub mod events;

pub use events::AppState;

#[derive(Serialize)]
pub struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Json<HealthPayload> {
    Json(HealthPayload {
        status: "ok",
        service: "events-catalog",
    })
}
