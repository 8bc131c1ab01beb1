use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, Config, SecurityHeadersLayer};
use crate::handlers::events::{
    create_event, delete_event, get_event, list_events, similar_events, update_event,
};
use crate::handlers::{health_check, AppState};

fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/events/:id/similar", get(similar_events))
}

/// The event API, mounted at the root or under `api_prefix` when one is set.
pub fn api_router(state: AppState, api_prefix: &str) -> Router {
    let events = if api_prefix.is_empty() {
        event_routes()
    } else {
        Router::new().nest(api_prefix, event_routes())
    };

    Router::new()
        .route("/health", get(health_check))
        .merge(events)
        .with_state(state)
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    api_router(state, &config.api_prefix)
        .layer(SecurityHeadersLayer::new(config.production))
        .layer(create_cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}
