//! API routes
//!
//! Domain-grouped HTTP route handlers.

pub mod analytics;
pub mod exams;
pub mod gamification;
pub mod goals;
pub mod lessons;
pub mod notifications;
pub mod ops;
pub mod review;
pub mod users;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Options for building the router
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Origins allowed by CORS; empty allows any origin
    pub allowed_origins: Vec<String>,
}

/// Build the complete API router
pub fn build_router(state: AppState) -> Router {
    build_router_with_options(state, RouterOptions::default())
}

/// Build the complete API router with options
pub fn build_router_with_options(state: AppState, options: RouterOptions) -> Router {
    Router::new()
        // Operations routes (health - no auth)
        .merge(ops::routes())
        .nest("/api/v1/users", users::routes())
        .nest("/api/v1/lessons", lessons::routes())
        .nest("/api/v1/exams", exams::routes())
        .nest("/api/v1/review", review::routes())
        .nest("/api/v1/analytics", analytics::routes())
        .nest("/api/v1/gamification", gamification::routes())
        .nest("/api/v1/goals", goals::routes())
        .nest("/api/v1/notifications", notifications::routes())
        .layer(cors_layer(&options.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
