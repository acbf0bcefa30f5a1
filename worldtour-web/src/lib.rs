//! worldtour-web library - HTTP service for the tour catalog
//!
//! Owns the route table, the JSON API handlers, and the embedded UI shell.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod pagination;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    // JSON API
    let api = Router::new()
        .route(
            "/api/tours",
            get(api::tours::list_tours).post(api::tours::create_tour),
        )
        .route(
            "/api/tours/:guid",
            get(api::tours::get_tour)
                .put(api::tours::update_tour)
                .delete(api::tours::delete_tour),
        );

    // Embedded UI and health check
    let public = Router::new()
        .route("/", get(api::ui::serve_index))
        .route("/static/app.js", get(api::ui::serve_app_js))
        .merge(api::health::health_routes());

    Router::new()
        .merge(api)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
