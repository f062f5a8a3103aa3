mod handlers;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::app::Services;

pub fn create_router(services: Services) -> Router {
    let api = Router::new()
        // Application log
        .route("/logs", get(handlers::list_logs))
        .route("/logs", delete(handlers::clear_logs))
        .route("/logs/search", get(handlers::search_logs))
        .route("/logs/stats", get(handlers::log_stats))
        .route("/logs/sources/{source}", get(handlers::logs_by_source))
        // Progress ledger
        .route("/progress", get(handlers::list_progress))
        .route("/progress/running", get(handlers::list_running_progress))
        .route("/progress/cleanup", post(handlers::cleanup_progress))
        .route("/progress/{id}", get(handlers::get_progress))
        .route("/progress/{id}", delete(handlers::remove_progress))
        // Dashboard
        .route("/dashboard", get(handlers::get_dashboard))
        // Assets
        .route("/assets", get(handlers::list_assets))
        .route("/assets", post(handlers::create_asset))
        .route("/assets/{id}", get(handlers::get_asset))
        .route("/assets/{id}", put(handlers::update_asset))
        .route("/assets/{id}", delete(handlers::delete_asset))
        // Files
        .route("/files", get(handlers::list_files))
        .route("/files", post(handlers::add_file))
        .route("/files/{id}", get(handlers::get_file))
        .route("/files/{id}", put(handlers::update_file))
        .route("/files/{id}", delete(handlers::delete_file))
        // Finance
        .route("/transactions", get(handlers::list_transactions))
        .route("/transactions", post(handlers::create_transaction))
        .route("/transactions/summary", get(handlers::finance_summary))
        .route("/transactions/{id}", delete(handlers::delete_transaction))
        // IoT devices
        .route("/devices", get(handlers::list_devices))
        .route("/devices", post(handlers::register_device))
        .route("/devices/{id}", put(handlers::update_device))
        .route("/devices/{id}", delete(handlers::remove_device))
        // Network hosts
        .route("/hosts", get(handlers::list_hosts))
        .route("/hosts", post(handlers::add_host))
        .route("/hosts/{id}/probe", post(handlers::record_probe))
        .route("/hosts/{id}", delete(handlers::remove_host))
        // Schedule
        .route("/events", get(handlers::list_events))
        .route("/events", post(handlers::create_event))
        .route("/events/upcoming", get(handlers::upcoming_events))
        .route("/events/{id}/complete", post(handlers::complete_event))
        .route("/events/{id}", delete(handlers::delete_event))
        // System
        .route("/system", get(handlers::get_system))
        .route("/system/refresh", post(handlers::refresh_system))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(services)
}
