use super::controller;
use crate::app::AppState;
use axum::Router;
use axum::routing::{delete, get, post};

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/users", post(controller::submit_record))
        .route("/api/users/stats", get(controller::public_stats))
        .route("/api/admin/login", post(controller::admin_login))
        .route("/api/admin/users", get(controller::list_records))
        .route("/api/admin/users/export", get(controller::export_records))
        .route("/api/admin/users/:id", delete(controller::delete_record))
        .route("/api/admin/stats", get(controller::admin_stats))
        .route("/api/email/report", post(controller::send_report))
        .route("/api/health", get(controller::health))
        .fallback(controller::route_not_found)
        .with_state(state)
}
