//! Contest management handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

/// Contest routes
pub fn routes() -> Router<AppState> {
    Router::new()
        // Contest CRUD
        .route("/", get(handler::list_contests))
        .route("/", post(handler::create_contest))
        .route("/{id}", get(handler::get_contest))
        // Participation
        .route("/{id}/join", post(handler::join_contest))
        // Lifecycle override (creator only)
        .route("/{id}/status", put(handler::update_contest_status))
        // Submissions and standings
        .route("/{id}/submissions", post(handler::report_submission))
        .route("/{id}/standings", get(handler::get_standings))
}
