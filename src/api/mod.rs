mod error;
mod handlers;

pub use error::ApiError;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

/// The listening port is fixed.
pub const PORT: u16 = 3000;

pub fn create_router(db: Database) -> Router {
    Router::new()
        // Tasks
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route(
            "/tasks/{id}",
            get(handlers::get_task)
                .patch(handlers::update_task)
                .delete(handlers::delete_task),
        )
        // Assignees
        .route(
            "/assignees",
            get(handlers::list_assignees).post(handlers::create_assignee),
        )
        .route(
            "/assignees/{id}",
            get(handlers::get_assignee)
                .patch(handlers::update_assignee)
                .delete(handlers::delete_assignee),
        )
        // Assignments
        .route("/assignments", get(handlers::list_assignments))
        .route(
            "/tasks/{id}/assign/{assignee_id}",
            post(handlers::assign),
        )
        .route(
            "/tasks/{id}/unassign/{assignee_id}",
            delete(handlers::unassign),
        )
        // Relationship traversal
        .route("/assignees/{id}/tasks", get(handlers::get_assignee_tasks))
        .route("/tasks/{id}/assignees", get(handlers::get_task_assignees))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(db)
}
