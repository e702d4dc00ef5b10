pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

pub use state::AppState;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Router, extract::State, middleware as axum_middleware};

use crate::application::error::ErrorReport;
use crate::infra::db::PostgresRepositories;

/// Assemble the full API surface.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Public browsing
        .route("/api/blogs/all", get(handlers::blogs::list_all))
        .route("/api/public-blogs", get(handlers::blogs::list_filtered))
        .route("/api/public-blogs/", get(handlers::blogs::list_filtered))
        // Authoring and engagement (the {id} route also serves the public
        // slug lookup on GET)
        .route("/api/blogs/user-blogs", get(handlers::blogs::user_blogs))
        .route(
            "/api/blogs/user-blogs/{id}",
            get(handlers::blogs::user_blog),
        )
        .route(
            "/api/blogs/create-new-blogs",
            post(handlers::blogs::create),
        )
        .route(
            "/api/blogs/{id}",
            get(handlers::blogs::get_by_slug)
                .patch(handlers::blogs::update)
                .delete(handlers::blogs::delete),
        )
        .route("/api/blogs/{id}/like", post(handlers::blogs::toggle_like))
        .route(
            "/api/blogs/{id}/comments",
            post(handlers::blogs::add_comment),
        )
        .route(
            "/api/blogs/{id}/comments/{comment_id}/like",
            post(handlers::blogs::toggle_comment_like),
        )
        .route(
            "/api/blogs/{id}/comments/{comment_id}/replies",
            post(handlers::blogs::add_reply),
        )
        // Accounts
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/me", get(handlers::auth::me))
        .route(
            "/api/auth/update-profile",
            put(handlers::auth::update_profile),
        )
        // Operator surface
        .route("/api/admin/users", get(handlers::admin::list_users))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate,
        ))
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
        .with_state(state)
}

/// Database health probe, wired separately so the API router stays free of
/// infrastructure handles.
pub fn health_router(db: Arc<PostgresRepositories>) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .with_state(db)
}

async fn health(State(db): State<Arc<PostgresRepositories>>) -> Response {
    match db.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
