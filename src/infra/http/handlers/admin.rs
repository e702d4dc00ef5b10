//! Operator-only handlers.

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use foglio_api_types::AdminUserList;

use crate::infra::http::error::ApiError;
use crate::infra::http::middleware::Caller;
use crate::infra::http::state::AppState;

use super::admin_user_view;

/// Full account directory. The caller must be authenticated and present in
/// the configured admin allow-list.
pub async fn list_users(
    State(state): State<AppState>,
    Caller(principal): Caller,
) -> Result<impl IntoResponse, ApiError> {
    if !state.admins.is_admin(&principal.email) {
        return Err(ApiError::forbidden("Forbidden: Admins only"));
    }

    let users = state.users.list_users().await?;
    Ok(Json(AdminUserList {
        users: users.into_iter().map(admin_user_view).collect(),
    }))
}
