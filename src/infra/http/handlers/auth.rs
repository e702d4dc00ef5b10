//! Account handlers: registration, login and profile.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use foglio_api_types::{
    AuthResponse, LoginRequest, ProfileUpdated, ProfileView, RegisterRequest,
    UpdateProfileRequest,
};

use crate::application::users::RegisterCommand;
use crate::infra::http::error::ApiError;
use crate::infra::http::middleware::Caller;
use crate::infra::http::state::AppState;

use super::user_view;

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .register(RegisterCommand {
            name: payload.name.unwrap_or_default(),
            email: payload.email.unwrap_or_default(),
            password: payload.password.unwrap_or_default(),
            interested_topics: payload.interested_topics.unwrap_or_default(),
        })
        .await?;

    let token = state
        .sessions
        .issue(&user)
        .await
        .map_err(|err| ApiError::server_error(err.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user_view(&user),
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .login(
            payload.email.as_deref().unwrap_or_default(),
            payload.password.as_deref().unwrap_or_default(),
        )
        .await?;

    let token = state
        .sessions
        .issue(&user)
        .await
        .map_err(|err| ApiError::server_error(err.to_string()))?;

    Ok(Json(AuthResponse {
        user: user_view(&user),
        token,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Caller(principal): Caller,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.profile(principal.user_id).await?;
    Ok(Json(ProfileView {
        name: user.name,
        email: user.email,
        bio: user.bio,
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Name is required"))?;

    let user = state
        .users
        .update_profile(principal.user_id, name, payload.bio)
        .await?;

    Ok(Json(ProfileUpdated {
        message: "Profile updated successfully".to_string(),
        name: user.name,
        bio: user.bio,
    }))
}
