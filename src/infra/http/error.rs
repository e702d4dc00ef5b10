use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use foglio_api_types::{ErrorBody, FieldError};

use crate::application::blogs::BlogError;
use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;
use crate::application::sessions::AuthError;
use crate::application::users::UserError;

/// JSON error response carrying the client-facing taxonomy: a status code
/// plus `{message}` (or `{errors: [...]}` for field validation). Internal
/// detail travels separately through the [`ErrorReport`] extension.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
    detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                message: message.into(),
                errors: Vec::new(),
            },
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn field_errors(errors: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                message: "Validation failed".to_string(),
                errors,
            },
            detail: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn server_error(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server error").with_detail(detail)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let report_message = match self.detail {
            Some(detail) => detail,
            None => self.body.message.clone(),
        };
        let mut response = (self.status, Json(self.body)).into_response();
        ErrorReport::from_message("infra::http::api_error", self.status, report_message)
            .attach(&mut response);
        response
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::not_found("Resource not found"),
            RepoError::Duplicate { constraint } => {
                Self::conflict("Duplicate record").with_detail(constraint)
            }
            RepoError::Timeout => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable",
            ),
            RepoError::Persistence(detail) => Self::server_error(detail),
        }
    }
}

impl From<BlogError> for ApiError {
    fn from(err: BlogError) -> Self {
        match err {
            BlogError::Validation(message) => Self::validation(message),
            BlogError::Invalid(errors) => Self::field_errors(errors),
            BlogError::Forbidden => Self::forbidden("Forbidden"),
            BlogError::NotFound => Self::not_found("Blog not found"),
            BlogError::CommentNotFound => Self::not_found("Comment not found"),
            BlogError::Repo(repo) => repo.into(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Invalid(errors) => Self::field_errors(errors),
            UserError::EmailTaken => Self::conflict("Email already registered"),
            UserError::InvalidCredentials => Self::unauthorized("Invalid credentials"),
            UserError::NotFound => Self::not_found("User not found"),
            UserError::Hashing(detail) => Self::server_error(detail),
            UserError::Repo(repo) => repo.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Missing => Self::unauthorized("Unauthorized"),
            AuthError::Invalid => Self::unauthorized("Invalid token"),
            AuthError::Expired => Self::unauthorized("Token expired"),
        }
    }
}
