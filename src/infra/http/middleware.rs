use std::time::Instant;

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::{Request, header, request::Parts};
use axum::middleware::Next;
use axum::response::Response;
use metrics::counter;
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;
use crate::application::sessions::{AuthError, AuthPrincipal};

use super::error::ApiError;
use super::state::AppState;

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

/// Outcome of the bearer-token resolution that runs on every request. Public
/// handlers never look at it; protected handlers pull it out through
/// [`Caller`].
#[derive(Clone)]
pub enum AuthAttempt {
    Anonymous,
    Failed(AuthError),
    Authenticated(AuthPrincipal),
}

/// Extractor yielding the authenticated caller, rejecting with the matching
/// 401 when the request carried no usable token.
pub struct Caller(pub AuthPrincipal);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthAttempt>() {
            Some(AuthAttempt::Authenticated(principal)) => Ok(Self(principal.clone())),
            Some(AuthAttempt::Failed(err)) => Err(err.clone().into()),
            Some(AuthAttempt::Anonymous) | None => Err(AuthError::Missing.into()),
        }
    }
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext {
        request_id: Uuid::new_v4().to_string(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Resolve the bearer token, if any, into an [`AuthAttempt`] extension.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.strip_prefix("Bearer "))
        .map(str::to_string);

    let attempt = match token {
        None => AuthAttempt::Anonymous,
        Some(token) => match state.sessions.authenticate(&token).await {
            Ok(principal) => AuthAttempt::Authenticated(principal),
            Err(err) => AuthAttempt::Failed(err),
        },
    };

    request.extensions_mut().insert(attempt);
    next.run(request).await
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        counter!("foglio_http_request_error_total").increment(1);

        let elapsed_ms = start.elapsed().as_millis();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, detail) = match report {
            Some(report) => (
                report.source,
                report
                    .messages
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "no diagnostic available".to_string()),
            ),
            None => ("unknown", "no diagnostic available".to_string()),
        };

        if status.is_server_error() {
            error!(
                target = "foglio::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                request_id = request_id,
                "request failed",
            );
        } else {
            warn!(
                target = "foglio::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                request_id = request_id,
                "client request error",
            );
        }
    }

    response
}
