use crate::models::WriteResponse;
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{self, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{convert::Infallible, sync::Arc};
use tracing::{info, warn};

/// Optional shared secret guarding the intake route. `None` leaves it open.
#[derive(Clone, Default)]
pub struct AuthState {
    secret: Option<Arc<str>>,
}

impl AuthState {
    pub fn new(secret: Option<String>) -> Self {
        match &secret {
            Some(_) => info!(target = "intake.api", "shared secret required on /write"),
            None => info!(target = "intake.api", "INTAKE_SHARED_SECRET unset; /write is open"),
        }
        Self {
            secret: secret.map(Arc::from),
        }
    }

    fn accepts(&self, presented: Option<&str>) -> bool {
        match (&self.secret, presented) {
            (None, _) => true,
            (Some(expected), Some(presented)) => &**expected == presented,
            (Some(_), None) => false,
        }
    }
}

pub async fn require_shared_secret(
    State(state): State<AuthState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, Infallible> {
    let presented = extract_secret(request.headers());
    if !state.accepts(presented.as_deref()) {
        warn!(
            target = "intake.api",
            presented = presented.is_some(),
            "rejected request with missing or invalid shared secret"
        );
        return Ok(unauthorized_response());
    }
    Ok(next.run(request).await)
}

fn extract_secret(headers: &http::HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(http::header::AUTHORIZATION)
        && let Ok(raw) = value.to_str()
        && let Some(prefix) = raw.get(..7)
        && prefix.eq_ignore_ascii_case("bearer ")
    {
        return Some(raw[7..].trim().to_string());
    }
    headers
        .get("X-Intake-Key")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(WriteResponse::failure("Unauthorized")),
    )
        .into_response()
}
