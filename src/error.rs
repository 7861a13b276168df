use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::auth::dto::MessageResponse;

/// Failures surfaced by the register and login flows.
///
/// `InvalidCredentials` covers both an unknown email and a wrong password;
/// the two cases are indistinguishable to the caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::DuplicateEmail | AuthError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Store failure detail never leaves the server.
    fn message(&self) -> String {
        match self {
            AuthError::DuplicateEmail => "El email ya está registrado".into(),
            AuthError::InvalidCredentials => "Credenciales inválidas".into(),
            AuthError::StoreUnavailable(_) => "Error en el servidor".into(),
            AuthError::MalformedRequest(message) => message.clone(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::StoreUnavailable(detail) = &self {
            error!(error = %detail, "request failed");
        }
        let body = Json(MessageResponse {
            message: self.message(),
        });
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_contract() {
        assert_eq!(AuthError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::StoreUnavailable("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::MalformedRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn store_detail_is_not_exposed() {
        let err = AuthError::StoreUnavailable("connection refused".into());
        assert_eq!(err.message(), "Error en el servidor");
    }
}
