use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MessageResponse, PublicUser, RegisterRequest},
        jwt::JwtKeys,
        password,
    },
    error::AuthError,
    state::AppState,
    store::{NewUser, UserStore},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AuthError> {
    if payload.name.is_empty() {
        return Err(AuthError::MalformedRequest(
            "El nombre es obligatorio".into(),
        ));
    }
    if payload.email.is_empty() {
        return Err(AuthError::MalformedRequest("El email es obligatorio".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "register invalid email");
        return Err(AuthError::MalformedRequest("Email inválido".into()));
    }
    if payload.password.is_empty() {
        return Err(AuthError::MalformedRequest(
            "La contraseña es obligatoria".into(),
        ));
    }

    // Lookup is exact and case-sensitive; the email is stored as sent.
    if state.store.find_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "register duplicate email");
        return Err(AuthError::DuplicateEmail);
    }

    let plain = payload.password;
    let hash = tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?
        .map_err(|e| {
            error!(error = %e, "hash_password failed");
            AuthError::StoreUnavailable(e.to_string())
        })?;

    // A concurrent register may have won the race since the lookup above;
    // the store's unique constraint reports that as DuplicateEmail.
    let user = state
        .store
        .insert(NewUser {
            name: payload.name,
            email: payload.email,
            password_hash: hash,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Usuario registrado exitosamente".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    if payload.email.is_empty() {
        return Err(AuthError::MalformedRequest("El email es obligatorio".into()));
    }
    if payload.password.is_empty() {
        return Err(AuthError::MalformedRequest(
            "La contraseña es obligatoria".into(),
        ));
    }

    let user = match state.store.find_by_email(&payload.email).await? {
        Some(user) => user,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(AuthError::InvalidCredentials);
        }
    };

    let plain = payload.password;
    let stored_hash = user.password_hash.clone();
    let ok = tokio::task::spawn_blocking(move || password::verify_password(&plain, &stored_hash))
        .await
        .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?
        .map_err(|e| {
            error!(error = %e, "verify_password failed");
            AuthError::StoreUnavailable(e.to_string())
        })?;

    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        AuthError::StoreUnavailable(e.to_string())
    })?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    }))
}
