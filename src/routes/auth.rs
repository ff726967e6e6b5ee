//! Signup, login and profile.
//!
//! Signup and login answer `{token, user}`; profile answers `{user}`. The
//! two credential failures at login share one message so the response does
//! not reveal whether the email exists.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::{AppError, AppJson};
use crate::models::{Role, User};
use crate::AppState;

// Missing and empty fields are treated alike, so the strings default
// rather than being Options.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<Role>,
}

pub async fn signup(
    State(state): State<AppState>,
    AppJson(req): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if req.name.is_empty() || req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Name, email and password are required".into(),
        ));
    }

    let hash = hash_password(&req.password)?;
    let user = User::new(req.name, req.email, hash, req.role.unwrap_or_default());
    state.store.insert_user(&user).await?;

    let token = state.keys.issue(&user)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "token": token, "user": user })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation("Email and password are required".into()));
    }

    let user = state
        .store
        .user_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized("Invalid email or password"))?;
    if !verify_password(&req.password, &user.password_hash) {
        return Err(AppError::Unauthorized("Invalid email or password"));
    }

    let token = state.keys.issue(&user)?;
    Ok(Json(json!({ "token": token, "user": user })))
}

/// An account deleted after the token was issued still verifies; the lookup
/// is what reports it gone.
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Value>, AppError> {
    let user = state
        .store
        .user_by_id(claims.id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(json!({ "user": user })))
}
