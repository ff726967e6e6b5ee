//! Admin-only user listing, oldest account first.

use axum::extract::State;
use axum::Json;

use crate::auth::{require_admin, AuthUser};
use crate::error::AppError;
use crate::models::User;
use crate::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<User>>, AppError> {
    require_admin(&claims)?;
    Ok(Json(state.store.list_users().await?))
}
