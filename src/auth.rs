//! Bearer-token identity and password hashing.
//!
//! Tokens are HS256 JWTs carrying `{id, email, role}` with a fixed one-day
//! expiry. There is no refresh and no revocation: a token stays valid until
//! it expires, with no server-side session state behind it.
//!
//! [`AuthUser`] is the single verification path. Every protected route
//! extracts it; there is no second copy of the header parsing or the
//! failure mapping anywhere else.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Role, User};
use crate::AppState;

const BAD_HEADER: &str = "Invalid authorization header format. Format is \"Bearer <token>\"";

/// Claims carried by every token. `exp` is seconds since the Unix epoch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Owner-or-admin rule shared by every order mutation.
    pub fn may_act_on(&self, owner: Uuid) -> bool {
        self.id == owner || self.is_admin()
    }
}

/// Rejects callers whose token does not carry the admin role.
pub fn require_admin(claims: &Claims) -> Result<(), AppError> {
    if claims.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required"))
    }
}

/// Key material derived from the signing secret once at startup.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        // The default 60s leeway would let a just-expired token through.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Signs a one-day token for the given account.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: (Utc::now() + Duration::days(1)).timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        jsonwebtoken::encode(&Header::default(), claims, &self.encoding)
            .map_err(|err| AppError::Internal(err.into()))
    }

    /// Decodes and validates a raw token.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token"))
    }
}

/// Pulls the raw token out of an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthorized("No authorization header provided"))?;
    let value = header.to_str().map_err(|_| AppError::Unauthorized(BAD_HEADER))?;

    let mut words = value.split(' ');
    match (words.next(), words.next(), words.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AppError::Unauthorized(BAD_HEADER)),
    }
}

/// The authenticated caller, decoded from the request's bearer token.
pub struct AuthUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        state.keys.verify(token).map(AuthUser)
    }
}

/// Hashes a signup password with argon2id and a fresh salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::Internal(anyhow::anyhow!("password hashing failed: {err}")))
}

/// Checks a login password against the stored hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}
