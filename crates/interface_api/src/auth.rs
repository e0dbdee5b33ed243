//! Authentication and authorization

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{Principal, Role, UserId};

use crate::error::ApiError;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID or staff handle)
    pub sub: String,
    /// Caller's roles
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    /// Converts the claims into the principal handed to the domain
    ///
    /// Unknown role names are dropped.
    pub fn principal(&self) -> Principal {
        let roles = self
            .roles
            .iter()
            .filter_map(|r| match r.as_str() {
                roles::USER => Some(Role::User),
                roles::ADMIN => Some(Role::Admin),
                _ => None,
            })
            .collect();
        Principal {
            subject: self.sub.clone(),
            roles,
        }
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing role: {0}")]
    MissingRole(String),
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `subject` - User id or staff handle
/// * `roles` - Caller's roles
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    subject: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let ttl = i64::try_from(expiration_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or(AuthError::InvalidToken)?;
    let exp = now.checked_add_signed(ttl).ok_or(AuthError::InvalidToken)?;

    let claims = Claims {
        sub: subject.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Token for a customer
pub fn user_token(user_id: UserId, secret: &str, expiration_secs: u64) -> Result<String, AuthError> {
    create_token(&user_id.to_string(), vec![roles::USER.to_string()], secret, expiration_secs)
}

/// Token for a staff member
pub fn admin_token(handle: &str, secret: &str, expiration_secs: u64) -> Result<String, AuthError> {
    create_token(handle, vec![roles::ADMIN.to_string()], secret, expiration_secs)
}

/// Validates a JWT token
///
/// # Arguments
///
/// * `token` - The JWT token to validate
/// * `secret` - JWT secret key
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Role names carried in tokens
pub mod roles {
    pub const USER: &str = "user";
    pub const ADMIN: &str = "admin";
}

/// The calling customer, resolved from the token subject
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .ok_or(ApiError::Unauthorized)?;
        if !principal.has_role(Role::User) {
            return Err(ApiError::Forbidden("customer token required".into()));
        }
        principal
            .user_id()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::Forbidden("token subject is not a user id".into()))
    }
}

/// The calling staff member
#[derive(Debug, Clone)]
pub struct AdminPrincipal(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AdminPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(ApiError::Unauthorized)?;
        if !principal.is_admin() {
            return Err(ApiError::Forbidden(AuthError::MissingRole(roles::ADMIN.into()).to_string()));
        }
        Ok(AdminPrincipal(principal))
    }
}
