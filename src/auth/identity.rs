//! JWT bearer middleware resolving the caller to a role-scoped identity
//!
//! Token issuance happens elsewhere; the claims (subject + role) are trusted
//! here. The middleware additionally resolves the caller's client or driver
//! profile id, so every handler works with a fully resolved [`Identity`].

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::AppError;
use crate::state::AppState;

/// Caller role carried in the token
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Client,
    Driver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "CLIENT",
            Role::Driver => "DRIVER",
        }
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub role: Role,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated caller, resolved to at most one profile per role
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
    pub client_id: Option<String>,
    pub driver_id: Option<String>,
}

const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a bearer token for a user
pub fn create_token(
    user_id: &str,
    role: Role,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Middleware that verifies the bearer token and attaches [`Identity`]
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized.into_response())?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized.into_response())?;

    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        AppError::InvalidToken.into_response()
    })?;

    let identity = resolve(&state, token_data.claims)
        .await
        .map_err(|e| e.into_response())?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Resolve token claims to profile ids
async fn resolve(state: &AppState, claims: Claims) -> Result<Identity, AppError> {
    let client_id = db::profiles::find_client_by_user(&state.pool, &claims.sub)
        .await?
        .map(|c| c.id);
    let driver_id = db::profiles::find_driver_by_user(&state.pool, &claims.sub)
        .await?
        .map(|d| d.id);

    Ok(Identity {
        user_id: claims.sub,
        role: claims.role,
        client_id,
        driver_id,
    })
}
