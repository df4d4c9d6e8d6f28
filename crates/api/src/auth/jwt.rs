//! Bearer token verification.
//!
//! Tokens are HS256 JWTs minted by the identity service. This API only
//! verifies them and turns the claims into a workflow [`Actor`]. A token
//! whose `role` is not one this service knows is refused outright, so a typo
//! in the identity service never silently degrades an approver to a clerk.
//!
//! [`generate_access_token`] mints tokens for operational tooling and tests.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use stockrecon_core::roles::{is_known_role, Actor};
use stockrecon_core::types::DbId;
use uuid::Uuid;

use crate::config::{env_or, ConfigError};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id of the counter or approver.
    pub sub: DbId,
    /// `admin`, `approver` or `clerk`.
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    pub fn actor(&self) -> Actor {
        Actor::new(self.sub, self.role.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HS256 secret.
    pub secret: String,
    /// Lifetime of minted tokens, in minutes.
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// `JWT_SECRET` is required and must be non-empty.
    /// `JWT_ACCESS_EXPIRY_MINS` defaults to 15.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            secret,
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", "15")?,
        })
    }
}

pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: iat + config.access_token_expiry_mins * 60,
        iat,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check the signature and expiry, then the role.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, TokenError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?
    .claims;

    if !is_known_role(&claims.role) {
        return Err(TokenError::UnknownRole(claims.role));
    }
    Ok(claims)
}
