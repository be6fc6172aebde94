use anyhow::anyhow;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthSettings;
use crate::errors::AppError;
use crate::models::account::Role;

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Signs HS256 session tokens with a fixed lifetime.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            key: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            ttl: settings.token_ttl,
        }
    }

    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = SessionClaims {
            user_id,
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.key)
            .map_err(|e| AppError::Internal(anyhow!("failed to sign session token: {e}")))
    }
}
