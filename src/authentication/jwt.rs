use chrono::{Duration, Local};
use hmac::{digest::InvalidLength, Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::database::{
    error::ApiError,
    schema::{Id, User},
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtSessionData {
    pub user_id: Id,
    pub email: String,
    iat: i64,
    exp: i64,
}

impl JwtSessionData {
    pub fn new(user_id: Id, email: String, lifetime: Duration) -> Self {
        let now = Local::now();
        let iat = now.timestamp();
        let exp = (now + lifetime).timestamp();

        Self {
            user_id,
            email,
            iat,
            exp,
        }
    }

    pub fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// The authenticated caller every owned query is filtered by.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: Id,
    pub email: String,
}

impl From<&User> for SessionData {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.to_owned(),
        }
    }
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    key: Hmac<Sha256>,
    lifetime: Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], lifetime: Duration) -> Result<Self, InvalidLength> {
        Ok(Self {
            key: Hmac::new_from_slice(secret)?,
            lifetime,
        })
    }

    pub fn generate_session(&self, user: &User) -> Result<String, ApiError> {
        self.sign(JwtSessionData::new(
            user.id,
            user.email.to_owned(),
            self.lifetime,
        ))
    }

    pub fn sign(&self, claims: JwtSessionData) -> Result<String, ApiError> {
        claims
            .sign_with_key(&self.key)
            .map_err(|e| ApiError::Internal(format!("Failed to sign session: {e}")))
    }

    pub fn verify_session(&self, token: &str) -> Result<JwtSessionData, ApiError> {
        let session: JwtSessionData = token
            .verify_with_key(&self.key)
            .map_err(|_| ApiError::InvalidToken)?;

        if session.exp < Local::now().timestamp() {
            return Err(ApiError::InvalidToken);
        }
        Ok(session)
    }
}
