use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::SESSION_TTL_SECS;
use crate::error::RecaudaError;

/// Operator session claims. The payment workflow itself never consults
/// these; authorization is the backend's job.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,  // Operator username
    pub role: String, // "OPERATOR" for now
    pub exp: usize,   // Expiration timestamp
}

pub struct JwtService {
    secret: String,
}

impl JwtService {
    pub fn new(secret: String) -> Self {
        JwtService { secret }
    }

    pub fn generate_token(&self, username: &str, role: &str) -> Result<String, RecaudaError> {
        let expiration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as usize + SESSION_TTL_SECS)
            .map_err(|e| RecaudaError::InternalServerError(format!("Time error: {}", e)))?;

        let claims = Claims {
            sub: username.to_string(),
            role: role.to_string(),
            exp: expiration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| RecaudaError::InternalServerError(format!("JWT encoding error: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, RecaudaError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| RecaudaError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims)
    }
}
