use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;
use crate::config::JwtConfig;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, wrong secret, or a token that does not parse at all.
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("failed to encode token: {0}")]
    Encode(String),
}

/// Signs and verifies session tokens with the process-wide secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self::new(&cfg.secret, Duration::from_secs(cfg.ttl_minutes.max(1) as u64 * 60))
    }

    pub fn encode(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.encode_at(user_id, OffsetDateTime::now_utc())
    }

    pub fn encode_at(&self, user_id: Uuid, issued_at: OffsetDateTime) -> Result<String, TokenError> {
        let iat = issued_at.unix_timestamp();
        let claims = Claims {
            user_id,
            iat,
            exp: iat + self.ttl.as_secs() as i64,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))?;
        debug!(user_id = %user_id, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_at(token, OffsetDateTime::now_utc())
    }

    /// Verifies the signature, then checks expiry against `now`.
    /// A token is valid strictly before `exp`.
    pub fn decode_at(&self, token: &str, now: OffsetDateTime) -> Result<Claims, TokenError> {
        // Expiry is checked below with zero leeway so the boundary is exact.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::InvalidSignature)?;

        if now.unix_timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }
        debug!(user_id = %data.claims.user_id, "jwt verified");
        Ok(data.claims)
    }
}
