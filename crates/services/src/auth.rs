use bson::oid::ObjectId;
use chrono::{Duration, Utc};
use drinkup_config::JwtSettings;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<ObjectId, AuthError> {
        ObjectId::parse_str(&self.sub)
            .map_err(|_| AuthError::InvalidToken("Invalid user ID in token".to_string()))
    }
}

/// Issues and verifies the access tokens that identify real-time connections.
pub struct AuthService {
    jwt_settings: JwtSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(jwt_settings: JwtSettings) -> Self {
        let encoding_key = EncodingKey::from_secret(jwt_settings.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(jwt_settings.secret.as_bytes());
        Self {
            jwt_settings,
            encoding_key,
            decoding_key,
        }
    }

    pub fn issue_access_token(&self, user_id: ObjectId, username: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_hex(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.jwt_settings.access_token_ttl_secs as i64))
                .timestamp(),
            iss: self.jwt_settings.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.jwt_settings.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}
