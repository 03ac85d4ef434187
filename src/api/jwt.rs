use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::warn;

/// token 有效期上限（一年），过大的配置值会被截断
pub const MAX_TOKEN_MINUTES: u64 = 60 * 24 * 365;

/// Global cached JwtService instance
static JWT_SERVICE: OnceLock<JwtService> = OnceLock::new();

/// Get the cached JwtService instance
///
/// Initialized once from `api.jwt_secret`; an empty secret is replaced by a
/// random one, which invalidates all tokens on restart.
pub fn get_jwt_service() -> &'static JwtService {
    JWT_SERVICE.get_or_init(JwtService::from_config)
}

/// Auth token claims; `sub` is the user id, `ver` the user's token version
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthClaims {
    pub sub: String,
    pub ver: i32,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl AuthClaims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// JWT Service for generating and validating tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_minutes: u64,
}

impl JwtService {
    pub fn new(secret: &str, token_minutes: u64) -> Self {
        let clamped = token_minutes.clamp(1, MAX_TOKEN_MINUTES);
        if clamped != token_minutes {
            warn!(
                "access_token_minutes {} out of range, using {}",
                token_minutes, clamped
            );
        }
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_minutes: clamped,
        }
    }

    /// Create JwtService from config
    pub fn from_config() -> Self {
        let config = crate::config::get_config();

        let secret = if config.api.jwt_secret.is_empty() {
            warn!("JWT secret not configured, generating a random one for this process");
            crate::utils::generate_random_code(48)
        } else {
            config.api.jwt_secret.clone()
        };

        Self::new(&secret, config.api.access_token_minutes)
    }

    pub fn generate_token(
        &self,
        user_id: i32,
        token_version: i32,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = AuthClaims {
            sub: user_id.to_string(),
            ver: token_version,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.token_minutes as i64)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthClaims, jsonwebtoken::errors::Error> {
        let token_data = decode::<AuthClaims>(token, &self.decoding_key, &Validation::default())?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new("test_secret_key_32_bytes_long!!", 60)
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = create_test_service();
        let token = service.generate_token(42, 3).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.ver, 3);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_invalid_and_foreign_tokens_rejected() {
        let service = create_test_service();
        assert!(service.validate_token("invalid.token.here").is_err());

        let other = JwtService::new("different_secret_key_32_bytes!!", 60);
        let token = other.generate_token(1, 0).unwrap();
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_test_service();
        let now = Utc::now();
        let claims = AuthClaims {
            sub: "7".to_string(),
            ver: 0,
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let key = EncodingKey::from_secret(b"test_secret_key_32_bytes_long!!");
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_huge_lifetime_is_clamped() {
        let service = JwtService::new("test_secret_key_32_bytes_long!!", u64::MAX);
        let token = service.generate_token(1, 0).unwrap();
        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, (MAX_TOKEN_MINUTES * 60) as i64);

        let zero = JwtService::new("test_secret_key_32_bytes_long!!", 0);
        let claims = zero.validate_token(&zero.generate_token(1, 0).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 60);
    }
}
