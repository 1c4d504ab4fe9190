use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Role;

/// Lifetime of an issued token. There is no refresh; clients log in again.
pub const TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

const SECRET_BYTES: usize = 32;

/// The payload carried by every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 tokens with a process-wide secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::Config("signing secret cannot be empty".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: i64, role: Role) -> Result<String> {
        self.issue_at(user_id, role, Utc::now())
    }

    fn issue_at(&self, user_id: i64, role: Role, now: DateTime<Utc>) -> Result<String> {
        let ttl = i64::try_from(self.ttl.as_secs())
            .map_err(|_| Error::Config("token ttl out of range".to_string()))?;
        let claims = Claims {
            id: user_id,
            role,
            iat: now.timestamp(),
            exp: now.timestamp() + ttl,
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Checks signature and expiry and returns the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Generates a random hex signing secret for `admin init`.
#[must_use]
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", TOKEN_TTL).unwrap()
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.len(), SECRET_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_issue_then_verify_round_trip() {
        let tokens = service();
        let token = tokens.issue(7, Role::Owner).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.id, 7);
        assert_eq!(claims.role, Role::Owner);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = service();
        let issued = Utc::now() - chrono::Duration::hours(2);
        let token = tokens.issue_at(1, Role::User, issued).unwrap();

        assert!(matches!(tokens.verify(&token), Err(Error::Token(_))));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let other = TokenService::new(b"another-secret", TOKEN_TTL).unwrap();
        let token = other.issue(1, Role::Admin).unwrap();

        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let tokens = service();
        let mut token = tokens.issue(1, Role::User).unwrap();
        token.push('x');

        assert!(tokens.verify(&token).is_err());
        assert!(tokens.verify("not.a.jwt").is_err());
    }

    #[test]
    fn test_empty_secret_is_config_error() {
        assert!(matches!(
            TokenService::new(b"", TOKEN_TTL),
            Err(Error::Config(_))
        ));
    }
}
