//! JWT utilities
//!
//! Two token kinds are signed with the same HS256 secret:
//! - access tokens, sent as `Authorization: Bearer` on every API call;
//! - email confirmation tokens, mailed to new users and exchanged once at
//!   `/users/verify`. Their claims are `{user, exp, type}`.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ride_core::Snowflake;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Discriminator stored in the `type` claim of confirmation tokens
pub const EMAIL_CONFIRMATION: &str = "email_confirmation";

const ACCESS: &str = "access";

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub token_type: String,
}

impl Claims {
    /// # Errors
    /// Returns `InvalidToken` if the subject is not an id
    pub fn user_id(&self) -> Result<Snowflake, AppError> {
        self.sub.parse().map_err(|_| AppError::InvalidToken)
    }

    pub fn is_access_token(&self) -> bool {
        self.token_type == ACCESS
    }
}

/// Email confirmation claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationClaims {
    /// Username being confirmed
    pub user: String,
    pub exp: i64,
    #[serde(rename = "type")]
    pub token_type: String,
}

/// Issued on login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry: i64,
    verification_token_expiry: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_token_expiry: i64, verification_token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry,
            verification_token_expiry,
        }
    }

    /// # Errors
    /// Returns an error if token encoding fails
    pub fn generate_access_token(
        &self,
        user_id: Snowflake,
        username: &str,
    ) -> Result<AccessToken, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            token_type: ACCESS.to_string(),
        };

        Ok(AccessToken {
            access_token: self.sign(&claims)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// # Errors
    /// Returns `TokenExpired` or `InvalidToken`
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims: Claims = decode(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })?;

        if !claims.is_access_token() {
            return Err(AppError::InvalidToken);
        }
        Ok(claims)
    }

    /// Token mailed to a new user to confirm the address
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn generate_verification_token(&self, username: &str) -> Result<String, AppError> {
        let claims = VerificationClaims {
            user: username.to_string(),
            exp: (Utc::now() + Duration::seconds(self.verification_token_expiry)).timestamp(),
            token_type: EMAIL_CONFIRMATION.to_string(),
        };
        self.sign(&claims)
    }

    /// Returns the username carried by a valid confirmation token
    ///
    /// # Errors
    /// Returns a validation error with the message shown to the user
    pub fn validate_verification_token(&self, token: &str) -> Result<String, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims: VerificationClaims = decode(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::Validation("Verification link has expired.".to_string())
                }
                _ => AppError::Validation("Invalid token.".to_string()),
            })?;

        if claims.token_type != EMAIL_CONFIRMATION {
            return Err(AppError::Validation("Invalid token.".to_string()));
        }
        Ok(claims.user)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode JWT: {e}")))
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("verification_token_expiry", &self.verification_token_expiry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough";

    fn service() -> JwtService {
        JwtService::new(SECRET, 3600, 259_200)
    }

    fn validation_message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_access_token_roundtrip() {
        let jwt = service();
        let token = jwt.generate_access_token(Snowflake::new(42), "ana.rides").unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);

        let claims = jwt.validate_access_token(&token.access_token).unwrap();
        assert_eq!(claims.user_id().unwrap(), Snowflake::new(42));
        assert_eq!(claims.username, "ana.rides");
    }

    #[test]
    fn test_verification_token_roundtrip() {
        let jwt = service();
        let token = jwt.generate_verification_token("ana.rides").unwrap();
        assert_eq!(jwt.validate_verification_token(&token).unwrap(), "ana.rides");
    }

    #[test]
    fn test_verification_token_is_not_an_access_token() {
        let jwt = service();
        let token = jwt.generate_verification_token("ana.rides").unwrap();
        assert!(matches!(
            jwt.validate_access_token(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_access_token_is_not_a_verification_token() {
        let jwt = service();
        let token = jwt.generate_access_token(Snowflake::new(1), "ana.rides").unwrap();
        let err = jwt.validate_verification_token(&token.access_token).unwrap_err();
        assert_eq!(validation_message(err), "Invalid token.");
    }

    #[test]
    fn test_expired_verification_token() {
        let jwt = JwtService::new(SECRET, 3600, -3 * 24 * 60 * 60 - 1);
        let token = jwt.generate_verification_token("ana.rides").unwrap();
        let err = jwt.validate_verification_token(&token).unwrap_err();
        assert_eq!(validation_message(err), "Verification link has expired.");
    }

    #[test]
    fn test_wrong_type_claim_rejected() {
        let jwt = service();
        let forged = VerificationClaims {
            user: "ana.rides".to_string(),
            exp: (Utc::now() + Duration::days(1)).timestamp(),
            token_type: "password_reset".to_string(),
        };
        let token = jwt.sign(&forged).unwrap();
        let err = jwt.validate_verification_token(&token).unwrap_err();
        assert_eq!(validation_message(err), "Invalid token.");
    }

    #[test]
    fn test_malformed_and_foreign_tokens() {
        let jwt = service();
        let err = jwt.validate_verification_token("not.a.token").unwrap_err();
        assert_eq!(validation_message(err), "Invalid token.");

        let other = JwtService::new("another-secret-key-that-is-long-enough", 3600, 3600);
        let token = other.generate_verification_token("ana.rides").unwrap();
        assert!(jwt.validate_verification_token(&token).is_err());
    }
}
