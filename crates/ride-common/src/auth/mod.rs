//! Authentication utilities

mod jwt;
mod password;

pub use jwt::{AccessToken, Claims, JwtService, VerificationClaims, EMAIL_CONFIRMATION};
pub use password::{
    hash_password, validate_password_strength, verify_password, MAX_PASSWORD_LEN,
    MIN_PASSWORD_LEN,
};
