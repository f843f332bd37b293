//! Password hashing and validation
//!
//! Hashes are Argon2id PHC strings.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 64;

const COMMON_PASSWORDS: &[&str] = &[
    "123456", "1234567", "12345678", "123456789", "password", "password1", "qwerty", "qwerty123",
    "abc123", "111111", "123123", "iloveyou", "admin", "welcome", "monkey", "dragon", "letmein",
    "football", "sunshine", "princess", "master", "000000", "passw0rd", "contrasena",
];

/// # Errors
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
}

/// # Errors
/// Returns an error if the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Reject passwords that are too short or long, entirely numeric, common,
/// or the same as the username.
///
/// # Errors
/// Returns a validation error describing the first failed rule
pub fn validate_password_strength(password: &str, username: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Ensure this field has no more than {MAX_PASSWORD_LEN} characters."
        )));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "This password is entirely numeric.".to_string(),
        ));
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        return Err(AppError::Validation("This password is too common.".to_string()));
    }
    if !username.is_empty() && lowered == username.to_lowercase() {
        return Err(AppError::Validation(
            "The password is too similar to the username.".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<(), AppError>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("viaje-seguro-7").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("viaje-seguro-7", &hash).unwrap());
        assert!(!verify_password("viaje-seguro-8", &hash).unwrap());
        assert_ne!(hash, hash_password("viaje-seguro-7").unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("whatever", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_strength_accepts_reasonable_passwords() {
        assert!(validate_password_strength("viaje-seguro-7", "ana.rides").is_ok());
        assert!(validate_password_strength("Abc12!", "ana.rides").is_ok());
    }

    #[test]
    fn test_strength_length_bounds() {
        assert!(message(validate_password_strength("ab1", "ana")).contains("too short"));
        let long = "a1".repeat(33);
        assert!(message(validate_password_strength(&long, "ana")).contains("no more than 64"));
    }

    #[test]
    fn test_strength_rejects_numeric_common_and_username() {
        assert_eq!(
            message(validate_password_strength("98765432", "ana")),
            "This password is entirely numeric."
        );
        assert_eq!(
            message(validate_password_strength("Password1", "ana")),
            "This password is too common."
        );
        assert_eq!(
            message(validate_password_strength("Ana.Rides", "ana.rides")),
            "The password is too similar to the username."
        );
    }
}
