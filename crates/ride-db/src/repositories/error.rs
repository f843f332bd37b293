//! Error handling utilities for repositories

use ride_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::Database(e.to_string())
}

/// Map a unique violation through `on_unique`, which receives the violated
/// constraint name when Postgres reports one.
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce(Option<&str>) -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique(db_err.constraint());
        }
    }
    DomainError::Database(e.to_string())
}

/// Users have two unique columns; tell them apart by constraint name
pub fn user_conflict(constraint: Option<&str>) -> DomainError {
    match constraint {
        Some(name) if name.contains("username") => DomainError::UsernameAlreadyExists,
        _ => DomainError::EmailAlreadyExists,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_conflict_by_constraint() {
        assert!(matches!(
            user_conflict(Some("users_username_key")),
            DomainError::UsernameAlreadyExists
        ));
        assert!(matches!(
            user_conflict(Some("users_email_key")),
            DomainError::EmailAlreadyExists
        ));
        assert!(matches!(user_conflict(None), DomainError::EmailAlreadyExists));
    }

    #[test]
    fn test_non_database_error_passthrough() {
        let err = map_unique_violation(SqlxError::RowNotFound, |_| DomainError::SlugAlreadyExists);
        assert!(matches!(err, DomainError::Database(_)));
    }
}
