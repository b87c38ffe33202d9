//! Business workflows shared by the admin pages and the JSON API.

use thiserror::Error;

use crate::domain::foster_interval::FosterIntervalError;
use crate::forms::FormError;
use crate::repository::errors::RepositoryError;

pub mod auth;
pub mod clients;
pub mod fosters;
pub mod pets;
pub mod stats;
pub mod users;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("the record was changed by someone else, reload and try again")]
    Conflict,

    #[error("{0}")]
    Form(String),

    #[error(transparent)]
    FosterInterval(#[from] FosterIntervalError),

    #[error("{0}")]
    TypeConstraint(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Conflict => ServiceError::Conflict,
            RepositoryError::ConstraintViolation(message) => ServiceError::Form(message),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}

/// Builds a signed-in principal with the given role for service tests.
#[cfg(test)]
pub(crate) fn test_user(role: crate::domain::user::UserRole) -> crate::auth::AuthenticatedUser {
    crate::auth::AuthenticatedUser {
        sub: "9f1c4c3e-2b7a-4d2e-9a57-0c8f8f0b6d11".to_string(),
        email: "staff@example.com".to_string(),
        name: "Staff".to_string(),
        role,
        exp: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_errors_map_to_service_errors() {
        assert!(matches!(
            ServiceError::from(RepositoryError::NotFound),
            ServiceError::NotFound
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::Conflict),
            ServiceError::Conflict
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::ConstraintViolation("dup".into())),
            ServiceError::Form(message) if message == "dup"
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::ConnectionError("down".into())),
            ServiceError::Internal(_)
        ));
    }

    #[test]
    fn interval_errors_keep_their_reason() {
        let err = ServiceError::from(FosterIntervalError::PeriodTooShort);
        assert_eq!(err.to_string(), "Foster period must be at least 14 Days.");
    }
}
