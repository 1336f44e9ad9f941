use std::fmt;

use thiserror::Error;

/// Which kind of named record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    User,
    Sport,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReferenceKind::User => write!(f, "User"),
            ReferenceKind::Sport => write!(f, "Sport"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TourError {
    /// The creation payload could not be read as a tour.
    #[error("{0}")]
    MalformedInput(String),

    /// The payload was well formed but named a user or sport that does not exist.
    #[error("{kind} {name} not found")]
    ReferenceNotFound { kind: ReferenceKind, name: String },

    /// The query parameters matched none of the criteria sets.
    #[error("{0}")]
    InvalidCriteria(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TourError {
    pub fn user_not_found(name: &str) -> TourError {
        TourError::ReferenceNotFound {
            kind: ReferenceKind::User,
            name: name.to_string(),
        }
    }

    pub fn sport_not_found(name: &str) -> TourError {
        TourError::ReferenceNotFound {
            kind: ReferenceKind::Sport,
            name: name.to_string(),
        }
    }

    /// Whether the caller, rather than the store, is at fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, TourError::Store(_))
    }
}

impl From<postgres::Error> for TourError {
    fn from(err: postgres::Error) -> TourError {
        TourError::Store(StoreError::Postgres(err))
    }
}

impl From<r2d2::Error> for TourError {
    fn from(err: r2d2::Error) -> TourError {
        TourError::Store(StoreError::Pool(err))
    }
}

/// Failures of the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Postgres(#[from] postgres::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("tour store lock poisoned")]
    Poisoned,

    #[error("stored tour {0} has no points")]
    Corrupt(i32),
}

pub type Result<T> = std::result::Result<T, TourError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_not_found_names_kind_and_value() {
        let err = TourError::sport_not_found("curling");
        assert_eq!(err.to_string(), "Sport curling not found");
        assert!(err.is_client_error());

        let err = TourError::user_not_found("nobody");
        assert_eq!(err.to_string(), "User nobody not found");
    }

    #[test]
    fn store_faults_are_not_client_errors() {
        let err = TourError::from(StoreError::Poisoned);
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "tour store lock poisoned");
    }
}
