//! Commodities service errors.

use std::num::TryFromIntError;

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommoditiesServiceError {
    #[error("commodity already exists")]
    AlreadyExists,

    #[error("commodity not found")]
    NotFound,

    #[error("category not found")]
    CategoryNotFound,

    #[error("categories nest at most {0} levels deep")]
    CategoryTooDeep(i16),

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("invalid amount")]
    InvalidAmount(#[from] TryFromIntError),
}

impl From<Error> for CommoditiesServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
