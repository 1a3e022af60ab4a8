//! Carts service errors.

use emporium::bill::BillError;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::commodities::records::CommodityId;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("cart item not found")]
    NotFound,

    #[error("cart item belongs to another user")]
    NotOwned,

    #[error("commodity {0} not found or not on sale")]
    CommodityNotFound(CommodityId),

    #[error("quantity {quantity} outside 1..={max}")]
    InvalidQuantity { quantity: u32, max: u32 },

    #[error("cart line would hold more than {0} units")]
    LineLimitExceeded(u32),

    #[error("not enough stock of commodity {0}")]
    StockExhausted(CommodityId),

    #[error("no cart items selected")]
    NothingSelected,

    #[error("failed to compute bill")]
    Bill(#[from] BillError),

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
