//! Orders service errors.

use std::{fmt, num::TryFromIntError};

use emporium::bill::BillError;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    database::DeadlineExceeded,
    domain::{commodities::records::CommodityId, orders::records::OrderNo},
};

/// SQLSTATE raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";

/// SQLSTATE raised when `statement_timeout` expires.
const QUERY_CANCELED: &str = "57014";

const DEADLOCK_DETECTED: &str = "40P01";
const SERIALIZATION_FAILURE: &str = "40001";

/// How a caller should react to an [`OrdersServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad or unauthorized input. Never retried.
    Validation,

    /// A business rule stopped the operation; the client has to change something.
    Conflict,

    /// Nothing was committed; the whole operation can be retried.
    Infrastructure,

    /// A committed operation left state needing out-of-band repair.
    Reconciliation,
}

impl ErrorClass {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::Infrastructure => "infrastructure",
            Self::Reconciliation => "reconciliation",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("selected cart items belong to another user")]
    CartItemsNotOwned,

    #[error("selected cart items no longer exist")]
    CartItemsGone,

    #[error("nothing to bill")]
    EmptyBill,

    #[error("shipping address not found")]
    AddressNotOwned,

    #[error("order not found")]
    OrderNotFound,

    #[error("invalid data")]
    InvalidData,

    #[error("invalid amount")]
    InvalidAmount(#[from] TryFromIntError),

    #[error("commodity {commodity} has {available} in stock, {requested} requested")]
    StockExhausted {
        commodity: CommodityId,
        requested: u32,
        available: u32,
    },

    #[error("order can no longer be changed")]
    OrderCannotBeChanged,

    #[error("order number already taken")]
    OrderNoCollision,

    #[error("operation did not finish in time")]
    DeadlineExceeded(#[from] DeadlineExceeded),

    #[error("database timed out waiting")]
    Timeout(#[source] Error),

    #[error("transaction lost a race with another transaction")]
    Contention(#[source] Error),

    #[error("failed to compute bill")]
    Bill(#[from] BillError),

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("stock of cancelled order {order_no} was not restored")]
    StockNotRestored {
        order_no: OrderNo,

        #[source]
        source: Box<OrdersServiceError>,
    },
}

impl OrdersServiceError {
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::CartItemsNotOwned
            | Self::CartItemsGone
            | Self::EmptyBill
            | Self::AddressNotOwned
            | Self::OrderNotFound
            | Self::InvalidData
            | Self::InvalidAmount(_) => ErrorClass::Validation,
            Self::Bill(BillError::Lookup { .. }) => ErrorClass::Infrastructure,
            Self::Bill(_) => ErrorClass::Validation,
            Self::StockExhausted { .. } | Self::OrderCannotBeChanged => ErrorClass::Conflict,
            Self::OrderNoCollision
            | Self::DeadlineExceeded(_)
            | Self::Timeout(_)
            | Self::Contention(_)
            | Self::Sql(_) => ErrorClass::Infrastructure,
            Self::StockNotRestored { .. } => ErrorClass::Reconciliation,
        }
    }

    /// Whether repeating the whole operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Infrastructure
    }
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::OrderNotFound;
        }

        let code = error
            .as_database_error()
            .and_then(DatabaseError::code)
            .map(|code| code.into_owned());

        match code.as_deref() {
            Some(LOCK_NOT_AVAILABLE | QUERY_CANCELED) => return Self::Timeout(error),
            Some(DEADLOCK_DETECTED | SERIALIZATION_FAILURE) => return Self::Contention(error),
            _ => {}
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::OrderNoCollision,
            Some(
                ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation,
            ) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
