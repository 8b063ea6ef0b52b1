//! Error types for command processing.

use thiserror::Error;

use crate::account::{BuyError, TradeInError};
use crate::catalog::CatalogError;
use crate::model::{CustomerId, TitleId};

/// Top-level error returned by [`Store::apply`](super::Store::apply).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("stock failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("buy failed: {0}")]
    Buy(#[from] BuyError),

    #[error("trade-in failed: {0}")]
    TradeIn(#[from] TradeInError),

    #[error("customer {0} not found")]
    UnknownCustomer(CustomerId),

    #[error("customer {0} already exists")]
    DuplicateCustomer(CustomerId),

    #[error("title {0} has no stock to remove")]
    NothingToRemove(TitleId),
}
