//! Error types for customer transactions.

use thiserror::Error;

use crate::Amount;
use crate::catalog::CatalogError;
use crate::model::TitleId;

/// Error returned by [`Account::buy`](super::Account::buy).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuyError {
    #[error("title {0} not found")]
    NotFound(TitleId),

    #[error("title {0} is out of stock")]
    OutOfStock(TitleId),

    #[error("insufficient funds: balance {balance}, needed {needed}")]
    InsufficientFunds { balance: Amount, needed: Amount },
}

/// Error returned by [`Account::trade_in`](super::Account::trade_in).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeInError {
    /// Negative price, zero quantity, or a credit the balance cannot hold.
    #[error("invalid trade-in amount: price {price}, quantity {quantity}")]
    InvalidAmount { price: Amount, quantity: u32 },

    #[error("title {id}: stock {current} + {requested} would exceed the cap of {cap}")]
    StockLimitExceeded {
        id: TitleId,
        current: u32,
        requested: u32,
        cap: u32,
    },
}

impl TradeInError {
    /// Lift a failed catalog add into the trade-in that caused it.
    pub(super) fn from_catalog(error: CatalogError, quantity: u32) -> Self {
        match error {
            CatalogError::StockLimitExceeded {
                id,
                current,
                requested,
                cap,
            } => TradeInError::StockLimitExceeded {
                id,
                current,
                requested,
                cap,
            },
            CatalogError::InvalidAmount(_, price) => TradeInError::InvalidAmount { price, quantity },
        }
    }
}
