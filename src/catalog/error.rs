//! Error types for catalog maintenance.

use thiserror::Error;

use crate::Amount;
use crate::model::TitleId;

/// Error returned by [`Catalog::add`](super::Catalog::add).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("title {id}: stock {current} + {requested} would exceed the cap of {cap}")]
    StockLimitExceeded {
        id: TitleId,
        current: u32,
        requested: u32,
        cap: u32,
    },

    #[error("title {0}: invalid price {1}")]
    InvalidAmount(TitleId, Amount),
}
