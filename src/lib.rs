pub mod account;
pub mod amount;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod csv;
pub mod model;
pub mod store;

pub use account::{Account, BuyError, Receipt, TradeInError, TradeReceipt};
pub use amount::Amount;
pub use catalog::{Catalog, CatalogError, SharedCatalog};
pub use config::StoreConfig;
pub use model::{Command, CustomerId, Listing, TitleId, TradeIn};
pub use store::{Outcome, Store, StoreError};
