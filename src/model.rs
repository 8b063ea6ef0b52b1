//! Core domain types for the store.

use crate::Amount;

/// Title identifier, unique within a catalog.
pub type TitleId = u32;

/// Customer identifier, assigned by the caller.
pub type CustomerId = u32;

/// One stocked title.
///
/// Stock only changes through [`Catalog`](crate::Catalog) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    id: TitleId,
    name: String,
    release_year: u16,
    console: String,
    price: Amount,
    stock: u32,
}

impl Listing {
    pub fn new(
        id: TitleId,
        name: impl Into<String>,
        release_year: u16,
        console: impl Into<String>,
        price: Amount,
        stock: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            release_year,
            console: console.into(),
            price,
            stock,
        }
    }

    pub fn id(&self) -> TitleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn release_year(&self) -> u16 {
        self.release_year
    }

    pub fn console(&self) -> &str {
        &self.console
    }

    pub fn price(&self) -> Amount {
        self.price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub(crate) fn restock(&mut self, units: u32) {
        self.stock += units;
    }

    /// Take one unit out of stock. Returns false when already empty.
    pub(crate) fn take_one(&mut self) -> bool {
        match self.stock.checked_sub(1) {
            Some(left) => {
                self.stock = left;
                true
            }
            None => false,
        }
    }
}

/// A title handed in by a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeIn {
    /// Catalog id the traded-in units are stocked under.
    pub new_id: TitleId,
    pub title: String,
    /// Credited to the customer; also the list price if the title is new to the catalog.
    pub price: Amount,
    pub console: String,
    pub release_year: u16,
    pub quantity: u32,
}

/// A validated request supplied by the caller.
#[derive(Debug, Clone)]
pub enum Command {
    /// Register a customer for this session.
    OpenAccount {
        customer: CustomerId,
        name: String,
        address: String,
    },
    /// Manager adds units of a title.
    Stock { listing: Listing },
    /// Manager takes one unit of a title out of the catalog.
    Remove { title: TitleId },
    /// Customer buys one unit of a title.
    Buy { customer: CustomerId, title: TitleId },
    /// Customer trades a title in.
    TradeIn { customer: CustomerId, trade: TradeIn },
}

impl Command {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::OpenAccount { .. } => "open",
            Command::Stock { .. } => "stock",
            Command::Remove { .. } => "remove",
            Command::Buy { .. } => "buy",
            Command::TradeIn { .. } => "trade_in",
        }
    }

    pub fn customer(&self) -> Option<CustomerId> {
        match self {
            Command::OpenAccount { customer, .. }
            | Command::Buy { customer, .. }
            | Command::TradeIn { customer, .. } => Some(*customer),
            Command::Stock { .. } | Command::Remove { .. } => None,
        }
    }

    pub fn title(&self) -> Option<TitleId> {
        match self {
            Command::Stock { listing } => Some(listing.id()),
            Command::Remove { title } | Command::Buy { title, .. } => Some(*title),
            Command::TradeIn { trade, .. } => Some(trade.new_id),
            Command::OpenAccount { .. } => None,
        }
    }
}
