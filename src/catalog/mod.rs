//! Inventory of stocked titles.
//!
//! The catalog is the single source of truth for stock. It enforces a
//! per-title stock cap on every add and deletes a listing once its last unit
//! has been taken out.

use std::collections::HashMap;
use tracing::debug;

use crate::model::{Listing, TitleId};

mod error;
pub use error::CatalogError;

mod shared;
pub use shared::SharedCatalog;

/// Default per-title stock cap.
pub const DEFAULT_STOCK_CAP: u32 = 10;

/// Stocked titles keyed by id, listed in insertion order.
#[derive(Debug, Clone)]
pub struct Catalog {
    listings: HashMap<TitleId, Listing>,
    /// Insertion order of the keys of `listings`
    order: Vec<TitleId>,
    stock_cap: u32,
}

impl Catalog {
    pub fn new() -> Self {
        Self::with_stock_cap(DEFAULT_STOCK_CAP)
    }

    pub fn with_stock_cap(stock_cap: u32) -> Self {
        Self {
            listings: HashMap::new(),
            order: Vec::new(),
            stock_cap,
        }
    }

    pub fn stock_cap(&self) -> u32 {
        self.stock_cap
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Add a listing, or restock an existing one by `listing.stock()` units.
    ///
    /// A restock keeps the existing record's name, price and platform. Nothing
    /// changes if the resulting stock would exceed the cap.
    pub fn add(&mut self, listing: Listing) -> Result<(), CatalogError> {
        let id = listing.id();
        let requested = listing.stock();

        if listing.price().is_negative() {
            return Err(CatalogError::InvalidAmount(id, listing.price()));
        }

        let current = self.listings.get(&id).map_or(0, Listing::stock);
        let within_cap = current
            .checked_add(requested)
            .is_some_and(|total| total <= self.stock_cap);
        if !within_cap {
            return Err(CatalogError::StockLimitExceeded {
                id,
                current,
                requested,
                cap: self.stock_cap,
            });
        }

        match self.listings.get_mut(&id) {
            Some(existing) => {
                if existing.name() != listing.name() {
                    debug!(
                        title = id,
                        stocked = existing.name(),
                        supplied = listing.name(),
                        "restock name differs from stocked listing"
                    );
                }
                existing.restock(requested);
            }
            None => {
                self.order.push(id);
                self.listings.insert(id, listing);
            }
        }

        Ok(())
    }

    pub fn find_by_id(&self, id: TitleId) -> Option<&Listing> {
        self.listings.get(&id)
    }

    /// Take one unit of `id` out of stock.
    ///
    /// Returns false if the title is unknown or has no stock. The record is
    /// deleted together with its last unit.
    pub fn remove_one_unit(&mut self, id: TitleId) -> bool {
        let Some(listing) = self.listings.get_mut(&id) else {
            return false;
        };

        if !listing.take_one() {
            return false;
        }

        if listing.stock() == 0 {
            self.listings.remove(&id);
            self.order.retain(|kept| *kept != id);
        }

        true
    }

    /// Listings in insertion order.
    pub fn list(&self) -> impl Iterator<Item = &Listing> + '_ {
        self.order.iter().filter_map(|id| self.listings.get(id))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
