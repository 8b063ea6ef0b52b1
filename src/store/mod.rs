//! Command processing for one store session.
//!
//! The store owns the session's shared catalog and its customer accounts and
//! applies validated commands to them one at a time. A failed command is
//! reported and leaves the session unchanged.
//! Also supports async stream of commands.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::account::{Account, Receipt, TradeReceipt};
use crate::catalog::{Catalog, SharedCatalog};
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::model::{Command, CustomerId, Listing, TitleId, TradeIn};

mod error;
pub use error::StoreError;

/// Result of a successfully applied command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Opened(CustomerId),
    Stocked(TitleId),
    Removed(TitleId),
    Purchased(Receipt),
    TradedIn(TradeReceipt),
}

/// A store session.
pub struct Store {
    config: StoreConfig,
    catalog: SharedCatalog,
    accounts: HashMap<CustomerId, Account>,
    /// Customer ids in the order their accounts were opened.
    order: Vec<CustomerId>,
    clock: Arc<dyn Clock>,
}

/// Public API
impl Store {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        let catalog = SharedCatalog::new(Catalog::with_stock_cap(config.stock_cap));
        Self {
            config,
            catalog,
            accounts: HashMap::new(),
            order: Vec::new(),
            clock,
        }
    }

    /// Run the store with the given command stream
    pub async fn run(&mut self, mut stream: impl Stream<Item = Command> + Unpin) {
        while let Some(command) = stream.next().await {
            // a failed command must not stop the session, the result is logged by `apply`
            let _ = self.apply(command);
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Handle on the session catalog, for callers sharing it across threads.
    pub fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    /// Current listings, in insertion order.
    pub fn listings(&self) -> Vec<Listing> {
        self.catalog.snapshot()
    }

    pub fn account(&self, customer: CustomerId) -> Option<&Account> {
        self.accounts.get(&customer)
    }

    /// Mutable access, e.g. to check [`Account::is_discount_active`].
    pub fn account_mut(&mut self, customer: CustomerId) -> Option<&mut Account> {
        self.accounts.get_mut(&customer)
    }

    /// Accounts in the order they were opened.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> + '_ {
        self.order.iter().filter_map(|id| self.accounts.get(id))
    }

    /// Clear every discount that is past its expiry date.
    pub fn expire_discounts(&mut self) {
        for account in self.accounts.values_mut() {
            account.is_discount_active();
        }
    }

    /// Apply a single command on top of the current session state
    pub fn apply(&mut self, command: Command) -> Result<Outcome, StoreError> {
        let kind = command.kind();
        let customer = command.customer();
        let title = command.title();

        let result = match command {
            Command::OpenAccount {
                customer,
                name,
                address,
            } => self.open_account(customer, name, address),
            Command::Stock { listing } => self.stock(listing),
            Command::Remove { title } => self.remove(title),
            Command::Buy { customer, title } => self.buy(customer, title),
            Command::TradeIn { customer, trade } => self.trade_in(customer, trade),
        };

        Self::log_result(kind, customer, title, &result);
        result
    }
}

/// Private API
impl Store {
    /// Small helper to log `apply` results
    fn log_result(
        kind: &str,
        customer: Option<CustomerId>,
        title: Option<TitleId>,
        result: &Result<Outcome, StoreError>,
    ) {
        match result {
            Ok(outcome) => {
                info!(
                    customer = ?customer,
                    title = ?title,
                    outcome = ?outcome,
                    "{kind} applied"
                );
            }
            Err(e) => {
                info!(
                    customer = ?customer,
                    title = ?title,
                    reason = %e,
                    "{kind} skipped"
                );
            }
        }
    }

    fn open_account(
        &mut self,
        customer: CustomerId,
        name: String,
        address: String,
    ) -> Result<Outcome, StoreError> {
        if self.accounts.contains_key(&customer) {
            return Err(StoreError::DuplicateCustomer(customer));
        }

        let account = Account::new(customer, name, address, self.config.opening_balance())
            .with_policy(self.config.discount_policy())
            .with_clock(self.clock.clone());
        self.accounts.insert(customer, account);
        self.order.push(customer);

        Ok(Outcome::Opened(customer))
    }

    fn stock(&mut self, listing: Listing) -> Result<Outcome, StoreError> {
        let id = listing.id();
        self.catalog.with(|catalog| catalog.add(listing))?;
        Ok(Outcome::Stocked(id))
    }

    fn remove(&mut self, title: TitleId) -> Result<Outcome, StoreError> {
        if self.catalog.with(|catalog| catalog.remove_one_unit(title)) {
            Ok(Outcome::Removed(title))
        } else {
            Err(StoreError::NothingToRemove(title))
        }
    }

    fn buy(&mut self, customer: CustomerId, title: TitleId) -> Result<Outcome, StoreError> {
        let account = self
            .accounts
            .get_mut(&customer)
            .ok_or(StoreError::UnknownCustomer(customer))?;

        let receipt = self.catalog.with(|catalog| account.buy(catalog, title))?;
        Ok(Outcome::Purchased(receipt))
    }

    fn trade_in(&mut self, customer: CustomerId, trade: TradeIn) -> Result<Outcome, StoreError> {
        let account = self
            .accounts
            .get_mut(&customer)
            .ok_or(StoreError::UnknownCustomer(customer))?;

        let receipt = self.catalog.with(|catalog| account.trade_in(catalog, trade))?;
        Ok(Outcome::TradedIn(receipt))
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
