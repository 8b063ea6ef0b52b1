//! Customer accounts and the purchase / trade-in transactions.
//!
//! An account owns its balance, its purchase and trade-in history and its
//! discount state. The catalog is borrowed for the length of one transaction.
//! Every check runs before the first mutation, so a failed transaction leaves
//! both the account and the catalog as they were.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::Amount;
use crate::catalog::Catalog;
use crate::clock::{Clock, SystemClock};
use crate::model::{CustomerId, Listing, TitleId, TradeIn};

mod state;
pub use state::{DiscountPolicy, DiscountState};

mod error;
pub use error::{BuyError, TradeInError};

/// Outcome of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub title: String,
    pub list_price: Amount,
    pub effective_price: Amount,
    pub discount_applied: bool,
    pub remaining_balance: Amount,
}

/// Outcome of a successful trade-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeReceipt {
    pub new_balance: Amount,
    pub discount_expires_on: NaiveDate,
}

/// A customer account.
#[derive(Debug, Clone)]
pub struct Account {
    id: CustomerId,
    name: String,
    address: String,
    balance: Amount,
    purchases: Vec<String>,
    trade_ins: Vec<String>,
    discount: DiscountState,
    policy: DiscountPolicy,
    clock: Arc<dyn Clock>,
}

/// Public API
impl Account {
    /// Open an account on the system clock with the default discount policy.
    pub fn new(
        id: CustomerId,
        name: impl Into<String>,
        address: impl Into<String>,
        opening_balance: Amount,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
            balance: opening_balance,
            purchases: Vec::new(),
            trade_ins: Vec::new(),
            discount: DiscountState::None,
            policy: DiscountPolicy::DEFAULT,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: DiscountPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Names of purchased titles, oldest first.
    pub fn purchases(&self) -> &[String] {
        &self.purchases
    }

    /// Names of traded-in titles, oldest first.
    pub fn trade_ins(&self) -> &[String] {
        &self.trade_ins
    }

    /// Stored discount state, without expiring it.
    pub fn discount(&self) -> DiscountState {
        self.discount
    }

    /// Whether the next purchase gets the trade-in discount.
    ///
    /// This is an observer with a side effect: a discount found to be past its
    /// expiry date is cleared here, and stays cleared.
    pub fn is_discount_active(&mut self) -> bool {
        if self.discount.is_usable_on(self.clock.today()) {
            return true;
        }
        if self.discount != DiscountState::None {
            debug!(customer = self.id, "trade-in discount expired");
            self.discount = DiscountState::None;
        }
        false
    }

    /// Buy one unit of `title` from `catalog`.
    ///
    /// - Ensure the title exists and has stock
    /// - Price it, with the trade-in discount if one is active
    /// - Ensure the balance covers the price
    /// - Debit, record the purchase, take the unit out of stock and consume the discount
    pub fn buy(&mut self, catalog: &mut Catalog, title: TitleId) -> Result<Receipt, BuyError> {
        let listing = catalog.find_by_id(title).ok_or(BuyError::NotFound(title))?;
        if listing.stock() == 0 {
            return Err(BuyError::OutOfStock(title));
        }
        let list_price = listing.price();
        let name = listing.name().to_owned();

        let discount_applied = self.is_discount_active();
        let effective_price = if discount_applied {
            list_price.less_percent(self.policy.percent)
        } else {
            list_price
        };

        if self.balance < effective_price {
            return Err(BuyError::InsufficientFunds {
                balance: self.balance,
                needed: effective_price,
            });
        }

        // stock was checked above and the catalog is exclusively borrowed
        let removed = catalog.remove_one_unit(title);
        debug_assert!(removed);

        self.balance -= effective_price;
        self.purchases.push(name.clone());
        if discount_applied {
            self.discount = DiscountState::None;
        }

        debug!(
            customer = self.id,
            title,
            price = %effective_price,
            discount_applied,
            "purchase committed"
        );

        Ok(Receipt {
            title: name,
            list_price,
            effective_price,
            discount_applied,
            remaining_balance: self.balance,
        })
    }

    /// Trade a title in.
    ///
    /// - Ensure price is non-negative, quantity at least 1 and the credit fits the balance
    /// - Stock the units in `catalog` under `trade.new_id` (may hit the stock cap)
    /// - Record the trade-in, credit the price and (re)start the discount window
    pub fn trade_in(
        &mut self,
        catalog: &mut Catalog,
        trade: TradeIn,
    ) -> Result<TradeReceipt, TradeInError> {
        let invalid = TradeInError::InvalidAmount {
            price: trade.price,
            quantity: trade.quantity,
        };
        if trade.price.is_negative() || trade.quantity == 0 {
            return Err(invalid);
        }
        let new_balance = self.balance.checked_add(trade.price).ok_or(invalid)?;

        let TradeIn {
            new_id,
            title,
            price,
            console,
            release_year,
            quantity,
        } = trade;

        catalog
            .add(Listing::new(
                new_id,
                title.clone(),
                release_year,
                console,
                price,
                quantity,
            ))
            .map_err(|error| TradeInError::from_catalog(error, quantity))?;

        let expires_on = self.policy.expiry_from(self.clock.today());
        self.trade_ins.push(title);
        self.balance = new_balance;
        self.discount = DiscountState::Active {
            expires_on: Some(expires_on),
        };

        debug!(
            customer = self.id,
            title = new_id,
            credit = %price,
            %expires_on,
            "trade-in committed"
        );

        Ok(TradeReceipt {
            new_balance: self.balance,
            discount_expires_on: expires_on,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    // test utils

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(today()))
    }

    fn account(clock: &Arc<ManualClock>) -> Account {
        Account::new(7, "Sam", "1 High Street", Amount::from_cents(10_000))
            .with_clock(clock.clone())
    }

    fn catalog_with(id: TitleId, cents: i64, stock: u32) -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .add(Listing::new(id, format!("Game {id}"), 2010, "Wii", Amount::from_cents(cents), stock))
            .unwrap();
        catalog
    }

    fn trade(name: &str, cents: i64) -> TradeIn {
        TradeIn {
            new_id: 9000,
            title: name.to_string(),
            price: Amount::from_cents(cents),
            console: "PS4".to_string(),
            release_year: 2015,
            quantity: 1,
        }
    }

    #[test]
    fn new_account() {
        let account = Account::new(1, "Ann", "Somewhere", Amount::from_cents(10_000));
        assert_eq!(account.balance(), Amount::from_cents(10_000));
        assert!(account.purchases().is_empty());
        assert!(account.trade_ins().is_empty());
        assert_eq!(account.discount(), DiscountState::None);
    }

    // buy

    #[test]
    fn buy_debits_and_decrements_stock() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = catalog_with(1, 3300, 3);

        let receipt = account.buy(&mut catalog, 1).unwrap();

        assert_eq!(receipt.title, "Game 1");
        assert_eq!(receipt.effective_price, Amount::from_cents(3300));
        assert!(!receipt.discount_applied);
        assert_eq!(receipt.remaining_balance, Amount::from_cents(6700));
        assert_eq!(account.balance(), Amount::from_cents(6700));
        assert_eq!(account.purchases(), ["Game 1"]);
        assert_eq!(catalog.find_by_id(1).unwrap().stock(), 2);
    }

    #[test]
    fn buy_exact_balance_succeeds() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = catalog_with(1, 10_000, 1);

        account.buy(&mut catalog, 1).unwrap();
        assert_eq!(account.balance(), Amount::ZERO);
        assert!(catalog.find_by_id(1).is_none());
    }

    #[test]
    fn buy_unknown_title_fails_without_mutation() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = catalog_with(1, 3300, 3);

        let result = account.buy(&mut catalog, 99);
        assert_eq!(result, Err(BuyError::NotFound(99)));

        assert_eq!(account.balance(), Amount::from_cents(10_000));
        assert!(account.purchases().is_empty());
        assert_eq!(catalog.find_by_id(1).unwrap().stock(), 3);
    }

    #[test]
    fn buy_out_of_stock_fails_without_mutation() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = catalog_with(1, 3300, 0);

        let result = account.buy(&mut catalog, 1);
        assert_eq!(result, Err(BuyError::OutOfStock(1)));

        assert_eq!(account.balance(), Amount::from_cents(10_000));
        assert!(account.purchases().is_empty());
        assert_eq!(catalog.find_by_id(1).unwrap().stock(), 0);
    }

    #[test]
    fn buy_insufficient_funds_fails_without_mutation() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = catalog_with(1, 10_001, 2);

        let result = account.buy(&mut catalog, 1);
        assert_eq!(
            result,
            Err(BuyError::InsufficientFunds {
                balance: Amount::from_cents(10_000),
                needed: Amount::from_cents(10_001),
            })
        );

        assert_eq!(account.balance(), Amount::from_cents(10_000));
        assert!(account.purchases().is_empty());
        assert_eq!(catalog.find_by_id(1).unwrap().stock(), 2);
    }

    #[test]
    fn insufficient_funds_keeps_an_unused_discount() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = catalog_with(1, 50_000, 2);
        account.trade_in(&mut catalog, trade("Old", 0)).unwrap();

        assert!(account.buy(&mut catalog, 1).is_err());
        assert!(account.is_discount_active());
    }

    // discount

    #[test]
    fn discounted_price_is_ten_percent_off() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = catalog_with(1, 5000, 1);
        account.trade_in(&mut catalog, trade("Old", 0)).unwrap();

        let receipt = account.buy(&mut catalog, 1).unwrap();
        assert!(receipt.discount_applied);
        assert_eq!(receipt.list_price, Amount::from_cents(5000));
        assert_eq!(receipt.effective_price, Amount::from_cents(4500));
    }

    #[test]
    fn discounted_price_rounds_half_up() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = catalog_with(1, 3333, 1);
        account.trade_in(&mut catalog, trade("Old", 0)).unwrap();

        let receipt = account.buy(&mut catalog, 1).unwrap();
        assert_eq!(receipt.effective_price, Amount::from_cents(3000));
    }

    #[test]
    fn discount_is_consumed_exactly_once() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = catalog_with(1, 1000, 3);

        account.trade_in(&mut catalog, trade("Old", 0)).unwrap();
        assert!(account.is_discount_active());

        let first = account.buy(&mut catalog, 1).unwrap();
        assert!(first.discount_applied);
        assert!(!account.is_discount_active());

        let second = account.buy(&mut catalog, 1).unwrap();
        assert!(!second.discount_applied);
        assert_eq!(second.effective_price, Amount::from_cents(1000));
        assert!(!account.is_discount_active());
    }

    #[test]
    fn custom_policy_percent() {
        let clock = clock();
        let mut account = account(&clock).with_policy(DiscountPolicy {
            percent: 25,
            validity_days: 30,
        });
        let mut catalog = catalog_with(1, 2000, 1);
        account.trade_in(&mut catalog, trade("Old", 0)).unwrap();

        let receipt = account.buy(&mut catalog, 1).unwrap();
        assert_eq!(receipt.effective_price, Amount::from_cents(1500));
    }

    #[test]
    fn open_ended_discount_never_expires() {
        let clock = clock();
        let mut account = account(&clock);
        account.discount = DiscountState::Active { expires_on: None };

        clock.advance(10_000);
        assert!(account.is_discount_active());
    }

    // expiry

    #[test]
    fn discount_usable_on_last_day() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = catalog_with(1, 1000, 1);
        account.trade_in(&mut catalog, trade("Old", 0)).unwrap();

        clock.advance(30);
        assert!(account.is_discount_active());
    }

    #[test]
    fn expired_discount_clears_and_stays_cleared() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = catalog_with(1, 1000, 1);
        let receipt = account.trade_in(&mut catalog, trade("Old", 0)).unwrap();

        clock.advance(31);
        assert!(clock.today() > receipt.discount_expires_on);
        assert!(!account.is_discount_active());
        assert_eq!(account.discount(), DiscountState::None);

        // moving the clock back does not bring it back
        clock.set(today());
        assert!(!account.is_discount_active());
    }

    #[test]
    fn expired_discount_is_not_applied_to_purchase() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = catalog_with(1, 1000, 1);
        account.trade_in(&mut catalog, trade("Old", 0)).unwrap();

        clock.advance(45);
        let receipt = account.buy(&mut catalog, 1).unwrap();
        assert!(!receipt.discount_applied);
        assert_eq!(receipt.effective_price, Amount::from_cents(1000));
    }

    // trade_in

    #[test]
    fn trade_in_credits_and_stocks() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = Catalog::new();

        let receipt = account.trade_in(&mut catalog, trade("Old Game", 2000)).unwrap();

        assert_eq!(receipt.new_balance, Amount::from_cents(12_000));
        assert_eq!(
            receipt.discount_expires_on,
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()
        );
        assert_eq!(account.trade_ins(), ["Old Game"]);

        let listing = catalog.find_by_id(9000).unwrap();
        assert_eq!(listing.name(), "Old Game");
        assert_eq!(listing.stock(), 1);
        assert_eq!(listing.price(), Amount::from_cents(2000));
    }

    #[test]
    fn trade_in_restocks_existing_title() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = catalog_with(9000, 4000, 2);

        let mut traded = trade("Game 9000", 1500);
        traded.quantity = 2;
        account.trade_in(&mut catalog, traded).unwrap();

        let listing = catalog.find_by_id(9000).unwrap();
        assert_eq!(listing.stock(), 4);
        assert_eq!(listing.price(), Amount::from_cents(4000));
    }

    #[test]
    fn second_trade_in_resets_window() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = Catalog::new();

        account.trade_in(&mut catalog, trade("A", 100)).unwrap();
        clock.advance(20);
        let receipt = account.trade_in(&mut catalog, trade("B", 100)).unwrap();

        assert_eq!(
            receipt.discount_expires_on,
            NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()
        );
        assert_eq!(
            account.discount(),
            DiscountState::Active {
                expires_on: Some(receipt.discount_expires_on)
            }
        );

        // still a single 10% discount
        let mut shop = catalog_with(1, 1000, 2);
        assert_eq!(
            account.buy(&mut shop, 1).unwrap().effective_price,
            Amount::from_cents(900)
        );
        assert!(!account.is_discount_active());
    }

    #[test]
    fn trade_in_negative_price_fails() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = Catalog::new();

        let result = account.trade_in(&mut catalog, trade("Old", -1));
        assert_eq!(
            result,
            Err(TradeInError::InvalidAmount {
                price: Amount::from_cents(-1),
                quantity: 1
            })
        );

        assert_eq!(account.balance(), Amount::from_cents(10_000));
        assert!(account.trade_ins().is_empty());
        assert!(!account.is_discount_active());
        assert!(catalog.is_empty());
    }

    #[test]
    fn trade_in_zero_quantity_fails() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = Catalog::new();

        let mut traded = trade("Old", 100);
        traded.quantity = 0;
        let result = account.trade_in(&mut catalog, traded);
        assert_eq!(
            result,
            Err(TradeInError::InvalidAmount {
                price: Amount::from_cents(100),
                quantity: 0
            })
        );
        assert!(catalog.is_empty());
        assert!(!account.is_discount_active());
    }

    #[test]
    fn trade_in_credit_overflow_fails_without_mutation() {
        let clock = clock();
        let mut account = Account::new(7, "Sam", "1 High Street", Amount::from_cents(i64::MAX - 10))
            .with_clock(clock.clone());
        let mut catalog = Catalog::new();

        let result = account.trade_in(&mut catalog, trade("Old", 11));
        assert_eq!(
            result,
            Err(TradeInError::InvalidAmount {
                price: Amount::from_cents(11),
                quantity: 1
            })
        );

        assert_eq!(account.balance(), Amount::from_cents(i64::MAX - 10));
        assert!(account.trade_ins().is_empty());
        assert_eq!(account.discount(), DiscountState::None);
        assert!(catalog.is_empty());

        // the largest credit that still fits goes through
        let receipt = account.trade_in(&mut catalog, trade("Old", 10)).unwrap();
        assert_eq!(receipt.new_balance, Amount::from_cents(i64::MAX));
    }

    #[test]
    fn trade_in_over_stock_cap_fails_without_mutation() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = catalog_with(9000, 1000, 10);

        let result = account.trade_in(&mut catalog, trade("Game 9000", 500));
        assert!(matches!(
            result,
            Err(TradeInError::StockLimitExceeded {
                id: 9000,
                current: 10,
                requested: 1,
                cap: 10
            })
        ));

        assert_eq!(account.balance(), Amount::from_cents(10_000));
        assert!(account.trade_ins().is_empty());
        assert_eq!(account.discount(), DiscountState::None);
        assert_eq!(catalog.find_by_id(9000).unwrap().stock(), 10);
    }

    // end to end

    #[test]
    fn buy_trade_buy_scenario() {
        let clock = clock();
        let mut account = account(&clock);
        let mut catalog = catalog_with(1234, 3300, 3);

        let first = account.buy(&mut catalog, 1234).unwrap();
        assert_eq!(first.effective_price, Amount::from_cents(3300));
        assert_eq!(catalog.find_by_id(1234).unwrap().stock(), 2);
        assert_eq!(account.balance(), Amount::from_cents(6700));

        let traded = account.trade_in(&mut catalog, trade("Old Game", 2000)).unwrap();
        assert_eq!(traded.new_balance, Amount::from_cents(8700));
        assert!(account.is_discount_active());
        assert_eq!(
            traded.discount_expires_on,
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()
        );

        let second = account.buy(&mut catalog, 1234).unwrap();
        assert!(second.discount_applied);
        assert_eq!(second.effective_price, Amount::from_cents(2970));
        assert_eq!(second.remaining_balance, Amount::from_cents(5730));
        assert!(!account.is_discount_active());
        assert_eq!(catalog.find_by_id(1234).unwrap().stock(), 1);
        assert_eq!(account.purchases(), ["Game 1234", "Game 1234"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn balance_moves_by_exactly_the_effective_price(
                prices in proptest::collection::vec(0i64..6000, 1..20),
                trade_every in 1usize..5,
            ) {
                let clock = clock();
                let mut account = account(&clock);
                let mut catalog = Catalog::with_stock_cap(u32::MAX);
                for (i, cents) in prices.iter().enumerate() {
                    catalog
                        .add(Listing::new(i as TitleId, "G", 2000, "PC", Amount::from_cents(*cents), 1))
                        .unwrap();
                }

                for (i, _) in prices.iter().enumerate() {
                    if i % trade_every == 0 {
                        let mut traded = trade("T", 0);
                        traded.new_id = 100_000;
                        account.trade_in(&mut catalog, traded).unwrap();
                    }
                    let before = account.balance();
                    match account.buy(&mut catalog, i as TitleId) {
                        Ok(receipt) => {
                            prop_assert_eq!(account.balance(), before - receipt.effective_price);
                            prop_assert!(receipt.effective_price <= receipt.list_price);
                        }
                        Err(_) => {
                            prop_assert_eq!(account.balance(), before);
                        }
                    }
                    prop_assert!(!account.balance().is_negative());
                }
            }
        }
    }
}
