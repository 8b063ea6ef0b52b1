//! Source of "today" for discount expiry.

use std::fmt;

use chrono::{Days, Local, NaiveDate};
use parking_lot::Mutex;

/// Provides the current calendar date.
pub trait Clock: fmt::Debug + Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The local calendar date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    today: Mutex<NaiveDate>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.today.lock() = date;
    }

    /// Move the clock forward by `days`, saturating at the last representable date.
    pub fn advance(&self, days: u64) {
        let mut today = self.today.lock();
        *today = today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock()
    }
}
