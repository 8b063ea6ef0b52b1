use chrono::{Days, NaiveDate};

/// Next-purchase discount eligibility.
///
/// An expired discount is never stored: the check that notices the expiry
/// resets the state to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscountState {
    #[default]
    None,
    Active {
        /// Last day the discount can be used. `None` never expires.
        expires_on: Option<NaiveDate>,
    },
}

impl DiscountState {
    pub fn expires_on(&self) -> Option<NaiveDate> {
        match self {
            DiscountState::None => None,
            DiscountState::Active { expires_on } => *expires_on,
        }
    }

    /// Whether the discount is usable on `today`.
    pub fn is_usable_on(&self, today: NaiveDate) -> bool {
        match self {
            DiscountState::None => false,
            DiscountState::Active { expires_on: None } => true,
            DiscountState::Active {
                expires_on: Some(last_day),
            } => today <= *last_day,
        }
    }
}

/// Size and lifetime of the discount a trade-in earns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountPolicy {
    pub percent: u32,
    pub validity_days: u32,
}

impl DiscountPolicy {
    pub const DEFAULT: DiscountPolicy = DiscountPolicy {
        percent: 10,
        validity_days: 30,
    };

    /// Expiry of a discount granted on `today`.
    pub fn expiry_from(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_days(Days::new(u64::from(self.validity_days)))
            .unwrap_or(NaiveDate::MAX)
    }
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}
