use std::fmt;

/// Currency amount with 2 decimal places, stored as integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    const SCALE: i64 = 100;

    pub const ZERO: Amount = Amount(0);

    /// Largest magnitude, in cents, a float converts to exactly.
    const MAX_FLOAT_CENTS: f64 = (1u64 << 53) as f64;

    /// Convert a decimal value, rounding to the cent.
    ///
    /// Returns `None` for NaN, infinities and values too large to hold exactly.
    pub fn try_from_float(value: f64) -> Option<Self> {
        let cents = (value * Self::SCALE as f64).round();
        if !cents.is_finite() || cents.abs() > Self::MAX_FLOAT_CENTS {
            return None;
        }
        Some(Amount(cents as i64))
    }

    pub const fn from_cents(cents: i64) -> Self {
        Amount(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Take `percent` off this amount, rounding half-up to the cent.
    ///
    /// Halves round away from zero, so `33.33` at 10% off is `30.00`
    /// (29.997 rounds up).
    pub fn less_percent(self, percent: u32) -> Self {
        let keep = 100 - i128::from(percent.min(100));
        let scaled = i128::from(self.0) * keep;
        let rounded = if scaled >= 0 {
            (scaled + 50) / 100
        } else {
            (scaled - 50) / 100
        };
        Amount(rounded as i64)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        let whole = abs / Self::SCALE;
        let frac = abs % Self::SCALE;
        write!(f, "{sign}{whole}.{frac:02}")
    }
}

impl std::ops::Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}
