use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MoneyError {
    #[error("amount cannot be empty")]
    Empty,

    #[error("invalid amount: {raw}")]
    Invalid { raw: String },

    #[error("amount has more than two decimal places: {raw}")]
    TooPrecise { raw: String },

    #[error("amount is out of range")]
    Overflow,

    #[error("rate per minute must be > 0")]
    NonPositiveRate,
}

//
// ─── MONEY ─────────────────────────────────────────────────────────────────────
//

/// A currency amount stored as whole cents.
///
/// Signed so that an overspent balance can still be represented and shown.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Whole currency units, e.g. `Money::from_units(5)` is `$5.00`.
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Multiply by an integer count, saturating on overflow.
    #[must_use]
    pub fn times(self, count: u64) -> Self {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        Self(self.0.saturating_mul(count))
    }

    /// Clamp negative amounts to zero for presentation.
    #[must_use]
    pub fn clamp_zero(self) -> Self {
        Self(self.0.max(0))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    /// Parses `"12"`, `"12.5"`, `"12.50"` and `"$12.50"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MoneyError::Empty);
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let unsigned = unsigned.strip_prefix('$').unwrap_or(unsigned);

        let invalid = || MoneyError::Invalid { raw: s.to_string() };

        let (whole, frac) = match unsigned.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (unsigned, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if frac.len() > 2 {
            return Err(MoneyError::TooPrecise { raw: s.to_string() });
        }

        let units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| MoneyError::Overflow)?
        };
        let cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or(MoneyError::Overflow)?;
        Ok(Money(if negative { -total } else { total }))
    }
}

//
// ─── RATE ──────────────────────────────────────────────────────────────────────
//

/// A strictly positive per-minute price for a reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Money", into = "Money")]
pub struct RatePerMinute(Money);

impl RatePerMinute {
    /// # Errors
    ///
    /// Returns `MoneyError::NonPositiveRate` if `per_minute` is zero or negative.
    pub fn new(per_minute: Money) -> Result<Self, MoneyError> {
        if !per_minute.is_positive() {
            return Err(MoneyError::NonPositiveRate);
        }
        Ok(Self(per_minute))
    }

    #[must_use]
    pub fn per_minute(self) -> Money {
        self.0
    }

    /// Cost of `minutes` whole minutes at this rate.
    #[must_use]
    pub fn cost_for_minutes(self, minutes: u64) -> Money {
        self.0.times(minutes)
    }

    /// Continuous cost of `seconds`, rounded down to the cent.
    #[must_use]
    pub fn cost_for_seconds(self, seconds: u64) -> Money {
        let cents = i128::from(self.0.cents()) * i128::from(seconds) / 60;
        Money::from_cents(i64::try_from(cents).unwrap_or(i64::MAX))
    }

    /// How many whole seconds `balance` buys: `floor(balance / (rate / 60))`.
    ///
    /// Negative balances buy a negative number of seconds.
    #[must_use]
    pub fn seconds_affordable(self, balance: Money) -> i64 {
        let numerator = i128::from(balance.cents()) * 60;
        let denominator = i128::from(self.0.cents());
        let seconds = numerator.div_euclid(denominator);
        i64::try_from(seconds).unwrap_or(if seconds < 0 { i64::MIN } else { i64::MAX })
    }
}

impl TryFrom<Money> for RatePerMinute {
    type Error = MoneyError;

    fn try_from(value: Money) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RatePerMinute> for Money {
    fn from(rate: RatePerMinute) -> Money {
        rate.0
    }
}

impl fmt::Display for RatePerMinute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/min", self.0)
    }
}

impl FromStr for RatePerMinute {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.parse()?)
    }
}
