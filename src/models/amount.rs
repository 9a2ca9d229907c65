//! Money amounts in milliunits.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Integer count of milliunits (1/1000 of a currency's major unit).
///
/// Signed: negative amounts are outflows. This matches the budgeting API,
/// which reports amounts in milliunits as well.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Milliunits in one major unit.
    pub const SCALE: i64 = 1000;

    /// Largest magnitude accepted from input or produced by conversion
    /// (one trillion major units).
    pub const MAX_ABS: i64 = 1_000_000_000_000_000;

    /// Milliunits in one cent.
    const DECI_CENT: i64 = 100;

    pub const fn from_milliunits(value: i64) -> Self {
        Amount(value)
    }

    pub const fn milliunits(self) -> i64 {
        self.0
    }

    /// Parse decimal text such as `"12.5"` into milliunits.
    ///
    /// Digits beyond the third decimal place are truncated toward zero.
    /// Magnitudes above [`Amount::MAX_ABS`] are rejected.
    pub fn parse_decimal(text: &str) -> Result<Self, AppError> {
        let text = text.trim();
        let value = Decimal::from_str(text)
            .map_err(|_| AppError::Validation(format!("amount {text:?} is not a number")))?;
        value
            .checked_mul(Decimal::from(Self::SCALE))
            .map(|scaled| scaled.trunc())
            .and_then(|scaled| scaled.to_i64())
            .filter(|milliunits| milliunits.unsigned_abs() <= Self::MAX_ABS as u64)
            .map(Amount)
            .ok_or_else(|| AppError::Validation(format!("amount {text:?} is out of range")))
    }

    /// Round up to the next multiple of 100 milliunits (a whole cent).
    ///
    /// `None` when the result does not fit.
    pub fn rounded_up_to_deci_cents(self) -> Option<Self> {
        let remainder = self.0.rem_euclid(Self::DECI_CENT);
        if remainder == 0 {
            Some(self)
        } else {
            self.0.checked_add(Self::DECI_CENT - remainder).map(Amount)
        }
    }

    pub fn checked_neg(self) -> Option<Self> {
        self.0.checked_neg().map(Amount)
    }

    pub fn saturating_add(self, rhs: Self) -> Self {
        Amount(self.0.saturating_add(rhs.0))
    }

    /// True when the amount has no fractional part.
    pub fn is_whole(self) -> bool {
        self.0 % Self::SCALE == 0
    }

    /// Round a fractional milliunit count half up to the nearest milliunit.
    ///
    /// Out-of-range values saturate at the `i64` bounds.
    pub(crate) fn from_f64_half_up(value: f64) -> Self {
        Amount((value + 0.5).floor() as i64)
    }

    /// Like [`Amount::from_f64_half_up`], but `None` for non-finite results
    /// or magnitudes above [`Amount::MAX_ABS`].
    pub(crate) fn checked_from_f64_half_up(value: f64) -> Option<Self> {
        let rounded = (value + 0.5).floor();
        (rounded.is_finite() && rounded.abs() <= Self::MAX_ABS as f64)
            .then_some(Amount(rounded as i64))
    }

    /// Decimal text with `places` fraction digits (0 to 3), rounding half away from zero.
    pub fn to_decimal_string(self, places: u32) -> String {
        let places = places.min(3);
        let unit = 10i64.pow(3 - places);
        let rounded = (self.0.unsigned_abs() + (unit / 2) as u64) / unit as u64;
        let sign = if self.0 < 0 && rounded != 0 { "-" } else { "" };
        if places == 0 {
            return format!("{sign}{rounded}");
        }
        let divisor = 10u64.pow(places);
        format!(
            "{sign}{}.{:0width$}",
            rounded / divisor,
            rounded % divisor,
            width = places as usize
        )
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string(2))
    }
}
