//! Currencies, exchange rates, and conversion through the budget currency.
//!
//! Every configured rate is relative to the budget currency, which acts as the
//! hub: a conversion between two other currencies always goes through it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{BudgetConfig, CurrencyConfig};
use crate::error::AppError;
use crate::models::amount::Amount;

/// Placeholder accepted in display templates written for older configuration files.
const LEGACY_PLACEHOLDER: &str = "9.99";

/// A configured currency. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Currency {
    pub code: String,
    /// Units of this currency per one unit of the budget currency.
    pub rate: f64,
    /// Display template, e.g. `"₾%0.2f"`.
    pub format: String,
}

impl Currency {
    /// Build a currency, checking the rate and the display template.
    pub fn new(code: &str, rate: f64, format: &str) -> Result<Self, AppError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(AppError::Config(format!(
                "currency {code:?} has invalid rate {rate}"
            )));
        }
        if placeholder_span(format).is_none() {
            return Err(AppError::Config(format!(
                "currency {code:?} format {format:?} has no amount placeholder"
            )));
        }
        Ok(Currency {
            code: code.to_string(),
            rate,
            format: format.to_string(),
        })
    }

    /// Render `amount` through this currency's display template.
    ///
    /// Two decimals, or none when `brief` is set and the amount is whole.
    pub fn format(&self, amount: Amount, brief: bool) -> String {
        let number = if brief && amount.is_whole() {
            amount.to_decimal_string(0)
        } else {
            amount.to_decimal_string(2)
        };
        match placeholder_span(&self.format) {
            Some((start, end)) => {
                format!("{}{}{}", &self.format[..start], number, &self.format[end..])
            }
            None => number,
        }
    }
}

/// Locate the amount placeholder in a display template.
///
/// The first printf-style float directive (`%f`, `%.2f`, `%0.2f`) wins;
/// otherwise the legacy literal `9.99`.
fn placeholder_span(template: &str) -> Option<(usize, usize)> {
    let bytes = template.as_bytes();
    let mut from = 0;
    while let Some(offset) = template[from..].find('%') {
        let start = from + offset;
        let mut end = start + 1;
        while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
            end += 1;
        }
        if end < bytes.len() && bytes[end] == b'f' {
            return Some((start, end + 1));
        }
        from = start + 1;
    }
    template
        .find(LEGACY_PLACEHOLDER)
        .map(|start| (start, start + LEGACY_PLACEHOLDER.len()))
}

/// An amount tagged with its currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Monetary {
    pub amount: Amount,
    pub currency: Arc<Currency>,
}

impl Monetary {
    pub fn format(&self, brief: bool) -> String {
        self.currency.format(self.amount, brief)
    }
}

/// The set of configured currencies and the designated budget, default and
/// secondary currencies.
#[derive(Debug)]
pub struct Ledger {
    /// Default currency first, then the rest in configured order.
    currencies: Vec<Arc<Currency>>,
    by_code: HashMap<String, Arc<Currency>>,
    budget: Arc<Currency>,
    default: Arc<Currency>,
    secondary: Option<Arc<Currency>>,
}

impl Ledger {
    /// Build a ledger from currency configs and the designated codes.
    ///
    /// # Errors
    ///
    /// `AppError::Config` when a code is duplicated, a rate or template is
    /// invalid, or a designated code is not among the configured currencies.
    pub fn new(
        configs: &[CurrencyConfig],
        budget_code: &str,
        default_code: &str,
        secondary_code: Option<&str>,
    ) -> Result<Self, AppError> {
        let mut configured = Vec::with_capacity(configs.len());
        let mut by_code = HashMap::with_capacity(configs.len());
        for config in configs {
            let currency = Arc::new(Currency::new(&config.code, config.rate, &config.format)?);
            if by_code
                .insert(currency.code.clone(), currency.clone())
                .is_some()
            {
                return Err(AppError::Config(format!(
                    "currency {:?} is configured twice",
                    currency.code
                )));
            }
            configured.push(currency);
        }

        let designated = |role: &str, code: &str| {
            by_code
                .get(code)
                .cloned()
                .ok_or_else(|| AppError::Config(format!("{role} currency {code:?} not found")))
        };
        let default = designated("default", default_code)?;
        let budget = designated("budget", budget_code)?;
        let secondary = match secondary_code.filter(|code| !code.is_empty()) {
            Some(code) => Some(designated("secondary", code)?),
            None => None,
        };

        let mut currencies = Vec::with_capacity(configured.len());
        currencies.push(default.clone());
        currencies.extend(
            configured
                .into_iter()
                .filter(|c| !Arc::ptr_eq(c, &default)),
        );

        Ok(Ledger {
            currencies,
            by_code,
            budget,
            default,
            secondary,
        })
    }

    pub fn from_config(config: &BudgetConfig) -> Result<Self, AppError> {
        Self::new(
            &config.currencies,
            &config.budget_currency,
            &config.default_currency,
            Some(config.secondary_currency.as_str()),
        )
    }

    /// All currencies, default first.
    pub fn currencies(&self) -> &[Arc<Currency>] {
        &self.currencies
    }

    pub fn currency(&self, code: &str) -> Result<&Arc<Currency>, AppError> {
        self.by_code
            .get(code)
            .ok_or_else(|| AppError::CurrencyNotFound(code.to_string()))
    }

    pub fn budget(&self) -> &Arc<Currency> {
        &self.budget
    }

    pub fn default_currency(&self) -> &Arc<Currency> {
        &self.default
    }

    pub fn secondary(&self) -> Option<&Arc<Currency>> {
        self.secondary.as_ref()
    }

    fn is_budget(&self, currency: &Currency) -> bool {
        currency.code == self.budget.code
    }

    /// Convert `amount` from one currency to another through the budget currency.
    pub fn convert(&self, amount: Amount, from: &Currency, to: &Currency) -> Amount {
        if from.code == to.code {
            amount
        } else if self.is_budget(from) {
            Amount::from_f64_half_up(amount.milliunits() as f64 * to.rate)
        } else if self.is_budget(to) {
            Amount::from_f64_half_up(amount.milliunits() as f64 / from.rate)
        } else {
            let interim = self.convert(amount, from, &self.budget);
            self.convert(interim, &self.budget, to)
        }
    }

    /// Like [`Ledger::convert`], but `None` when a hop leaves the range
    /// accepted for entered amounts.
    pub fn checked_convert(
        &self,
        amount: Amount,
        from: &Currency,
        to: &Currency,
    ) -> Option<Amount> {
        if from.code == to.code {
            Some(amount)
        } else if self.is_budget(from) {
            Amount::checked_from_f64_half_up(amount.milliunits() as f64 * to.rate)
        } else if self.is_budget(to) {
            Amount::checked_from_f64_half_up(amount.milliunits() as f64 / from.rate)
        } else {
            let interim = self.checked_convert(amount, from, &self.budget)?;
            self.checked_convert(interim, &self.budget, to)
        }
    }

    /// Like [`Ledger::convert`], keeping the target currency alongside the result.
    pub fn convert_monetary(
        &self,
        amount: Amount,
        from: &Currency,
        to: &Arc<Currency>,
    ) -> Monetary {
        Monetary {
            amount: self.convert(amount, from, to),
            currency: to.clone(),
        }
    }

    pub fn format(&self, amount: Amount, currency: &Currency, brief: bool) -> String {
        currency.format(amount, brief)
    }
}
