//! Value Objects for the storefront

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Money value object. The currency code is always upper case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMoney")]
pub struct Money { amount: Decimal, currency: String }

#[derive(Deserialize)]
struct RawMoney { amount: Decimal, currency: String }

impl From<RawMoney> for Money {
    fn from(raw: RawMoney) -> Self { Money::new(raw.amount, &raw.currency) }
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_uppercase() } }
    pub fn usd(amount: Decimal) -> Self { Self::new(amount, "USD") }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn is_zero(&self) -> bool { self.amount.is_zero() }

    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }

    /// Absolute subtraction; the result may go negative.
    pub fn subtract(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(Money::new(self.amount - other.amount, &self.currency))
    }

    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch { left: self.currency.clone(), right: other.currency.clone() });
        }
        Ok(())
    }
}

impl Default for Money { fn default() -> Self { Self::zero("USD") } }

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.currency.as_str() {
            "USD" | "CAD" | "AUD" | "MXN" | "ARS" => write!(f, "${}", self.amount),
            "EUR" => write!(f, "€{}", self.amount),
            "GBP" => write!(f, "£{}", self.amount),
            other => write!(f, "{} {}", self.amount, other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_money_add() {
        let a = Money::usd(Decimal::new(100, 0));
        let b = Money::usd(Decimal::new(50, 0));
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(150, 0));
    }
    #[test]
    fn test_money_subtract_allows_negative() {
        let a = Money::usd(Decimal::new(5, 0));
        let b = Money::usd(Decimal::new(8, 0));
        assert_eq!(a.subtract(&b).unwrap().amount(), Decimal::new(-3, 0));
    }
    #[test]
    fn test_currency_mismatch() {
        let a = Money::usd(Decimal::ONE);
        let b = Money::new(Decimal::ONE, "eur");
        assert_eq!(b.currency(), "EUR");
        assert!(matches!(a.add(&b), Err(MoneyError::CurrencyMismatch { .. })));
    }
    #[test]
    fn test_deserialize_normalizes_currency() {
        let m: Money = serde_json::from_str(r#"{"amount":"4.50","currency":"usd"}"#).unwrap();
        assert_eq!(m, Money::usd(Decimal::new(450, 2)));
        assert!(m.add(&Money::usd(Decimal::ONE)).is_ok());
    }
    #[test]
    fn test_display() {
        assert_eq!(Money::usd(Decimal::new(1999, 2)).to_string(), "$19.99");
        assert_eq!(Money::new(Decimal::new(3, 0), "NGN").to_string(), "3 NGN");
    }
}
