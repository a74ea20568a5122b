use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::{LedgerError, Result};

const MAX_DECIMAL_PLACES: u32 = 2;
const INTEGER_LIMIT: i64 = 10_000_000;

/// A strictly positive money value with at most seven integer digits and two
/// decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput(format!(
                "amount {value} must be positive"
            )));
        }
        if value.normalize().scale() > MAX_DECIMAL_PLACES {
            return Err(LedgerError::InvalidInput(format!(
                "amount {value} has more than {MAX_DECIMAL_PLACES} decimal places"
            )));
        }
        if value.trunc() >= Decimal::from(INTEGER_LIMIT) {
            return Err(LedgerError::InvalidInput(format!(
                "amount {value} has more than 7 integer digits"
            )));
        }
        let mut scaled = value;
        scaled.rescale(MAX_DECIMAL_PLACES);
        Ok(Self(scaled))
    }

    pub fn from_cents(cents: i64) -> Result<Self> {
        Self::new(Decimal::new(cents, MAX_DECIMAL_PLACES))
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self> {
        let value = Decimal::from_str(raw.trim())
            .map_err(|_| LedgerError::InvalidInput(format!("`{raw}` is not an amount")))?;
        Self::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// `part / whole * 100`, truncated to two decimal places. A zero `whole` yields 0.
pub fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
        .map(|ratio| ratio.round_dp_with_strategy(MAX_DECIMAL_PLACES, RoundingStrategy::ToZero))
        .unwrap_or(Decimal::ZERO)
}

/// Formats any decimal the way amounts are displayed.
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_two_decimal_places() {
        let amount: Amount = "12.5".parse().unwrap();
        assert_eq!(amount.to_string(), "12.50");
        assert_eq!(amount, Amount::from_cents(1250).unwrap());
    }

    #[test]
    fn rejects_non_positive_and_overlong_values() {
        assert!("0".parse::<Amount>().is_err());
        assert!("-4.00".parse::<Amount>().is_err());
        assert!("1.234".parse::<Amount>().is_err());
        assert!("10000000".parse::<Amount>().is_err());
        assert!("9999999.99".parse::<Amount>().is_ok());
        assert!("abc".parse::<Amount>().is_err());
    }

    #[test]
    fn trailing_zeros_do_not_count_as_precision() {
        assert!("3.100".parse::<Amount>().is_ok());
    }

    #[test]
    fn percentage_truncates_and_handles_zero_total() {
        assert_eq!(
            percentage_of(Decimal::from(150), Decimal::from(300)),
            Decimal::from(50)
        );
        assert_eq!(
            percentage_of(Decimal::from(1), Decimal::from(3)),
            Decimal::new(3333, 2)
        );
        assert_eq!(
            percentage_of(Decimal::from(2), Decimal::from(3)),
            Decimal::new(6666, 2)
        );
        assert_eq!(percentage_of(Decimal::from(5), Decimal::ZERO), Decimal::ZERO);
    }
}
