//! Exact decimal money amounts.
//!
//! Amounts cross every boundary (JSON, HTML forms, the database) as decimal
//! strings such as `"123.45"` and are held as [Decimal] in between, so sums
//! over many small amounts never drift the way binary floats do.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// The number of fractional digits stored for every amount.
pub const SCALE: u32 = 2;

/// The largest amount that fits in a `numeric(10, 2)` column, 99,999,999.99.
const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, SCALE);

/// A non-negative amount of money with exactly two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Create an amount from a decimal value.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `value` is negative, has more than
    /// two decimal places or does not fit in ten digits.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(Error::InvalidAmount(format!(
                "{value} is negative, amounts must be zero or more"
            )));
        }

        if value.normalize().scale() > SCALE {
            return Err(Error::InvalidAmount(format!(
                "{value} has more than {SCALE} decimal places"
            )));
        }

        if value > MAX_AMOUNT {
            return Err(Error::InvalidAmount(format!(
                "{value} is larger than the maximum of {MAX_AMOUNT}"
            )));
        }

        let mut value = value.abs();
        value.rescale(SCALE);

        Ok(Self(value))
    }

    /// The amount as a decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(Error::InvalidAmount("amount cannot be empty".to_owned()));
        }

        let value = Decimal::from_str_exact(trimmed)
            .map_err(|_| Error::InvalidAmount(format!("\"{trimmed}\" is not a decimal number")))?;

        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;

        text.parse().map_err(serde::de::Error::custom)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        text.parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// Format `value` as a decimal string rounded to two decimal places, e.g. `"-10.00"`.
///
/// Parsing the result with [Decimal::from_str] gives back `value` whenever
/// `value` is a sum of two-decimal amounts.
pub fn to_decimal_string(value: Decimal) -> String {
    let mut rounded = value.round_dp(SCALE);
    rounded.rescale(SCALE);

    rounded.to_string()
}

/// Serialize a [Decimal] as a two-decimal string.
pub fn serialize_decimal<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_decimal_string(*value))
}

/// Deserialize an optional amount field sent either as a string or as a JSON number.
///
/// The text is validated later with [Amount::from_str] so that every problem
/// in a request body can be reported at once.
pub fn deserialize_amount_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AmountText {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(
        Option::<AmountText>::deserialize(deserializer)?.map(|amount| match amount {
            AmountText::Text(text) => text,
            AmountText::Number(number) => number.to_string(),
        }),
    )
}

/// Lossy conversion for chart libraries and display formatting only.
pub fn to_display_float(value: Decimal) -> f64 {
    value.round_dp(SCALE).to_f64().unwrap_or_default()
}
