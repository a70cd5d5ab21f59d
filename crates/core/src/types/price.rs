//! Type-safe money amounts using decimal arithmetic.
//!
//! Amounts arrive from browsers as JSON numbers (`19.99`) and occasionally as
//! numeric strings (`"19.99"`). Both are accepted. Amounts are always emitted
//! as JSON numbers so clients see the same shape they submitted.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors converting a price for an external system.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    #[error("amount {0} does not fit in minor units")]
    OutOfRange(Decimal),
}

/// A money amount in the currency's standard unit (dollars, not cents).
///
/// No sign or range check is applied: the checkout flow stores what the
/// client sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Convert to integer minor units (cents), rounding half away from zero.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::OutOfRange` if the result does not fit in an `i64`.
    pub fn to_minor_units(&self) -> Result<i64, PriceError> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|cents| cents.to_i64())
            .ok_or(PriceError::OutOfRange(self.0))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let normalized = self.0.normalize();
        if normalized.scale() == 0
            && let Some(whole) = normalized.to_i64()
        {
            return serializer.serialize_i64(whole);
        }
        match normalized.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_str(&normalized.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn price(s: &str) -> Price {
        Price::new(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_deserialize_from_number_and_string() {
        let from_int: Price = serde_json::from_str("20").unwrap();
        let from_float: Price = serde_json::from_str("19.99").unwrap();
        let from_str: Price = serde_json::from_str("\"19.99\"").unwrap();

        assert_eq!(from_int, price("20"));
        assert_eq!(from_float, price("19.99"));
        assert_eq!(from_str, price("19.99"));
    }

    #[test]
    fn test_deserialize_directly_from_value() {
        let from_number = Price::deserialize(serde_json::json!(12.5)).unwrap();
        let from_string = Price::deserialize(serde_json::json!("0.99")).unwrap();

        assert_eq!(from_number, price("12.5"));
        assert_eq!(from_string, price("0.99"));
        assert!(Price::deserialize(serde_json::json!("twelve")).is_err());
    }

    #[test]
    fn test_serialize_whole_amount_as_integer() {
        assert_eq!(serde_json::to_string(&price("20")).unwrap(), "20");
        assert_eq!(serde_json::to_string(&price("20.00")).unwrap(), "20");
    }

    #[test]
    fn test_serialize_fractional_amount_as_number() {
        assert_eq!(serde_json::to_string(&price("19.99")).unwrap(), "19.99");
    }

    #[test]
    fn test_to_minor_units() {
        assert_eq!(price("19.99").to_minor_units(), Ok(1999));
        assert_eq!(price("20").to_minor_units(), Ok(2000));
        assert_eq!(price("0.005").to_minor_units(), Ok(1));
        assert_eq!(price("-1.5").to_minor_units(), Ok(-150));
    }

    #[test]
    fn test_to_minor_units_out_of_range() {
        let huge = Price::new(Decimal::MAX);
        assert!(matches!(
            huge.to_minor_units(),
            Err(PriceError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_display_is_normalized() {
        assert_eq!(price("12.50").to_string(), "12.5");
    }
}
