//! [`Price`]-related definitions.

use std::{fmt, str::FromStr};

#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::{prelude::ToPrimitive as _, Decimal};

/// Non-negative monetary amount in the marketplace currency.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(Decimal);

impl Price {
    /// [`Price`] of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Price`] by checking the provided value is not
    /// negative.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        if val < Decimal::ZERO {
            None
        } else {
            #[expect(
                clippy::allow_attributes,
                reason = "TODO: Remove once clippy is fixed"
            )]
            #[allow(unsafe_code, reason = "invariants checked already")]
            Some(unsafe { Self::new_unchecked(val) })
        }
    }

    /// Creates a new [`Price`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The provided value must not be negative.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(val: Decimal) -> Self {
        Self(val)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(amount) = self;
        if amount.is_integer() {
            write!(f, "{}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{amount}")
        }
    }
}

impl FromStr for Price {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid price value")
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Non-negative decimal amount in `{major}.{minor}` format, where:
    /// - `major` is an integer;
    /// - `minor` is an optional integer.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Price = super::Price;

    impl Price {
        fn to_output<S: ScalarValue>(p: &Price) -> Value<S> {
            Value::scalar(p.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Price` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Price` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Price;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Price::from_str("123.45").unwrap(),
            Price::new(decimal("123.45")).unwrap(),
        );
        assert_eq!(
            Price::from_str("0").unwrap(),
            Price::new(Decimal::ZERO).unwrap(),
        );
        assert_eq!(Price::from_str("0").unwrap(), Price::ZERO);

        assert!(Price::from_str("-1").is_err());
        assert!(Price::from_str("-0.01").is_err());
        assert!(Price::from_str("12,3").is_err());
        assert!(Price::from_str("12 USD").is_err());

        assert!(Price::from_str("123.00").is_ok());
        assert!(Price::from_str("123.0").is_ok());
        assert!(Price::from_str("123").is_ok());
    }

    #[test]
    fn to_string() {
        assert_eq!(
            Price::new(decimal("123.45")).unwrap().to_string(),
            "123.45",
        );
        assert_eq!(Price::new(decimal("123.00")).unwrap().to_string(), "123");
        assert_eq!(Price::new(decimal("123.0")).unwrap().to_string(), "123");
        assert_eq!(Price::new(decimal("123")).unwrap().to_string(), "123");
        assert_eq!(Price::ZERO.to_string(), "0");
    }
}
