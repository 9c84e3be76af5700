use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    sqlite::{SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef},
    Decode,
    Encode,
    Sqlite,
    Type,
};
use thiserror::Error;

use crate::op;

pub const INR_CURRENCY_CODE: &str = "INR";
pub const INR_CURRENCY_CODE_LOWER: &str = "inr";
/// Number of paise in one rupee.
pub const PAISE_PER_RUPEE: i64 = 100;

//--------------------------------------        Paise        --------------------------------------------------------
/// An amount of money in integer minor units (paise). This is the only representation the payment processor
/// understands; rupee amounts are converted via [`Rupees::to_paise`] at the gateway boundary.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Paise(i64);

op!(binary Paise, Add, add);
op!(binary Paise, Sub, sub);
op!(inplace Paise, AddAssign, add_assign);
op!(inplace Paise, SubAssign, sub_assign);
op!(unary Paise, Neg, neg);

impl Sum for Paise {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl From<i64> for Paise {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Paise {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Paise {}

impl Display for Paise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}p", self.0)
    }
}

impl Paise {
    pub fn value(&self) -> i64 {
        self.0
    }
}

//--------------------------------------        Rupees       --------------------------------------------------------
#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in paise: {0}")]
pub struct MoneyConversionError(String);

/// An amount of money in decimal major units (rupees). Amounts cross the wire in this form; only the payment
/// gateway ever sees paise.
///
/// Stored in the database as its canonical decimal string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rupees(Decimal);

op!(binary Rupees, Add, add);
op!(binary Rupees, Sub, sub);
op!(inplace Rupees, AddAssign, add_assign);
op!(inplace Rupees, SubAssign, sub_assign);
op!(unary Rupees, Neg, neg);

impl Sum for Rupees {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl From<Decimal> for Rupees {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<i64> for Rupees {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl FromStr for Rupees {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s).map_err(|e| MoneyConversionError(format!("{s} is not a valid amount. {e}")))?;
        Ok(Self(value))
    }
}

impl Display for Rupees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "₹{}", self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl Rupees {
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// The amount rounded to whole paise (two decimal places, round-half-up).
    pub fn rounded(&self) -> Rupees {
        Self(self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Converts the rupee amount into integer paise for the payment processor.
    ///
    /// The conversion is a fixed two-step sequence: round to two decimal places with round-half-up, then scale by
    /// 100 and truncate. Rounding `amount * 100` in a single step gives a different answer for values like 19.995
    /// and must not be substituted.
    pub fn to_paise(&self) -> Result<Paise, MoneyConversionError> {
        let rupees = self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let paise = (rupees * Decimal::from(PAISE_PER_RUPEE)).trunc();
        paise
            .to_i64()
            .map(Paise)
            .ok_or_else(|| MoneyConversionError(format!("{paise} paise does not fit in an integer amount")))
    }
}

impl Type<Sqlite> for Rupees {
    fn type_info() -> SqliteTypeInfo {
        <&str as Type<Sqlite>>::type_info()
    }

    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <&str as Type<Sqlite>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Sqlite> for Rupees {
    fn encode_by_ref(&self, buf: &mut Vec<SqliteArgumentValue<'q>>) -> IsNull {
        buf.push(SqliteArgumentValue::Text(self.0.to_string().into()));
        IsNull::No
    }
}

impl<'r> Decode<'r, Sqlite> for Rupees {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let text = <&str as Decode<Sqlite>>::decode(value)?;
        Ok(Self(Decimal::from_str(text)?))
    }
}

#[cfg(test)]
mod test {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn paise_conversion_for_exact_amounts() {
        assert_eq!(Rupees::from(dec!(123.45)).to_paise().unwrap(), Paise::from(12345));
        assert_eq!(Rupees::from(dec!(0.01)).to_paise().unwrap(), Paise::from(1));
        assert_eq!(Rupees::from(dec!(1500)).to_paise().unwrap(), Paise::from(150_000));
    }

    #[test]
    fn paise_conversion_rounds_to_cents_before_scaling() {
        // 19.995 * 100 truncated naively would be 1999. The two-step sequence gives 2000.
        assert_eq!(Rupees::from(dec!(19.995)).to_paise().unwrap(), Paise::from(2000));
        assert_eq!(Rupees::from(dec!(10.004)).to_paise().unwrap(), Paise::from(1000));
        assert_eq!(Rupees::from(dec!(10.005)).to_paise().unwrap(), Paise::from(1001));
        assert_eq!(Rupees::from(dec!(0.005)).to_paise().unwrap(), Paise::from(1));
    }

    #[test]
    fn paise_round_trips_for_two_decimal_amounts() {
        for cents in [1i64, 99, 100, 12345, 999_999] {
            let rupees = Rupees::from(Decimal::new(cents, 2));
            let paise = rupees.to_paise().unwrap();
            assert_eq!(paise.value(), cents);
            assert_eq!(Rupees::from(Decimal::new(paise.value(), 2)), rupees.rounded());
        }
    }

    #[test]
    fn rupees_cross_the_wire_as_decimal_strings() {
        let amount = Rupees::from(dec!(19.99));
        assert_eq!(serde_json::to_string(&amount).unwrap(), r#""19.99""#);
        let parsed: Rupees = serde_json::from_str(r#""19.99""#).unwrap();
        assert_eq!(parsed, amount);
        // Plain JSON numbers are accepted too.
        let parsed: Rupees = serde_json::from_str("19.99").unwrap();
        assert_eq!(parsed, amount);
    }

    #[test]
    fn rupees_parse_and_compare_scale_insensitively() {
        let a = "150.00".parse::<Rupees>().unwrap();
        let b = Rupees::from(dec!(150));
        assert_eq!(a, b);
        assert!("nonsense".parse::<Rupees>().is_err());
    }
}
