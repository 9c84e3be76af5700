use std::{fmt::Display, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};
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

/// The lowest rating a requester can leave.
pub const MIN_RATING: i32 = 1;
/// The highest rating a requester can leave.
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, Error)]
#[error("Invalid rating score: {0}")]
pub struct RatingScoreError(String);

//--------------------------------------     RatingScore     --------------------------------------------------------
/// A running average rating, kept at one decimal place.
///
/// The average is maintained incrementally: each accepted rating is folded into the previous one-decimal average
/// rather than recomputed from the full feedback history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingScore(Decimal);

impl RatingScore {
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Folds one new rating into an average taken over `count` previous ratings.
    ///
    /// The result is `(avg * count + rating) / (count + 1)`, rounded half-up to one decimal place.
    pub fn fold(&self, count: i64, rating: i32) -> RatingScore {
        let total = self.0 * Decimal::from(count) + Decimal::from(rating);
        let avg = total / Decimal::from(count + 1);
        Self(avg.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl From<Decimal> for RatingScore {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl FromStr for RatingScore {
    type Err = RatingScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s).map_err(|e| RatingScoreError(format!("{s} is not a valid score. {e}")))?;
        Ok(Self(value))
    }
}

impl Display for RatingScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Type<Sqlite> for RatingScore {
    fn type_info() -> SqliteTypeInfo {
        <&str as Type<Sqlite>>::type_info()
    }

    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <&str as Type<Sqlite>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Sqlite> for RatingScore {
    fn encode_by_ref(&self, buf: &mut Vec<SqliteArgumentValue<'q>>) -> IsNull {
        buf.push(SqliteArgumentValue::Text(self.0.to_string().into()));
        IsNull::No
    }
}

impl<'r> Decode<'r, Sqlite> for RatingScore {
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
    fn folding_a_sequence_of_ratings() {
        let mut avg = RatingScore::default();
        for (count, rating) in [5, 3, 4].into_iter().enumerate() {
            avg = avg.fold(count as i64, rating);
        }
        assert_eq!(avg.value(), dec!(4.0));
    }

    #[test]
    fn folding_rounds_half_up() {
        // (1.0 * 3 + 2) / 4 = 1.25, which rounds up to 1.3 rather than to even.
        let avg = RatingScore::from(dec!(1.0)).fold(3, 2);
        assert_eq!(avg.value(), dec!(1.3));
    }

    #[test]
    fn first_rating_becomes_the_average() {
        let avg = RatingScore::default().fold(0, 4);
        assert_eq!(avg.value(), dec!(4.0));
    }
}
