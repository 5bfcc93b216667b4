//! Customer reviews.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::id::{ReviewId, UserId};

/// A star rating outside 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rating must be between 1 and 5 (got {0})")]
pub struct RatingError(pub u8);

/// A star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Create a rating.
    ///
    /// # Errors
    ///
    /// Returns `RatingError` unless `stars` is in 1..=5.
    pub const fn new(stars: u8) -> Result<Self, RatingError> {
        if stars >= Self::MIN && stars <= Self::MAX {
            Ok(Self(stars))
        } else {
            Err(RatingError(stars))
        }
    }

    #[must_use]
    pub const fn stars(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(stars: u8) -> Result<Self, Self::Error> {
        Self::new(stars)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A published customer review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub user_name: String,
    pub rating: Rating,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub comment: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub helpful_count: u32,
    #[serde(default)]
    pub verified: bool,
}

/// Review form contents as typed by the shopper.
///
/// A rating of 0 (or `null`) means no star has been selected yet. The value
/// is kept as typed; range checks happen at submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDraft {
    #[serde(default, deserialize_with = "unset_rating_as_zero")]
    pub rating: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
}

impl ReviewDraft {
    #[must_use]
    pub fn new(rating: i64, title: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            rating,
            title: title.into(),
            comment: comment.into(),
        }
    }

    /// Whether the shopper has typed or selected anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// The selected rating, if it is a valid star count.
    #[must_use]
    pub fn selected_rating(&self) -> Option<Rating> {
        u8::try_from(self.rating)
            .ok()
            .and_then(|stars| Rating::new(stars).ok())
    }
}

fn unset_rating_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

/// Aggregate shown above the review list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub count: usize,
    /// Mean rating rounded to one decimal place, zero when there are no reviews.
    pub average: Decimal,
}

impl ReviewSummary {
    /// Summarize a list of reviews.
    #[must_use]
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let count = reviews.len();
        if count == 0 {
            return Self {
                count,
                average: Decimal::new(0, 1),
            };
        }

        let total: u64 = reviews.iter().map(|r| u64::from(r.rating.stars())).sum();
        let mean = Decimal::from(total) / Decimal::from(count);
        let mut average = mean.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        average.rescale(1);
        Self { count, average }
    }

    /// Average rounded to whole stars for the star strip.
    #[must_use]
    pub fn rounded_stars(&self) -> u8 {
        self.average
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .mantissa()
            .try_into()
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn review(stars: u8) -> Review {
        Review {
            id: ReviewId::now(),
            user_id: UserId::new("u1"),
            user_name: "Priya Sharma".to_string(),
            rating: Rating::new(stars).unwrap(),
            title: None,
            comment: "Perfect fit".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 12, 15).unwrap(),
            helpful_count: 0,
            verified: false,
        }
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert_eq!(Rating::new(1).unwrap().stars(), 1);
        assert_eq!(Rating::new(5).unwrap().stars(), 5);
    }

    #[test]
    fn test_rating_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("0").is_err());
        assert_eq!(serde_json::from_str::<Rating>("4").unwrap().stars(), 4);
    }

    #[test]
    fn test_summary_empty() {
        let summary = ReviewSummary::from_reviews(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average.to_string(), "0.0");
        assert_eq!(summary.rounded_stars(), 0);
    }

    #[test]
    fn test_summary_average_one_decimal() {
        let reviews = [review(5), review(5), review(4), review(5)];
        let summary = ReviewSummary::from_reviews(&reviews);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.average, Decimal::new(48, 1));
        assert_eq!(summary.rounded_stars(), 5);
    }

    #[test]
    fn test_summary_whole_average_keeps_one_decimal() {
        let summary = ReviewSummary::from_reviews(&[review(5), review(5)]);
        assert_eq!(summary.average.to_string(), "5.0");
    }

    #[test]
    fn test_summary_rounds_repeating_average() {
        let reviews = [review(5), review(4), review(4)];
        assert_eq!(
            ReviewSummary::from_reviews(&reviews).average,
            Decimal::new(43, 1)
        );
    }

    #[test]
    fn test_draft_accepts_any_integer_rating() {
        let draft: ReviewDraft =
            serde_json::from_str(r#"{"rating":-1,"comment":"Soft"}"#).unwrap();
        assert_eq!(draft.rating, -1);
        assert!(draft.selected_rating().is_none());

        let draft: ReviewDraft = serde_json::from_str(r#"{"rating":300}"#).unwrap();
        assert!(draft.selected_rating().is_none());

        let draft: ReviewDraft = serde_json::from_str(r#"{"rating":null}"#).unwrap();
        assert_eq!(draft.rating, 0);

        let draft: ReviewDraft = serde_json::from_str("{}").unwrap();
        assert!(draft.is_empty());

        assert_eq!(
            ReviewDraft::new(4, "", "").selected_rating(),
            Some(Rating::new(4).unwrap())
        );
    }

    #[test]
    fn test_draft_is_empty() {
        assert!(ReviewDraft::default().is_empty());
        assert!(!ReviewDraft::new(0, "", "typed").is_empty());
    }
}
