use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_ratings: i64,
}

impl RatingSummary {
    /// Mean of all ratings rounded to one decimal place. An empty set yields
    /// the driver defaults of zero.
    pub fn from_ratings(ratings: &[i32]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }

        let total_ratings = ratings.len() as i64;
        let sum: i64 = ratings.iter().map(|&r| r as i64).sum();
        let mean = sum as f64 / total_ratings as f64;

        Self {
            average_rating: round_to_tenth(mean),
            total_ratings,
        }
    }
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEntry {
    pub booking_id: Uuid,
    pub rating: i32,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRatings {
    pub total_ratings: i64,
    pub average_rating: f64,
    pub ratings_list: Vec<RatingEntry>,
}

/// Response of a successful rating submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingOutcome {
    pub rating: i32,
    pub new_driver_average: f64,
    pub total_ratings: i64,
}

#[test]
fn single_rating_test() {
    let summary = RatingSummary::from_ratings(&[4]);

    assert_eq!(summary.average_rating, 4.0);
    assert_eq!(summary.total_ratings, 1);
}

#[test]
fn mean_is_rounded_to_one_decimal_test() {
    // 14 / 3 = 4.666...
    let summary = RatingSummary::from_ratings(&[5, 5, 4]);
    assert_eq!(summary.average_rating, 4.7);
    assert_eq!(summary.total_ratings, 3);

    // 13 / 4 = 3.25
    let summary = RatingSummary::from_ratings(&[1, 4, 4, 4]);
    assert_eq!(summary.average_rating, 3.3);

    let summary = RatingSummary::from_ratings(&[1, 2]);
    assert_eq!(summary.average_rating, 1.5);
}

#[test]
fn empty_ratings_test() {
    let summary = RatingSummary::from_ratings(&[]);

    assert_eq!(summary, RatingSummary::default());
    assert_eq!(summary.average_rating, 0.0);
    assert_eq!(summary.total_ratings, 0);
}
