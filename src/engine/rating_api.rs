use super::helpers::fetch_driver;
use super::{Database, Engine};

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{Acquire, Executor, Row, Transaction};
use uuid::Uuid;

use crate::{
    api::RatingAPI,
    entities::{DriverRatings, RatingEntry, RatingSummary},
    error::Error,
};

/// Recomputes a driver's average from every rated booking and stores it on the
/// driver record. The driver row stays locked until the surrounding
/// transaction ends, so concurrent recomputes for one driver serialize.
#[tracing::instrument(skip(tx))]
pub async fn recompute_driver_rating(
    tx: &mut Transaction<'_, Database>,
    driver_id: &Uuid,
) -> Result<RatingSummary, Error> {
    tx.fetch_optional(
        sqlx::query("SELECT id FROM drivers WHERE id = $1 FOR UPDATE").bind(driver_id),
    )
    .await?
    .ok_or_else(|| Error::not_found_error("driver not found"))?;

    let ratings = tx
        .fetch_all(
            sqlx::query("SELECT rating FROM bookings WHERE driver_id = $1 AND rating IS NOT NULL")
                .bind(driver_id),
        )
        .await?
        .iter()
        .map(|row| row.try_get::<i32, _>("rating"))
        .collect::<Result<Vec<i32>, sqlx::Error>>()?;

    let summary = RatingSummary::from_ratings(&ratings);

    tx.execute(
        sqlx::query("UPDATE drivers SET average_rating = $2, total_ratings = $3 WHERE id = $1")
            .bind(driver_id)
            .bind(summary.average_rating)
            .bind(summary.total_ratings),
    )
    .await?;

    tracing::info!(
        average_rating = summary.average_rating,
        total_ratings = summary.total_ratings,
        "driver rating recomputed"
    );

    Ok(summary)
}

#[async_trait]
impl RatingAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn recompute_driver_rating(&self, driver_id: Uuid) -> Result<RatingSummary, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let summary = recompute_driver_rating(&mut tx, &driver_id).await?;

        tx.commit().await?;

        Ok(summary)
    }

    #[tracing::instrument(skip(self))]
    async fn driver_ratings(&self, driver_id: Uuid) -> Result<DriverRatings, Error> {
        let mut conn = self.pool.acquire().await?;

        let summary = fetch_driver(&mut conn, &driver_id).await?.rating_summary();

        let mut ratings_list = vec![];
        let mut rows = conn.fetch(
            sqlx::query(
                "SELECT id, rating, review, created_at FROM bookings
                WHERE driver_id = $1 AND rating IS NOT NULL
                ORDER BY created_at DESC, id DESC",
            )
            .bind(&driver_id),
        );

        while let Some(row) = rows.try_next().await? {
            ratings_list.push(RatingEntry {
                booking_id: row.try_get("id")?,
                rating: row.try_get("rating")?,
                review: row.try_get("review")?,
                created_at: row.try_get("created_at")?,
            });
        }

        Ok(DriverRatings {
            total_ratings: summary.total_ratings,
            average_rating: summary.average_rating,
            ratings_list,
        })
    }
}
