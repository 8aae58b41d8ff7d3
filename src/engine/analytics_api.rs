use super::Engine;

use async_trait::async_trait;
use sqlx::{Executor, Row};

use crate::{
    api::AnalyticsAPI,
    auth::{Platform, User},
    entities::{round_to_tenth, Analytics, StatusCounts},
    error::Error,
};

#[async_trait]
impl AnalyticsAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn analytics(&self, user: User) -> Result<Analytics, Error> {
        self.authorize(user.clone(), "read_analytics", Platform::default())?;

        let query = "
            SELECT
                (SELECT COUNT(*) FROM users WHERE kind = 'customer') AS total_customers,
                (SELECT COUNT(*) FROM users WHERE kind = 'driver') AS total_drivers,
                COUNT(*) AS total_bookings,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'accepted') AS accepted,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled,
                COALESCE(SUM(fare) FILTER (WHERE status = 'completed'), 0) AS total_revenue,
                COALESCE(SUM(distance) FILTER (WHERE status = 'completed'), 0) AS total_distance,
                COALESCE(AVG(fare) FILTER (WHERE status = 'completed'), 0) AS average_fare,
                (
                    SELECT COALESCE(AVG(average_rating), 0)
                    FROM drivers
                    WHERE total_ratings > 0
                ) AS average_driver_rating
            FROM
                bookings
        ";

        let mut conn = self.pool.acquire().await?;

        let row = conn.fetch_one(sqlx::query(query)).await?;

        let average_driver_rating: f64 = row.try_get("average_driver_rating")?;

        Ok(Analytics {
            total_customers: row.try_get("total_customers")?,
            total_drivers: row.try_get("total_drivers")?,
            total_bookings: row.try_get("total_bookings")?,
            bookings_by_status: StatusCounts {
                pending: row.try_get("pending")?,
                accepted: row.try_get("accepted")?,
                completed: row.try_get("completed")?,
                cancelled: row.try_get("cancelled")?,
            },
            total_revenue: row.try_get("total_revenue")?,
            total_distance: row.try_get("total_distance")?,
            average_fare: row.try_get("average_fare")?,
            average_driver_rating: round_to_tenth(average_driver_rating),
        })
    }
}
