use super::helpers::{
    booking_from_row, fetch_booking, fetch_customer_booking_for_update, update_booking,
    BOOKING_COLUMNS,
};
use super::rating_api::recompute_driver_rating;
use super::Engine;

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{Acquire, Executor};
use uuid::Uuid;

use crate::{
    api::BookingAPI,
    auth::{Platform, User},
    entities::{validate_rating, Booking, BookingStatus, NewBooking, Page, RatingOutcome},
    error::Error,
};

#[derive(Clone, Copy)]
enum Scope {
    Pending,
    Customer(Uuid),
    Driver(Uuid),
}

impl Engine {
    /// Most-recent-first listing shared by every booking query.
    async fn list_bookings(&self, scope: Scope, page: Page) -> Result<Vec<Booking>, Error> {
        let page = page.clamp(self.settings.max_page_size);

        let condition = match scope {
            Scope::Pending => "status = $1",
            Scope::Customer(_) => "customer_id = $1",
            Scope::Driver(_) => "driver_id = $1",
        };

        let sql = format!(
            "SELECT {} FROM bookings WHERE {} ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
            BOOKING_COLUMNS, condition
        );

        let query = sqlx::query(&sql);
        let query = match scope {
            Scope::Pending => query.bind(BookingStatus::Pending.name()),
            Scope::Customer(id) | Scope::Driver(id) => query.bind(id),
        };

        let mut conn = self.pool.acquire().await?;

        let mut bookings = vec![];
        let mut rows = conn.fetch(query.bind(page.limit).bind(page.offset));

        while let Some(row) = rows.try_next().await? {
            bookings.push(booking_from_row(&row)?);
        }

        Ok(bookings)
    }
}

#[async_trait]
impl BookingAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_booking(&self, user: User, params: NewBooking) -> Result<Booking, Error> {
        self.authorize(user.clone(), "create_booking", Platform::default())?;

        let booking = Booking::new(user.id, params)?;

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query(
                "INSERT INTO bookings (id, customer_id, driver_id, pickup_location, dropoff_location, fare, distance, status, rating, review, created_at)
                VALUES ($1, $2, NULL, $3, $4, $5, $6, $7, NULL, NULL, $8)",
            )
            .bind(&booking.id)
            .bind(&booking.customer_id)
            .bind(&booking.pickup_location)
            .bind(&booking.dropoff_location)
            .bind(booking.fare)
            .bind(booking.distance)
            .bind(booking.status.name())
            .bind(&booking.created_at),
        )
        .await?;

        tracing::info!(booking_id = %booking.id, "booking created");

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn find_booking(&self, user: User, id: Uuid) -> Result<Booking, Error> {
        let mut conn = self.pool.acquire().await?;

        let booking = fetch_booking(&mut conn, &id).await?;

        self.authorize(user.clone(), "read", booking.clone())?;

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn accept_booking(&self, user: User, id: Uuid) -> Result<Booking, Error> {
        self.authorize(user.clone(), "accept_booking", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        // the status check and the assignment happen in one statement, so of
        // any number of racing drivers exactly one sees a row come back
        let query = format!(
            "UPDATE bookings SET status = $3, driver_id = $2 WHERE id = $1 AND status = $4 RETURNING {}",
            BOOKING_COLUMNS
        );

        let maybe_row = conn
            .fetch_optional(
                sqlx::query(&query)
                    .bind(&id)
                    .bind(&user.id)
                    .bind(BookingStatus::Accepted.name())
                    .bind(BookingStatus::Pending.name()),
            )
            .await?;

        match maybe_row {
            Some(row) => {
                tracing::info!("booking claimed");
                booking_from_row(&row)
            }
            None => {
                tracing::warn!("booking is no longer pending, claim lost");
                Err(Error::conflict_error("booking already taken or not found"))
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_booking(&self, user: User, id: Uuid) -> Result<Booking, Error> {
        self.authorize(user.clone(), "cancel_booking", Platform::default())?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut booking = fetch_customer_booking_for_update(&mut tx, &id, &user.id).await?;

        if booking.cancel(self.settings.cancel_policy)? {
            update_booking(&mut tx, &booking).await?;
            tracing::info!("booking cancelled");
        }

        tx.commit().await?;

        Ok(booking)
    }

    #[tracing::instrument(skip(self, review))]
    async fn rate_booking(
        &self,
        user: User,
        id: Uuid,
        rating: Option<i32>,
        review: Option<String>,
    ) -> Result<(Booking, RatingOutcome), Error> {
        self.authorize(user.clone(), "rate_booking", Platform::default())?;

        let rating = rating.ok_or_else(|| Error::invalid_input_error("rating is required"))?;
        validate_rating(rating)?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut booking = fetch_customer_booking_for_update(&mut tx, &id, &user.id).await?;

        let driver_id = booking.rate(rating, review)?;

        update_booking(&mut tx, &booking).await?;

        let summary = recompute_driver_rating(&mut tx, &driver_id).await?;

        tx.commit().await?;

        Ok((
            booking,
            RatingOutcome {
                rating,
                new_driver_average: summary.average_rating,
                total_ratings: summary.total_ratings,
            },
        ))
    }

    #[tracing::instrument(skip(self))]
    async fn list_pending_bookings(&self, user: User, page: Page) -> Result<Vec<Booking>, Error> {
        self.authorize(user.clone(), "list_pending_bookings", Platform::default())?;

        self.list_bookings(Scope::Pending, page).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_booking_history(&self, user: User, page: Page) -> Result<Vec<Booking>, Error> {
        self.authorize(user.clone(), "list_booking_history", Platform::default())?;

        self.list_bookings(Scope::Customer(user.id), page).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_driver_rides(&self, user: User, page: Page) -> Result<Vec<Booking>, Error> {
        self.authorize(user.clone(), "list_driver_rides", Platform::default())?;

        self.list_bookings(Scope::Driver(user.id), page).await
    }
}
