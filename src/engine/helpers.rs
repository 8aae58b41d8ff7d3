use super::Database;

use sqlx::{postgres::PgRow, Executor, PgConnection, Row, Transaction};
use uuid::Uuid;

use crate::{
    entities::{Admin, Booking, Customer, Driver, Profile, UserKind, VehicleDetails},
    error::Error,
};

pub const BOOKING_COLUMNS: &str = "id, customer_id, driver_id, pickup_location, dropoff_location, fare, distance, status, rating, review, created_at";

pub fn booking_from_row(row: &PgRow) -> Result<Booking, Error> {
    let status: String = row.try_get("status")?;

    Ok(Booking {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        driver_id: row.try_get("driver_id")?,
        pickup_location: row.try_get("pickup_location")?,
        dropoff_location: row.try_get("dropoff_location")?,
        fare: row.try_get("fare")?,
        distance: row.try_get("distance")?,
        status: status.parse().map_err(Error::database_error)?,
        rating: row.try_get("rating")?,
        review: row.try_get("review")?,
        created_at: row.try_get("created_at")?,
    })
}

#[tracing::instrument(skip(conn))]
pub async fn fetch_booking(conn: &mut PgConnection, id: &Uuid) -> Result<Booking, Error> {
    let query = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);

    let row = conn
        .fetch_optional(sqlx::query(&query).bind(id))
        .await?
        .ok_or_else(|| Error::not_found_error("booking not found"))?;

    booking_from_row(&row)
}

/// Locks a booking owned by `customer_id`. Bookings of other customers are
/// reported as missing.
#[tracing::instrument(skip(tx))]
pub async fn fetch_customer_booking_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
    customer_id: &Uuid,
) -> Result<Booking, Error> {
    let query = format!(
        "SELECT {} FROM bookings WHERE id = $1 AND customer_id = $2 FOR UPDATE",
        BOOKING_COLUMNS
    );

    let row = tx
        .fetch_optional(sqlx::query(&query).bind(id).bind(customer_id))
        .await?
        .ok_or_else(|| Error::not_found_error("booking not found"))?;

    booking_from_row(&row)
}

#[tracing::instrument(skip(tx, booking), fields(id = %booking.id, status = %booking.status))]
pub async fn update_booking(
    tx: &mut Transaction<'_, Database>,
    booking: &Booking,
) -> Result<(), Error> {
    tx.execute(
        sqlx::query(
            "UPDATE bookings SET driver_id = $2, status = $3, rating = $4, review = $5 WHERE id = $1",
        )
        .bind(&booking.id)
        .bind(&booking.driver_id)
        .bind(booking.status.name())
        .bind(&booking.rating)
        .bind(&booking.review),
    )
    .await?;

    Ok(())
}

fn driver_from_row(row: &PgRow) -> Result<Driver, Error> {
    Ok(Driver {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        vehicle: VehicleDetails {
            vehicle_model: row.try_get("vehicle_model")?,
            vehicle_plate: row.try_get("vehicle_plate")?,
            license_number: row.try_get("license_number")?,
        },
        average_rating: row.try_get("average_rating")?,
        total_ratings: row.try_get("total_ratings")?,
        created_at: row.try_get("created_at")?,
    })
}

#[tracing::instrument(skip(conn))]
pub async fn fetch_driver(conn: &mut PgConnection, id: &Uuid) -> Result<Driver, Error> {
    let row = conn
        .fetch_optional(
            sqlx::query(
                "SELECT u.id, u.name, u.email, u.phone, u.created_at, d.vehicle_model, d.vehicle_plate, d.license_number, d.average_rating, d.total_ratings
                FROM drivers d JOIN users u ON u.id = d.id
                WHERE d.id = $1",
            )
            .bind(id),
        )
        .await?
        .ok_or_else(|| Error::not_found_error("driver not found"))?;

    driver_from_row(&row)
}

#[tracing::instrument(skip(conn))]
pub async fn fetch_profile(conn: &mut PgConnection, id: &Uuid) -> Result<Profile, Error> {
    let row = conn
        .fetch_optional(
            sqlx::query("SELECT id, kind, name, email, phone, created_at FROM users WHERE id = $1")
                .bind(id),
        )
        .await?
        .ok_or_else(|| Error::not_found_error("user not found"))?;

    let kind: String = row.try_get("kind")?;

    match kind.parse().map_err(Error::database_error)? {
        UserKind::Customer => Ok(Profile::Customer(Customer {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            created_at: row.try_get("created_at")?,
        })),
        UserKind::Driver => Ok(Profile::Driver(fetch_driver(conn, id).await?)),
        UserKind::Admin => Ok(Profile::Admin(Admin {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
        })),
    }
}
