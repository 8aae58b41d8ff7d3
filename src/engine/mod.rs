mod analytics_api;
mod booking_api;
mod helpers;
mod identity_api;
mod rating_api;

use oso::Oso;
use sqlx::{Executor, Pool, Postgres};

use crate::{api::API, auth::authorizor, config::Settings, error::Error};

type Database = Postgres;

pub struct Engine {
    pool: Pool<Database>,
    authorizor: Oso,
    settings: Settings,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub async fn new(pool: Pool<Database>, settings: Settings) -> Result<Self, Error> {
        // identity
        pool.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                kind VARCHAR NOT NULL,
                name VARCHAR NOT NULL,
                email VARCHAR NOT NULL UNIQUE,
                password_hash VARCHAR NOT NULL,
                phone VARCHAR,
                created_at TIMESTAMPTZ NOT NULL
            )",
        )
        .await?;

        pool.execute(
            "CREATE TABLE IF NOT EXISTS drivers (
                id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                vehicle_model VARCHAR NOT NULL,
                vehicle_plate VARCHAR NOT NULL,
                license_number VARCHAR NOT NULL,
                average_rating DOUBLE PRECISION NOT NULL DEFAULT 0,
                total_ratings INT8 NOT NULL DEFAULT 0
            )",
        )
        .await?;

        pool.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                token UUID PRIMARY KEY,
                user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                expires_at TIMESTAMPTZ NOT NULL
            )",
        )
        .await?;

        pool.execute("CREATE INDEX IF NOT EXISTS sessions_expires_at_idx ON sessions (expires_at)")
            .await?;

        // booking ledger
        pool.execute(
            "CREATE TABLE IF NOT EXISTS bookings (
                id UUID PRIMARY KEY,
                customer_id UUID NOT NULL REFERENCES users(id),
                driver_id UUID REFERENCES drivers(id),
                pickup_location VARCHAR NOT NULL,
                dropoff_location VARCHAR NOT NULL,
                fare DOUBLE PRECISION NOT NULL CHECK (fare >= 0),
                distance DOUBLE PRECISION NOT NULL CHECK (distance >= 0),
                status VARCHAR NOT NULL,
                rating INT4 CHECK (rating BETWEEN 1 AND 5),
                review TEXT,
                created_at TIMESTAMPTZ NOT NULL
            )",
        )
        .await?;

        pool.execute(
            "CREATE INDEX IF NOT EXISTS bookings_status_created_at_idx ON bookings (status, created_at DESC)",
        )
        .await?;
        pool.execute(
            "CREATE INDEX IF NOT EXISTS bookings_customer_created_at_idx ON bookings (customer_id, created_at DESC)",
        )
        .await?;
        pool.execute(
            "CREATE INDEX IF NOT EXISTS bookings_driver_created_at_idx ON bookings (driver_id, created_at DESC)",
        )
        .await?;

        Ok(Self {
            pool,
            authorizor: authorizor::new()?,
            settings,
        })
    }
}

impl Engine {
    pub fn authorize<Actor, Action, Resource>(
        &self,
        actor: Actor,
        action: Action,
        resource: Resource,
    ) -> Result<(), Error>
    where
        Actor: oso::ToPolar,
        Action: oso::ToPolar,
        Resource: oso::ToPolar,
    {
        if self.authorizor.is_allowed(actor, action, resource)? {
            return Ok(());
        }

        Err(Error::forbidden_error())
    }
}

impl API for Engine {}
