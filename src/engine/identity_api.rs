use super::helpers::fetch_profile;
use super::{Database, Engine};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Acquire, Executor, Row, Transaction};
use uuid::Uuid;

use crate::{
    api::IdentityAPI,
    auth::{password, Platform, User},
    entities::{
        normalize_email, validate_credentials, Credentials, NewAdmin, Profile, Registration,
        Session, UserKind, ValidRegistration,
    },
    error::Error,
};

#[tracing::instrument(skip(tx, credentials), fields(email = %credentials.email))]
async fn insert_user(
    tx: &mut Transaction<'_, Database>,
    kind: UserKind,
    credentials: &Credentials,
) -> Result<Uuid, Error> {
    let id = Uuid::new_v4();

    tx.execute(
        sqlx::query(
            "INSERT INTO users (id, kind, name, email, password_hash, phone, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&id)
        .bind(kind.name())
        .bind(&credentials.name)
        .bind(&credentials.email)
        .bind(password::hash(&credentials.password))
        .bind(&credentials.phone)
        .bind(Utc::now()),
    )
    .await
    .map_err(|err| match Error::from(err) {
        err if err.is_conflict_error() => Error::conflict_error("email already registered"),
        err => err,
    })?;

    Ok(id)
}

#[async_trait]
impl IdentityAPI for Engine {
    #[tracing::instrument(skip_all)]
    async fn register(&self, registration: Registration) -> Result<Profile, Error> {
        let registration = registration.validate()?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let id = match &registration {
            ValidRegistration::Customer(credentials) => {
                insert_user(&mut tx, UserKind::Customer, credentials).await?
            }
            ValidRegistration::Driver(credentials, vehicle) => {
                let id = insert_user(&mut tx, UserKind::Driver, credentials).await?;

                tx.execute(
                    sqlx::query(
                        "INSERT INTO drivers (id, vehicle_model, vehicle_plate, license_number, average_rating, total_ratings) VALUES ($1, $2, $3, $4, 0, 0)",
                    )
                    .bind(&id)
                    .bind(&vehicle.vehicle_model)
                    .bind(&vehicle.vehicle_plate)
                    .bind(&vehicle.license_number),
                )
                .await?;

                id
            }
        };

        let profile = fetch_profile(&mut tx, &id).await?;

        tx.commit().await?;

        tracing::info!(user_id = %id, kind = %profile.kind(), "member registered");

        Ok(profile)
    }

    #[tracing::instrument(skip(self, params))]
    async fn create_admin(&self, user: User, params: NewAdmin) -> Result<Profile, Error> {
        self.authorize(user.clone(), "create_admin", Platform::default())?;

        let credentials = validate_credentials(params.name, params.email, params.password, None)?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let id = insert_user(&mut tx, UserKind::Admin, &credentials).await?;
        let profile = fetch_profile(&mut tx, &id).await?;

        tx.commit().await?;

        tracing::info!(admin_id = %id, "admin created");

        Ok(profile)
    }

    #[tracing::instrument(skip(self, password))]
    async fn ensure_admin(&self, email: String, password: String) -> Result<(), Error> {
        let credentials =
            validate_credentials(Some("Administrator".into()), Some(email), Some(password), None)?;

        let mut conn = self.pool.acquire().await?;

        let existing = conn
            .fetch_optional(
                sqlx::query("SELECT kind FROM users WHERE email = $1").bind(&credentials.email),
            )
            .await?;

        if let Some(row) = existing {
            let kind: String = row.try_get("kind")?;

            if kind.parse::<UserKind>().map_err(Error::database_error)? != UserKind::Admin {
                tracing::error!(kind = %kind, "bootstrap admin email belongs to another member");
                return Err(Error::conflict_error("email registered to a non-admin member"));
            }

            tracing::info!("bootstrap admin already present");
            return Ok(());
        }

        let mut tx = conn.begin().await?;
        insert_user(&mut tx, UserKind::Admin, &credentials).await?;
        tx.commit().await?;

        tracing::info!("bootstrap admin created");

        Ok(())
    }

    #[tracing::instrument(skip(self, password))]
    async fn login(&self, email: String, password: String) -> Result<Session, Error> {
        let email = normalize_email(&email);

        let mut conn = self.pool.acquire().await?;

        let row = conn
            .fetch_optional(
                sqlx::query("SELECT id, password_hash FROM users WHERE email = $1").bind(&email),
            )
            .await?
            .ok_or_else(Error::unauthorized_error)?;

        let id: Uuid = row.try_get("id")?;
        let password_hash: String = row.try_get("password_hash")?;

        if !password::verify(&password, &password_hash)? {
            tracing::warn!("login rejected");
            return Err(Error::unauthorized_error());
        }

        let purged = conn
            .execute(sqlx::query("DELETE FROM sessions WHERE expires_at <= now()"))
            .await?
            .rows_affected();

        if purged > 0 {
            tracing::debug!(purged, "expired sessions removed");
        }

        let token = Uuid::new_v4();
        let expires_at = Utc::now() + self.settings.session_ttl;

        conn.execute(
            sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
                .bind(&token)
                .bind(&id)
                .bind(&expires_at),
        )
        .await?;

        let user = fetch_profile(&mut conn, &id).await?;

        Ok(Session {
            token,
            expires_at,
            user,
        })
    }

    #[tracing::instrument(skip_all)]
    async fn logout(&self, token: Uuid) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;

        conn.execute(sqlx::query("DELETE FROM sessions WHERE token = $1").bind(&token))
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all)]
    async fn authenticate(&self, token: Uuid) -> Result<User, Error> {
        let mut conn = self.pool.acquire().await?;

        let row = conn
            .fetch_optional(
                sqlx::query(
                    "SELECT u.id, u.kind FROM sessions s JOIN users u ON u.id = s.user_id
                    WHERE s.token = $1 AND s.expires_at > now()",
                )
                .bind(&token),
            )
            .await?
            .ok_or_else(Error::unauthorized_error)?;

        let kind: String = row.try_get("kind")?;

        Ok(User::new(
            row.try_get("id")?,
            kind.parse().map_err(Error::database_error)?,
        ))
    }

    #[tracing::instrument(skip(self))]
    async fn find_profile(&self, user: User) -> Result<Profile, Error> {
        let mut conn = self.pool.acquire().await?;

        fetch_profile(&mut conn, &user.id).await
    }
}
