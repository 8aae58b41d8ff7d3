use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

#[tracing::instrument(skip(db_uri))]
pub async fn connect(db_uri: &str, max_connections: u32) -> Result<Pool<Postgres>, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(db_uri)
        .await
}
