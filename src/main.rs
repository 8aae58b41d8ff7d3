use rideshare::api::IdentityAPI;
use rideshare::config::Config;
use rideshare::engine::Engine;
use rideshare::error::Error;
use rideshare::{db, server};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let pool = db::connect(&config.database_url, config.max_connections).await?;

    let engine = Engine::new(pool, config.settings.clone()).await?;

    if let Some(admin) = config.bootstrap_admin.clone() {
        engine.ensure_admin(admin.email, admin.password).await?;
    }

    server::serve(engine, config.bind_address).await
}
