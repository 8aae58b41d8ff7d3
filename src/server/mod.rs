mod extractors;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};

use crate::api::API;
use crate::error::Error;
use crate::server::handlers::{admin, auth, bookings, drivers};

pub use extractors::{BearerToken, JsonBody, PathParam, QueryParams};

pub type DynAPI = Arc<dyn API + Send + Sync>;

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/admins", post(admin::create))
        .route("/admin/analytics", get(admin::analytics))
        .route("/bookings", post(bookings::create))
        .route("/bookings/pending", get(bookings::list_pending))
        .route("/bookings/my-history", get(bookings::history))
        .route("/bookings/my-rides", get(bookings::rides))
        .route("/bookings/:id", get(bookings::find))
        .route("/bookings/:id/accept", patch(bookings::accept))
        .route("/bookings/:id/cancel", patch(bookings::cancel))
        .route("/bookings/:id/rate", post(bookings::rate))
        .route("/drivers/:id/ratings", get(drivers::ratings))
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let api = Arc::new(api) as DynAPI;

    let app = router(api);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| {
            tracing::error!("server error: {}", err);
            Error::unexpected_error()
        })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }

    tracing::info!("shutdown signal received");
}
