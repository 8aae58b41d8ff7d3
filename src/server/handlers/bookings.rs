use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{Booking, NewBooking, Page, RatingOutcome};
use crate::error::Error;
use crate::server::extractors::{JsonBody, PathParam, QueryParams};
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct RateParams {
    rating: Option<i32>,
    review: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct RateResponse {
    #[serde(flatten)]
    outcome: RatingOutcome,
    booking: Booking,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    JsonBody(params): JsonBody<NewBooking>,
) -> Result<(StatusCode, Json<Booking>), Error> {
    let booking = api.create_booking(user, params).await?;

    Ok((StatusCode::CREATED, booking.into()))
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Booking>, Error> {
    let booking = api.find_booking(user, id).await?;

    Ok(booking.into())
}

pub async fn list_pending(
    Extension(api): Extension<DynAPI>,
    user: User,
    QueryParams(page): QueryParams<Page>,
) -> Result<Json<Vec<Booking>>, Error> {
    let bookings = api.list_pending_bookings(user, page).await?;

    Ok(bookings.into())
}

pub async fn history(
    Extension(api): Extension<DynAPI>,
    user: User,
    QueryParams(page): QueryParams<Page>,
) -> Result<Json<Vec<Booking>>, Error> {
    let bookings = api.list_booking_history(user, page).await?;

    Ok(bookings.into())
}

pub async fn rides(
    Extension(api): Extension<DynAPI>,
    user: User,
    QueryParams(page): QueryParams<Page>,
) -> Result<Json<Vec<Booking>>, Error> {
    let bookings = api.list_driver_rides(user, page).await?;

    Ok(bookings.into())
}

pub async fn accept(
    Extension(api): Extension<DynAPI>,
    user: User,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Booking>, Error> {
    let booking = api.accept_booking(user, id).await?;

    Ok(booking.into())
}

pub async fn cancel(
    Extension(api): Extension<DynAPI>,
    user: User,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Booking>, Error> {
    let booking = api.cancel_booking(user, id).await?;

    Ok(booking.into())
}

pub async fn rate(
    Extension(api): Extension<DynAPI>,
    user: User,
    PathParam(id): PathParam<Uuid>,
    JsonBody(params): JsonBody<RateParams>,
) -> Result<Json<RateResponse>, Error> {
    let (booking, outcome) = api
        .rate_booking(user, id, params.rating, params.review)
        .await?;

    Ok(RateResponse { outcome, booking }.into())
}
