use axum::extract::{Extension, Json};
use uuid::Uuid;

use crate::entities::DriverRatings;
use crate::error::Error;
use crate::server::extractors::PathParam;
use crate::server::DynAPI;

pub async fn ratings(
    Extension(api): Extension<DynAPI>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<DriverRatings>, Error> {
    let ratings = api.driver_ratings(id).await?;

    Ok(ratings.into())
}
