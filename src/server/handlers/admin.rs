use axum::extract::{Extension, Json};
use axum::http::StatusCode;

use crate::auth::User;
use crate::entities::{Analytics, NewAdmin, Profile};
use crate::error::Error;
use crate::server::extractors::JsonBody;
use crate::server::DynAPI;

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    JsonBody(params): JsonBody<NewAdmin>,
) -> Result<(StatusCode, Json<Profile>), Error> {
    let admin = api.create_admin(user, params).await?;

    Ok((StatusCode::CREATED, admin.into()))
}

pub async fn analytics(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<Analytics>, Error> {
    let analytics = api.analytics(user).await?;

    Ok(analytics.into())
}
