use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::auth::User;
use crate::entities::{Profile, Registration, Session};
use crate::error::Error;
use crate::server::extractors::{BearerToken, JsonBody};
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct LoginParams {
    email: String,
    password: String,
}

pub async fn register(
    Extension(api): Extension<DynAPI>,
    JsonBody(params): JsonBody<Registration>,
) -> Result<(StatusCode, Json<Profile>), Error> {
    let profile = api.register(params).await?;

    Ok((StatusCode::CREATED, profile.into()))
}

pub async fn login(
    Extension(api): Extension<DynAPI>,
    JsonBody(params): JsonBody<LoginParams>,
) -> Result<Json<Session>, Error> {
    let session = api.login(params.email, params.password).await?;

    Ok(session.into())
}

pub async fn logout(
    Extension(api): Extension<DynAPI>,
    BearerToken(token): BearerToken,
) -> Result<Json<()>, Error> {
    api.logout(token).await?;

    Ok(().into())
}

pub async fn me(Extension(api): Extension<DynAPI>, user: User) -> Result<Json<Profile>, Error> {
    let profile = api.find_profile(user).await?;

    Ok(profile.into())
}
