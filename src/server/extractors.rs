use async_trait::async_trait;
use axum::{
    body::HttpBody,
    extract::{FromRequest, Json, Path, Query, RequestParts},
    http::{header::AUTHORIZATION, HeaderMap},
    BoxError,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::auth::User;
use crate::error::Error;
use crate::server::DynAPI;

/// Session token taken from an `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, Copy)]
pub struct BearerToken(pub Uuid);

fn bearer_token(headers: &HeaderMap) -> Result<Uuid, Error> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(Error::unauthorized_error)?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or_else(Error::unauthorized_error)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(Error::unauthorized_error());
    }

    Uuid::parse_str(token.trim()).map_err(|_| Error::unauthorized_error())
}

#[async_trait]
impl<B> FromRequest<B> for BearerToken
where
    B: Send,
{
    type Rejection = Error;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        Ok(Self(bearer_token(req.headers())?))
    }
}

#[async_trait]
impl<B> FromRequest<B> for User
where
    B: Send,
{
    type Rejection = Error;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request(req).await?;

        let api = req
            .extensions()
            .get::<DynAPI>()
            .cloned()
            .ok_or_else(Error::unexpected_error)?;

        api.authenticate(token).await
    }
}

/// JSON body whose parse failures surface as validation errors.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, B> FromRequest<B> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    B: HttpBody + Send,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Rejection = Error;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req)
            .await
            .map_err(|rejection| Error::invalid_input_error(&rejection.to_string()))?;

        Ok(Self(value))
    }
}

/// Path parameters; a malformed segment is a validation error.
pub struct PathParam<T>(pub T);

#[async_trait]
impl<T, B> FromRequest<B> for PathParam<T>
where
    T: DeserializeOwned + Send,
    B: Send,
{
    type Rejection = Error;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request(req)
            .await
            .map_err(|rejection| Error::invalid_input_error(&rejection.to_string()))?;

        Ok(Self(value))
    }
}

pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, B> FromRequest<B> for QueryParams<T>
where
    T: DeserializeOwned + Send,
    B: Send,
{
    type Rejection = Error;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request(req)
            .await
            .map_err(|rejection| Error::invalid_input_error(&rejection.to_string()))?;

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_test() {
        let token = Uuid::new_v4();
        let mut headers = HeaderMap::new();

        assert!(bearer_token(&headers).unwrap_err().is_unauthorized_error());

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        assert_eq!(bearer_token(&headers).unwrap(), token);

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {}", token)).unwrap(),
        );
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer not-a-token"));
        assert!(bearer_token(&headers).is_err());
    }
}
