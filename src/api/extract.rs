use std::marker::PhantomData;

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use crate::api::error::ApiError;
use crate::domain::aggregates::{Banner, Category, Link, PopularSearch, ProductDetails};
use crate::CatalogError;

/// JSON body that has passed its `validator` rules. Runs before handler logic.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::BadRequest(rejection.body_text()))?;
        value.validate().map_err(CatalogError::Validation)?;
        Ok(Self(value))
    }
}

/// Like [`ValidJson`], but a blank body yields `None`.
#[derive(Debug, Clone)]
pub struct OptionalJson<T>(pub Option<T>);

#[axum::async_trait]
impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(None));
        }
        let Json(value) = Json::<T>::from_bytes(&bytes)
            .map_err(|rejection: JsonRejection| ApiError::BadRequest(rejection.body_text()))?;
        value.validate().map_err(CatalogError::Validation)?;
        Ok(Self(Some(value)))
    }
}

/// Entity addressed by an `:id` path segment; names the 404 for unparseable ids.
pub trait PathEntity {
    const NAME: &'static str;
}

impl PathEntity for Category { const NAME: &'static str = "Category"; }
impl PathEntity for ProductDetails { const NAME: &'static str = "Product"; }
impl PathEntity for Banner { const NAME: &'static str = "Banner"; }
impl PathEntity for Link { const NAME: &'static str = "Link"; }
impl PathEntity for PopularSearch { const NAME: &'static str = "Popular search"; }

/// Uuid path id. An id that does not parse cannot name a row, so it is a 404.
#[derive(Debug)]
pub struct IdPath<E>(pub Uuid, pub PhantomData<fn() -> E>);

#[axum::async_trait]
impl<E, S> FromRequestParts<S> for IdPath<E>
where
    E: PathEntity + 'static,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<Uuid>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id, PhantomData)),
            Err(PathRejection::FailedToDeserializePathParams(err)) => {
                Err(CatalogError::not_found(E::NAME, err.body_text()).into())
            }
            Err(other) => Err(ApiError::Internal(other.body_text())),
        }
    }
}
