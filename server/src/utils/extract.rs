use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Json, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::models::payload::ValidationFailure;
use crate::utils::error::AppError;

/// JSON body extractor whose rejections use the API's validation error shape.
///
/// Payload fields are optional at the decoding stage so that missing ones are
/// reported by validation. Malformed JSON, a missing content type or a wrong
/// field type is reported as a single `body` entry carrying the decoder's
/// message.
pub struct JsonPayload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::ValidationError(ValidationFailure::single(
                    "body",
                    rejection.body_text(),
                ))
            })?;

        Ok(JsonPayload(data))
    }
}

/// Query-string extractor with the same rejection shape as [`JsonPayload`].
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError::ValidationError(ValidationFailure::single(
                    "query",
                    rejection.body_text(),
                ))
            })?;

        Ok(QueryParams(params))
    }
}
