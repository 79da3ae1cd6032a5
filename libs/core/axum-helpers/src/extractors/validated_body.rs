//! Body extractor accepting JSON or form-encoded payloads.

use crate::errors::AppError;
use crate::extractors::ValidatedJson;
use axum::extract::{Form, FromRequest, Request};
use axum::http::{HeaderMap, header};
use serde::de::DeserializeOwned;
use validator::Validate;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Like [`ValidatedJson`], but a body sent as
/// `application/x-www-form-urlencoded` is parsed as a form instead.
///
/// Any other content type goes through the JSON path, so a missing or
/// unsupported content type is rejected exactly as `ValidatedJson` does.
///
/// # Example
/// ```ignore
/// use axum_helpers::extractors::ValidatedBody;
///
/// async fn create_room(ValidatedBody(payload): ValidatedBody<CreateRoom>) -> String {
///     payload.name
/// }
/// ```
pub struct ValidatedBody<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedBody<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(req.headers()) {
            let Form(data) = Form::<T>::from_request(req, state).await?;
            data.validate()?;
            return Ok(ValidatedBody(data));
        }

        let ValidatedJson(data) = ValidatedJson::<T>::from_request(req, state).await?;
        Ok(ValidatedBody(data))
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}
