//! Request body extractor whose rejection renders through [`AppError`].
//!
//! Accepts JSON and form-encoded bodies. An empty body stands for an empty
//! object, so endpoints whose fields are all optional can be called without
//! one.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::de::DeserializeOwned;

use crate::http::error::AppError;

const EXPECTED_JSON: &str = "Expected request with `Content-Type: application/json`";

/// Like `axum::Json`, but lenient about empty and form-encoded bodies, and
/// malformed bodies produce the API error format.
#[derive(Debug)]
pub struct ApiBody<T>(pub T);

impl<T, S> FromRequest<S> for ApiBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        if content_type.as_deref().is_some_and(is_form) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::MalformedBody(rejection.body_text()))?;
            return Ok(Self(value));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::MalformedBody(rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        match content_type.as_deref() {
            Some(ct) if is_json(ct) => {
                let Json(value) = Json::<T>::from_bytes(&bytes)?;
                Ok(Self(value))
            }
            _ => Err(AppError::MalformedBody(EXPECTED_JSON.to_string())),
        }
    }
}

/// Media type without parameters, e.g. `application/json; charset=utf-8`
/// becomes `application/json`.
fn essence(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default().trim()
}

fn is_json(content_type: &str) -> bool {
    let essence = essence(content_type);
    essence.eq_ignore_ascii_case("application/json")
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn is_form(content_type: &str) -> bool {
    essence(content_type).eq_ignore_ascii_case("application/x-www-form-urlencoded")
}
