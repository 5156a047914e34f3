//! Request handlers, one module per resource.

pub mod downloads;
pub mod health;
pub mod pages;
pub mod projects;
pub mod releases;
pub mod thumbnails;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::http::{StatusCode, Uri};
use ims_db::ListOrder;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};

/// A request body as extracted by axum. Rejections (such as an oversized
/// body) are reported through the envelope like any other error.
pub(crate) type Body = Result<Bytes, BytesRejection>;

/// Query parameters accepted by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub ordering: Option<String>,
}

impl ListParams {
    /// `newest` when absent; anything other than `newest` or `oldest` is a
    /// bad request.
    pub(crate) fn order(&self) -> ApiResult<ListOrder> {
        match self.ordering.as_deref() {
            None => Ok(ListOrder::default()),
            Some(value) => ListOrder::parse(value).ok_or_else(|| {
                ApiError::bad_request(format!(
                    "ordering must be \"newest\" or \"oldest\", not {value:?}"
                ))
            }),
        }
    }
}

/// Router fallback for paths that match no endpoint.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, format!("no endpoint at {}", uri.path()))
}

/// Parse a numeric path segment. Non-numeric ids are a bad request.
pub(crate) fn parse_id(segment: &str, what: &str) -> ApiResult<u32> {
    segment
        .parse()
        .map_err(|_| ApiError::bad_request(format!("{what} must be an integer ID")))
}

pub(crate) fn parse_json<T: DeserializeOwned>(body: Body) -> ApiResult<T> {
    let body = body.map_err(|e| ApiError::new(e.status(), e.body_text()))?;
    serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("JSON format error or missing field: {e}")))
}
