//! HTTP error responses. Every failing handler answers with a JSON body of
//! the shape `{"detail": "..."}` and an appropriate status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::reader::ParseError;
use crate::state::StoreError;

#[derive(Debug)]
pub struct ApiError {
  pub status: StatusCode,
  pub detail: String,
}

impl ApiError {
  pub fn bad_request(detail: impl Into<String>) -> Self {
    ApiError { status: StatusCode::BAD_REQUEST, detail: detail.into() }
  }

  pub fn not_found(detail: impl Into<String>) -> Self {
    ApiError { status: StatusCode::NOT_FOUND, detail: detail.into() }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.status, Json(json!({ "detail": self.detail }))).into_response()
  }
}

impl From<StoreError> for ApiError {
  fn from(e: StoreError) -> Self {
    match e {
      StoreError::QuizNotFound | StoreError::SessionNotFound => ApiError::not_found(e.to_string()),
      StoreError::InvalidOption => ApiError::bad_request(e.to_string()),
    }
  }
}

impl From<ParseError> for ApiError {
  fn from(e: ParseError) -> Self {
    ApiError::bad_request(format!("Failed to parse DOCX: {}", e))
  }
}
