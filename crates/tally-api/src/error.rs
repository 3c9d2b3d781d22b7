//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden")]
  Forbidden,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] tally_core::Error),
}

impl ApiError {
  /// Wrap any store error; its domain meaning survives the conversion.
  pub fn store<E: Into<tally_core::Error>>(e: E) -> Self { Self::Core(e.into()) }

  pub fn status(&self) -> StatusCode {
    use tally_core::Error as E;
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden => StatusCode::FORBIDDEN,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Core(e) => match e {
        E::SurveyNotFound(_)
        | E::QuestionNotFound(_)
        | E::ResponseNotFound(_)
        | E::SurveyNotAvailable(_) => StatusCode::NOT_FOUND,
        E::DuplicateSubmission(_) | E::EmailTaken(_) => StatusCode::CONFLICT,
        E::DanglingReference(_) => StatusCode::BAD_REQUEST,
        E::Decode(_) | E::Serialization(_) | E::Store(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }

    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"tally\""),
      );
    }
    res
  }
}
