//! Error types for `tally-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("survey not found: {0}")]
  SurveyNotFound(Uuid),

  #[error("question not found in survey: {0}")]
  QuestionNotFound(Uuid),

  #[error("response not found: {0}")]
  ResponseNotFound(Uuid),

  /// The survey is unpublished or does not exist. Both cases share one
  /// message so drafts are not revealed to respondents.
  #[error("survey not available")]
  SurveyNotAvailable(Uuid),

  #[error("a response to survey {0} has already been submitted")]
  DuplicateSubmission(Uuid),

  #[error("email already registered: {0}")]
  EmailTaken(String),

  /// A write referenced a question or option that does not exist.
  #[error("dangling reference: {0}")]
  DanglingReference(String),

  #[error("could not decode stored value: {0}")]
  Decode(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
