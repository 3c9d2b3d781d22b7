//! The `SurveyStore` trait.
//!
//! Implemented by storage backends (e.g. `tally-store-sqlite`). The HTTP layer
//! and the facades in [`crate::analytics`] and [`crate::submission`] depend on
//! this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  analytics::AnswerSheet,
  identity::Identity,
  response::{NewResponse, Response, ResponseDetail},
  survey::{
    NewOption, NewQuestion, NewSurvey, Question, QuestionPatch, Survey,
    SurveyDetail, SurveyFilter, SurveyPatch,
  },
  user::{StoredCredential, User},
};

/// Abstraction over a Tally storage backend.
///
/// Every method runs in its own transaction. Deletes cascade to the whole
/// ownership subtree.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`). Backend errors must convert into
/// [`crate::Error`] so domain failures (duplicates, unavailable surveys) keep
/// their meaning across the boundary.
pub trait SurveyStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a user. Fails with [`crate::Error::EmailTaken`] on a duplicate
  /// email.
  fn add_user<'a>(
    &'a self,
    email: &'a str,
    password_hash: &'a str,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'a;

  /// Look up a user and their password hash by email.
  fn get_credential<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<StoredCredential>, Self::Error>> + Send + 'a;

  // ── Surveys ───────────────────────────────────────────────────────────

  /// Create a draft survey together with its questions and options.
  fn create_survey(
    &self,
    owner_id: Uuid,
    input: NewSurvey,
  ) -> impl Future<Output = Result<SurveyDetail, Self::Error>> + Send + '_;

  /// The survey envelope alone. Returns `None` if not found.
  fn get_survey(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Survey>, Self::Error>> + Send + '_;

  /// The survey with questions and options in display order.
  fn get_survey_detail(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<SurveyDetail>, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_surveys(
    &self,
    filter: SurveyFilter,
  ) -> impl Future<Output = Result<Vec<SurveyDetail>, Self::Error>> + Send + '_;

  fn update_survey(
    &self,
    id: Uuid,
    patch: SurveyPatch,
  ) -> impl Future<Output = Result<Option<SurveyDetail>, Self::Error>> + Send + '_;

  /// Flip the published flag and return the updated survey.
  fn toggle_published(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Survey>, Self::Error>> + Send + '_;

  /// Delete a survey and everything beneath it. Returns `false` if absent.
  fn delete_survey(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Questions and options ─────────────────────────────────────────────

  /// Append a question (with options) to a survey. Without an explicit
  /// `order` it lands after the last existing question.
  fn add_question(
    &self,
    survey_id: Uuid,
    input: NewQuestion,
  ) -> impl Future<Output = Result<Question, Self::Error>> + Send + '_;

  fn get_question(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Question>, Self::Error>> + Send + '_;

  fn update_question(
    &self,
    id: Uuid,
    patch: QuestionPatch,
  ) -> impl Future<Output = Result<Option<Question>, Self::Error>> + Send + '_;

  /// Delete a question, its options and every answer to it.
  fn delete_question(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Add an option and return the question with all its options.
  fn add_option(
    &self,
    question_id: Uuid,
    input: NewOption,
  ) -> impl Future<Output = Result<Question, Self::Error>> + Send + '_;

  // ── Responses ─────────────────────────────────────────────────────────

  /// Whether `identity` already has a response on record for the survey.
  fn has_responded<'a>(
    &'a self,
    survey_id: Uuid,
    identity: &'a Identity,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Atomically record a response and all of its answers.
  ///
  /// Availability and uniqueness are re-checked inside the write transaction:
  /// fails with [`crate::Error::SurveyNotAvailable`] for a missing or draft
  /// survey and [`crate::Error::DuplicateSubmission`] when the identity has
  /// already responded, including when a concurrent submission wins the race.
  fn record_response(
    &self,
    input: NewResponse,
  ) -> impl Future<Output = Result<Response, Self::Error>> + Send + '_;

  /// All responses to a survey, oldest first.
  fn list_responses(
    &self,
    survey_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Response>, Self::Error>> + Send + '_;

  fn get_response(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ResponseDetail>, Self::Error>> + Send + '_;

  // ── Analytics input ───────────────────────────────────────────────────

  /// Read the raw material for a survey report in one consistent snapshot.
  /// Returns `None` if the survey does not exist.
  fn answer_sheet(
    &self,
    survey_id: Uuid,
  ) -> impl Future<Output = Result<Option<AnswerSheet>, Self::Error>> + Send + '_;
}
