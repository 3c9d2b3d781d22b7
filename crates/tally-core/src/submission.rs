//! Submission guard and recorder facade.
//!
//! [`submit`] checks availability and prior submissions up front so the common
//! rejection paths never open a write transaction. The store re-checks both
//! inside the insert transaction, backed by unique indexes, so two racing
//! submissions from one identity cannot both succeed.

use uuid::Uuid;

use crate::{
  Error, Result,
  identity::Identity,
  response::{NewAnswer, NewResponse, Response, ResponseMeta},
  store::SurveyStore,
};

/// Whether `identity` may still submit a response to `survey_id`.
pub async fn may_submit<S: SurveyStore>(
  store: &S,
  survey_id: Uuid,
  identity: &Identity,
) -> Result<bool> {
  let responded = store
    .has_responded(survey_id, identity)
    .await
    .map_err(Into::into)?;
  Ok(!responded)
}

/// Record a response for `respondent`.
///
/// Fails with [`Error::SurveyNotAvailable`] when the survey is missing or
/// unpublished, and with [`Error::DuplicateSubmission`] when the respondent
/// already has a response on record.
pub async fn submit<S: SurveyStore>(
  store: &S,
  survey_id: Uuid,
  respondent: Identity,
  answers: Vec<NewAnswer>,
  meta: ResponseMeta,
) -> Result<Response> {
  let survey = store.get_survey(survey_id).await.map_err(Into::into)?;
  if !survey.is_some_and(|s| s.is_published) {
    return Err(Error::SurveyNotAvailable(survey_id));
  }

  if !may_submit(store, survey_id, &respondent).await? {
    return Err(Error::DuplicateSubmission(survey_id));
  }

  store
    .record_response(NewResponse { survey_id, respondent, answers, meta })
    .await
    .map_err(Into::into)
}
