//! Handlers for `/surveys/{id}/analytics`. Owner only; every request
//! recomputes from the stored answers.

use axum::{
  Json,
  extract::{Path, State},
};
use tally_core::{
  analytics::{self, QuestionReport, SurveyReport},
  store::SurveyStore,
};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError, surveys::owned_survey};

/// `GET /surveys/{id}/analytics`
pub async fn survey<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<SurveyReport>, ApiError>
where
  S: SurveyStore + Clone + 'static,
{
  owned_survey(state.store.as_ref(), id, &user).await?;
  let report = analytics::survey_report(state.store.as_ref(), id).await?;
  Ok(Json(report))
}

/// `GET /surveys/{id}/analytics/question/{qid}`
pub async fn question<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path((id, question_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<QuestionReport>, ApiError>
where
  S: SurveyStore + Clone + 'static,
{
  owned_survey(state.store.as_ref(), id, &user).await?;
  let report = analytics::question_report(state.store.as_ref(), id, question_id).await?;
  Ok(Json(report))
}
