//! Handlers for survey, question and option management.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/surveys` | `?owner_id=&published=`; anonymous callers without filters see published surveys only |
//! | `POST`   | `/surveys` | Body: [`NewSurvey`], questions and options nested |
//! | `GET`    | `/surveys/{id}` | 404 if not found |
//! | `PUT`    | `/surveys/{id}` | Owner only; body: [`SurveyPatch`] |
//! | `DELETE` | `/surveys/{id}` | Owner only; cascades |
//! | `POST`   | `/surveys/{id}/publish` | Owner only; toggles the published flag |
//! | `POST`   | `/surveys/{id}/questions` | Owner only; body: [`NewQuestion`] |
//! | `PUT`    | `/questions/{id}` | Owner only; body: [`QuestionPatch`] |
//! | `DELETE` | `/questions/{id}` | Owner only; cascades |
//! | `POST`   | `/questions/{id}/options` | Owner only; body: [`NewOption`] |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tally_core::{
  store::SurveyStore,
  survey::{
    NewOption, NewQuestion, NewSurvey, Question, QuestionPatch, Survey,
    SurveyDetail, SurveyFilter, SurveyPatch,
  },
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{CurrentUser, MaybeUser},
  error::ApiError,
};

// ─── Ownership ───────────────────────────────────────────────────────────────

/// Load a survey and check that `user` owns it.
pub(crate) async fn owned_survey<S: SurveyStore>(
  store: &S,
  survey_id: Uuid,
  user: &CurrentUser,
) -> Result<Survey, ApiError> {
  let survey = store
    .get_survey(survey_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(tally_core::Error::SurveyNotFound(survey_id))?;
  if survey.owner_id != user.0.user_id {
    return Err(ApiError::Forbidden);
  }
  Ok(survey)
}

/// Load a question and check that `user` owns its survey.
async fn owned_question<S: SurveyStore>(
  store: &S,
  question_id: Uuid,
  user: &CurrentUser,
) -> Result<Question, ApiError> {
  let question = store
    .get_question(question_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(tally_core::Error::QuestionNotFound(question_id))?;
  owned_survey(store, question.survey_id, user).await?;
  Ok(question)
}

// ─── Surveys ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub owner_id:  Option<Uuid>,
  pub published: Option<bool>,
}

/// `GET /surveys[?owner_id=<uuid>&published=<bool>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  MaybeUser(user): MaybeUser,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<SurveyDetail>>, ApiError>
where
  S: SurveyStore + Clone + 'static,
{
  let mut filter = SurveyFilter {
    owner_id:  params.owner_id,
    published: params.published,
  };
  if user.is_none() && filter.owner_id.is_none() && filter.published.is_none() {
    filter.published = Some(true);
  }

  let surveys = state
    .store
    .list_surveys(filter)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(surveys))
}

/// `POST /surveys`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<NewSurvey>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SurveyStore + Clone + 'static,
{
  let detail = state
    .store
    .create_survey(user.user_id, body)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(survey_id = %detail.survey.survey_id, owner_id = %user.user_id, "survey created");
  Ok((StatusCode::CREATED, Json(detail)))
}

/// `GET /surveys/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SurveyDetail>, ApiError>
where
  S: SurveyStore + Clone + 'static,
{
  let detail = state
    .store
    .get_survey_detail(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(tally_core::Error::SurveyNotFound(id))?;
  Ok(Json(detail))
}

/// `PUT /surveys/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  Json(patch): Json<SurveyPatch>,
) -> Result<Json<SurveyDetail>, ApiError>
where
  S: SurveyStore + Clone + 'static,
{
  owned_survey(state.store.as_ref(), id, &user).await?;
  let detail = state
    .store
    .update_survey(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or(tally_core::Error::SurveyNotFound(id))?;
  Ok(Json(detail))
}

/// `DELETE /surveys/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SurveyStore + Clone + 'static,
{
  owned_survey(state.store.as_ref(), id, &user).await?;
  state.store.delete_survey(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /surveys/{id}/publish`
pub async fn toggle_publish<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Survey>, ApiError>
where
  S: SurveyStore + Clone + 'static,
{
  owned_survey(state.store.as_ref(), id, &user).await?;
  let survey = state
    .store
    .toggle_published(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(tally_core::Error::SurveyNotFound(id))?;
  tracing::info!(survey_id = %id, published = survey.is_published, "survey publication toggled");
  Ok(Json(survey))
}

// ─── Questions and options ───────────────────────────────────────────────────

/// `POST /surveys/{id}/questions`
pub async fn add_question<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<NewQuestion>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SurveyStore + Clone + 'static,
{
  owned_survey(state.store.as_ref(), id, &user).await?;
  let question = state
    .store
    .add_question(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(question)))
}

/// `PUT /questions/{id}`
pub async fn update_question<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  Json(patch): Json<QuestionPatch>,
) -> Result<Json<Question>, ApiError>
where
  S: SurveyStore + Clone + 'static,
{
  owned_question(state.store.as_ref(), id, &user).await?;
  let question = state
    .store
    .update_question(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or(tally_core::Error::QuestionNotFound(id))?;
  Ok(Json(question))
}

/// `DELETE /questions/{id}`
pub async fn delete_question<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: SurveyStore + Clone + 'static,
{
  owned_question(state.store.as_ref(), id, &user).await?;
  state
    .store
    .delete_question(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /questions/{id}/options`
pub async fn add_option<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
  Json(body): Json<NewOption>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SurveyStore + Clone + 'static,
{
  owned_question(state.store.as_ref(), id, &user).await?;
  let question = state
    .store
    .add_option(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(question)))
}
