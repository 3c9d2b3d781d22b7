//! Handlers for `/surveys/{id}/responses` and `/responses/{id}`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/surveys/{id}/responses` | Body: `{"answers":[...], "user_id"?}`; 409 on a repeat |
//! | `GET`  | `/surveys/{id}/responses/check` | `{"has_responded": bool}` |
//! | `GET`  | `/surveys/{id}/responses` | Owner only; oldest first |
//! | `GET`  | `/responses/{id}` | Owner of the survey only |
//!
//! The two respondent-facing routes set the session cookie whenever one was
//! minted for the request, whatever the outcome.

use std::{convert::Infallible, net::SocketAddr};

use axum::{
  Json,
  extract::{ConnectInfo, FromRequestParts, Path, State},
  http::{StatusCode, header, request::Parts},
  response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tally_core::{
  response::{NewAnswer, Response as SurveyResponse, ResponseDetail, ResponseMeta},
  store::SurveyStore,
  submission,
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{CurrentUser, Respondent},
  cookie,
  error::ApiError,
  surveys::owned_survey,
};

// ─── Client metadata ─────────────────────────────────────────────────────────

/// Caller address and user agent, recorded alongside a response.
pub struct ClientInfo {
  pub ip:         Option<String>,
  pub user_agent: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
    let forwarded = parts
      .headers
      .get("x-forwarded-for")
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.split(',').next())
      .map(|v| v.trim().to_owned())
      .filter(|v| !v.is_empty());
    let peer = parts
      .extensions
      .get::<ConnectInfo<SocketAddr>>()
      .map(|ConnectInfo(addr)| addr.ip().to_string());
    let user_agent = parts
      .headers
      .get(header::USER_AGENT)
      .and_then(|v| v.to_str().ok())
      .map(str::to_owned);

    Ok(ClientInfo { ip: forwarded.or(peer), user_agent })
  }
}

// ─── Submit ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  #[serde(default)]
  pub answers: Vec<NewAnswer>,
  /// Accepted for older clients; recorded, never trusted as identity.
  pub user_id: Option<Uuid>,
}

/// `POST /surveys/{id}/responses`
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  respondent: Respondent,
  client: ClientInfo,
  Path(id): Path<Uuid>,
  Json(body): Json<SubmitBody>,
) -> Response
where
  S: SurveyStore + Clone + 'static,
{
  let Respondent { user, resolution } = respondent;
  let user_id = user.map(|u| u.user_id);
  let meta = ResponseMeta {
    ip:              client.ip,
    user_agent:      client.user_agent,
    claimed_user_id: body.user_id,
  };

  let result = submission::submit(
    state.store.as_ref(),
    id,
    resolution.identity.clone(),
    body.answers,
    meta,
  )
  .await;

  let mut res = match result {
    Ok(recorded) => {
      tracing::info!(
        survey_id = %id,
        response_id = %recorded.response_id,
        user_id = ?user_id,
        "response recorded"
      );
      (StatusCode::CREATED, Json(recorded)).into_response()
    }
    Err(e) => {
      if matches!(e, tally_core::Error::DuplicateSubmission(_)) {
        tracing::warn!(survey_id = %id, user_id = ?user_id, "duplicate submission rejected");
      }
      ApiError::from(e).into_response()
    }
  };

  cookie::apply(
    res.headers_mut(),
    resolution.set_cookie.as_ref(),
    state.config.cookie_secure,
  );
  res
}

// ─── Check ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckBody {
  pub has_responded: bool,
}

/// `GET /surveys/{id}/responses/check`
pub async fn check<S>(
  State(state): State<AppState<S>>,
  respondent: Respondent,
  Path(id): Path<Uuid>,
) -> Response
where
  S: SurveyStore + Clone + 'static,
{
  let Respondent { resolution, .. } = respondent;

  // An unknown survey answers `false`, the same as one nobody has answered.
  let result = submission::may_submit(state.store.as_ref(), id, &resolution.identity).await;

  let mut res = match result {
    Ok(may) => Json(CheckBody { has_responded: !may }).into_response(),
    Err(e) => ApiError::from(e).into_response(),
  };
  cookie::apply(
    res.headers_mut(),
    resolution.set_cookie.as_ref(),
    state.config.cookie_secure,
  );
  res
}

// ─── Owner views ─────────────────────────────────────────────────────────────

/// `GET /surveys/{id}/responses`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<SurveyResponse>>, ApiError>
where
  S: SurveyStore + Clone + 'static,
{
  owned_survey(state.store.as_ref(), id, &user).await?;
  let responses = state
    .store
    .list_responses(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(responses))
}

/// `GET /responses/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<ResponseDetail>, ApiError>
where
  S: SurveyStore + Clone + 'static,
{
  let detail = state
    .store
    .get_response(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(tally_core::Error::ResponseNotFound(id))?;
  owned_survey(state.store.as_ref(), detail.response.survey_id, &user).await?;
  Ok(Json(detail))
}
