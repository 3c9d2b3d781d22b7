//! HTTP Basic-auth extractors.
//!
//! Credentials are `email:password`, checked against the argon2 hash stored
//! for the user. [`CurrentUser`] rejects with `401`; [`MaybeUser`] and
//! [`Respondent`] fall back to anonymous instead.

use std::convert::Infallible;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use tally_core::{
  identity::{self, Resolution},
  store::SurveyStore,
  user::User,
};

use crate::{AppState, cookie, error::ApiError};

/// `(email, password)` from an `Authorization: Basic` header.
pub fn parse_basic(headers: &HeaderMap) -> Option<(String, String)> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())?;
  let encoded = header_val.strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded.trim()).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (email, password) = creds.split_once(':')?;
  Some((email.to_owned(), password.to_owned()))
}

/// Resolve the request's credentials to a user.
///
/// `Ok(None)` means no usable credentials: missing header, unknown email or
/// wrong password. Store failures are errors.
pub async fn authenticate<S: SurveyStore>(
  headers: &HeaderMap,
  store: &S,
) -> Result<Option<User>, ApiError> {
  let Some((email, password)) = parse_basic(headers) else {
    return Ok(None);
  };
  let Some(credential) = store
    .get_credential(&email)
    .await
    .map_err(ApiError::store)?
  else {
    return Ok(None);
  };

  // argon2 is deliberately slow; keep it off the async workers.
  let hash = credential.password_hash;
  let verified = tokio::task::spawn_blocking(move || {
    PasswordHash::new(&hash).is_ok_and(|parsed| {
      Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
    })
  })
  .await
  .unwrap_or(false);

  Ok(verified.then_some(credential.user))
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// An authenticated user; rejects with `401` otherwise.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: SurveyStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    authenticate(&parts.headers, state.store.as_ref())
      .await?
      .map(CurrentUser)
      .ok_or(ApiError::Unauthorized)
  }
}

/// The authenticated user if the credentials check out, else `None`.
pub struct MaybeUser(pub Option<User>);

impl<S> FromRequestParts<AppState<S>> for MaybeUser
where
  S: SurveyStore + Clone + 'static,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    match authenticate(&parts.headers, state.store.as_ref()).await {
      Ok(user) => Ok(MaybeUser(user)),
      Err(e) => {
        tracing::warn!(error = %e, "credential lookup failed; treating request as anonymous");
        Ok(MaybeUser(None))
      }
    }
  }
}

/// The resolved respondent of a submission-side request, plus the cookie to
/// set when a session token was minted for it.
pub struct Respondent {
  pub user:       Option<User>,
  pub resolution: Resolution,
}

impl<S> FromRequestParts<AppState<S>> for Respondent
where
  S: SurveyStore + Clone + 'static,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
    let session = cookie::read_session(&parts.headers);
    let resolution =
      identity::resolve(user.as_ref().map(|u| u.user_id), session.as_deref());
    Ok(Respondent { user, resolution })
  }
}
