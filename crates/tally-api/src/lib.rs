//! JSON HTTP API for Tally.
//!
//! Exposes an axum [`Router`] backed by any [`SurveyStore`]: survey
//! management for owners, response submission for respondents (signed in or
//! anonymous via a session cookie) and per-question analytics.

pub mod analytics;
pub mod auth;
pub mod cookie;
pub mod error;
pub mod responses;
pub mod surveys;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post, put},
};
use serde::Deserialize;
use tally_core::store::SurveyStore;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TALLY_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub store_path:    PathBuf,
  /// Add `Secure` to the session cookie. Enable when served over HTTPS.
  pub cookie_secure: bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          "127.0.0.1".to_string(),
      port:          8080,
      store_path:    PathBuf::from("tally.db"),
      cookie_secure: false,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: SurveyStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SurveyStore + Clone + 'static,
{
  Router::new()
    // Surveys
    .route("/surveys", get(surveys::list::<S>).post(surveys::create::<S>))
    .route(
      "/surveys/{id}",
      get(surveys::get_one::<S>)
        .put(surveys::update::<S>)
        .delete(surveys::delete::<S>),
    )
    .route("/surveys/{id}/publish", post(surveys::toggle_publish::<S>))
    .route("/surveys/{id}/questions", post(surveys::add_question::<S>))
    // Questions
    .route(
      "/questions/{id}",
      put(surveys::update_question::<S>)
        .delete(surveys::delete_question::<S>),
    )
    .route("/questions/{id}/options", post(surveys::add_option::<S>))
    // Responses
    .route(
      "/surveys/{id}/responses",
      get(responses::list::<S>).post(responses::submit::<S>),
    )
    .route("/surveys/{id}/responses/check", get(responses::check::<S>))
    .route("/responses/{id}", get(responses::get_one::<S>))
    // Analytics
    .route("/surveys/{id}/analytics", get(analytics::survey::<S>))
    .route(
      "/surveys/{id}/analytics/question/{qid}",
      get(analytics::question::<S>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
