//! Responses and answers: the respondent-authored side of the model.
//!
//! A response is written once, atomically, and never updated. It disappears
//! only when its survey (or an answered question) is deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::Identity;

/// Request context captured at submission time. Write-only: nothing in the
/// core reads it back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
  pub ip:              Option<String>,
  pub user_agent:      Option<String>,
  /// A user id supplied in the request body by an unauthenticated client.
  /// Recorded for reference only; it never becomes the respondent identity.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub claimed_user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
  pub response_id:  Uuid,
  pub survey_id:    Uuid,
  pub respondent:   Identity,
  /// Server-assigned; never changes after creation.
  pub submitted_at: DateTime<Utc>,
  pub meta:         ResponseMeta,
}

/// One answered question within a response.
///
/// Which field carries the answer depends on the question kind: `value_text`
/// for text, `value_number` for scale, `option_ids` for single/multi.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
  pub answer_id:    Uuid,
  pub response_id:  Uuid,
  pub question_id:  Uuid,
  pub value_text:   Option<String>,
  pub value_number: Option<f64>,
  pub option_ids:   Vec<Uuid>,
}

/// A response with its answers, as returned to the survey owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseDetail {
  #[serde(flatten)]
  pub response: Response,
  pub answers:  Vec<Answer>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// One answer as submitted. Shape is not checked against the question kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAnswer {
  pub question_id:  Uuid,
  pub value_text:   Option<String>,
  pub value_number: Option<f64>,
  #[serde(default)]
  pub option_ids:   Vec<Uuid>,
}

impl NewAnswer {
  pub fn text(question_id: Uuid, text: impl Into<String>) -> Self {
    Self { question_id, value_text: Some(text.into()), ..Self::default() }
  }

  pub fn number(question_id: Uuid, value: f64) -> Self {
    Self { question_id, value_number: Some(value), ..Self::default() }
  }

  pub fn options(question_id: Uuid, option_ids: impl Into<Vec<Uuid>>) -> Self {
    Self { question_id, option_ids: option_ids.into(), ..Self::default() }
  }
}

/// Input to [`crate::store::SurveyStore::record_response`].
/// `submitted_at` is always set by the store.
#[derive(Debug, Clone)]
pub struct NewResponse {
  pub survey_id:  Uuid,
  pub respondent: Identity,
  pub answers:    Vec<NewAnswer>,
  pub meta:       ResponseMeta,
}
