//! Surveys, questions and options: the owner-authored side of the model.
//!
//! A survey owns an ordered list of questions; single- and multi-choice
//! questions own an ordered list of options. Display order is the explicit
//! `order` field, ties broken by insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

// ─── Question type ───────────────────────────────────────────────────────────

/// The kind of answer a question collects.
///
/// Closed set: the aggregation engine matches on it exhaustively, so adding a
/// variant is a compile error until every report branch handles it.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuestionKind {
  /// Exactly one option selected.
  Single,
  /// One or more options selected.
  Multi,
  /// A numeric rating.
  Scale,
  /// Free text.
  Text,
}

// ─── Stored entities ─────────────────────────────────────────────────────────

/// A survey envelope. `is_published` is the only field that flips during
/// normal operation: draft ⇄ published, toggled by the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
  pub survey_id:    Uuid,
  pub owner_id:     Uuid,
  pub title:        String,
  pub description:  String,
  pub is_published: bool,
  /// Free-form owner settings, stored verbatim.
  pub settings:     Option<serde_json::Value>,
  pub created_at:   DateTime<Utc>,
}

/// A selectable answer for a single/multi question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
  pub option_id:   Uuid,
  pub question_id: Uuid,
  pub text:        String,
  pub order:       i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
  pub question_id: Uuid,
  pub survey_id:   Uuid,
  pub text:        String,
  #[serde(rename = "type")]
  pub kind:        QuestionKind,
  pub required:    bool,
  pub order:       i64,
  pub meta:        Option<serde_json::Value>,
  /// Empty for scale and text questions.
  pub options:     Vec<QuestionOption>,
}

/// A survey with its questions (and their options) in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyDetail {
  #[serde(flatten)]
  pub survey:    Survey,
  pub questions: Vec<Question>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

fn default_required() -> bool { true }

/// Input to [`crate::store::SurveyStore::create_survey`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewSurvey {
  pub title:       String,
  pub description: String,
  pub settings:    Option<serde_json::Value>,
  #[serde(default)]
  pub questions:   Vec<NewQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
  pub text:     String,
  #[serde(rename = "type")]
  pub kind:     QuestionKind,
  #[serde(default = "default_required")]
  pub required: bool,
  /// Falls back to the question's position in the submitted list.
  pub order:    Option<i64>,
  pub meta:     Option<serde_json::Value>,
  #[serde(default)]
  pub options:  Vec<NewOption>,
}

impl NewQuestion {
  pub fn new(text: impl Into<String>, kind: QuestionKind) -> Self {
    Self {
      text: text.into(),
      kind,
      required: true,
      order: None,
      meta: None,
      options: Vec::new(),
    }
  }

  /// Builder-style helper that appends options in the given order.
  pub fn with_options<I, T>(mut self, texts: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    self
      .options
      .extend(texts.into_iter().map(|t| NewOption { text: t.into(), order: None }));
    self
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOption {
  pub text:  String,
  /// Falls back to the option's position in the submitted list, or to the
  /// end of the list when the option is added on its own.
  pub order: Option<i64>,
}

/// Partial update of a survey; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurveyPatch {
  pub title:        Option<String>,
  pub description:  Option<String>,
  pub settings:     Option<serde_json::Value>,
  pub is_published: Option<bool>,
}

/// Partial update of a question; `None` leaves a field untouched.
///
/// Changing `kind` after answers exist is allowed but leaves earlier answers
/// contributing nothing to the new kind's report branch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionPatch {
  pub text:     Option<String>,
  #[serde(rename = "type")]
  pub kind:     Option<QuestionKind>,
  pub required: Option<bool>,
  pub order:    Option<i64>,
  pub meta:     Option<serde_json::Value>,
}

/// Parameters for [`crate::store::SurveyStore::list_surveys`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SurveyFilter {
  pub owner_id:  Option<Uuid>,
  pub published: Option<bool>,
}
