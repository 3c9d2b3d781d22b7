//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that lexical order in SQL equals chronological order. Free-form
//! blobs (settings, meta) are stored as compact JSON. UUIDs are stored as
//! hyphenated lowercase strings.

use std::{collections::HashMap, str::FromStr};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use tally_core::{
  analytics::AnswerRow,
  identity::Identity,
  response::{Answer, Response, ResponseMeta},
  survey::{Question, QuestionKind, QuestionOption, Survey},
  user::{StoredCredential, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time at the precision the store keeps, so values handed back
/// to callers compare equal to what a later read returns.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

// ─── QuestionKind ─────────────────────────────────────────────────────────────

pub fn encode_kind(k: QuestionKind) -> &'static str { k.into() }

pub fn decode_kind(s: &str) -> Result<QuestionKind> {
  QuestionKind::from_str(s)
    .map_err(|_| Error::Decode(format!("unknown question kind: {s:?}")))
}

// ─── JSON blobs ───────────────────────────────────────────────────────────────

pub fn encode_json(v: Option<&serde_json::Value>) -> Option<String> {
  v.map(serde_json::Value::to_string)
}

pub fn decode_json(s: Option<&str>) -> Result<Option<serde_json::Value>> {
  Ok(s.map(serde_json::from_str).transpose()?)
}

// ─── Identity ─────────────────────────────────────────────────────────────────

/// Split an identity into the `(user_id, session_id)` column pair.
pub fn encode_identity(identity: &Identity) -> (Option<String>, Option<String>) {
  match identity {
    Identity::Authenticated { user_id } => (Some(encode_uuid(*user_id)), None),
    Identity::Anonymous { session_id } => (None, Some(session_id.clone())),
  }
}

pub fn decode_identity(
  user_id: Option<&str>,
  session_id: Option<&str>,
) -> Result<Identity> {
  match (user_id, session_id) {
    (Some(u), None) => Ok(Identity::Authenticated { user_id: decode_uuid(u)? }),
    (None, Some(s)) => Ok(Identity::Anonymous { session_id: s.to_owned() }),
    _ => Err(Error::Decode(
      "response must carry exactly one of user_id and session_id".into(),
    )),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub email:         String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_credential(self) -> Result<StoredCredential> {
    Ok(StoredCredential {
      user:          User {
        user_id:    decode_uuid(&self.user_id)?,
        email:      self.email,
        created_at: decode_dt(&self.created_at)?,
      },
      password_hash: self.password_hash,
    })
  }
}

/// Raw strings read directly from a `surveys` row.
pub struct RawSurvey {
  pub survey_id:    String,
  pub owner_id:     String,
  pub title:        String,
  pub description:  String,
  pub is_published: bool,
  pub settings:     Option<String>,
  pub created_at:   String,
}

impl RawSurvey {
  pub const COLUMNS: &'static str = "survey_id, owner_id, title, description, \
                                     is_published, settings, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      survey_id:    row.get(0)?,
      owner_id:     row.get(1)?,
      title:        row.get(2)?,
      description:  row.get(3)?,
      is_published: row.get(4)?,
      settings:     row.get(5)?,
      created_at:   row.get(6)?,
    })
  }

  pub fn into_survey(self) -> Result<Survey> {
    Ok(Survey {
      survey_id:    decode_uuid(&self.survey_id)?,
      owner_id:     decode_uuid(&self.owner_id)?,
      title:        self.title,
      description:  self.description,
      is_published: self.is_published,
      settings:     decode_json(self.settings.as_deref())?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `questions` row.
pub struct RawQuestion {
  pub question_id: String,
  pub survey_id:   String,
  pub text:        String,
  pub kind:        String,
  pub required:    bool,
  pub ord:         i64,
  pub meta:        Option<String>,
}

impl RawQuestion {
  pub const COLUMNS: &'static str =
    "q.question_id, q.survey_id, q.text, q.kind, q.required, q.ord, q.meta";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      question_id: row.get(0)?,
      survey_id:   row.get(1)?,
      text:        row.get(2)?,
      kind:        row.get(3)?,
      required:    row.get(4)?,
      ord:         row.get(5)?,
      meta:        row.get(6)?,
    })
  }
}

/// Raw strings read directly from an `options` row.
pub struct RawOption {
  pub option_id:   String,
  pub question_id: String,
  pub text:        String,
  pub ord:         i64,
}

impl RawOption {
  pub const COLUMNS: &'static str = "o.option_id, o.question_id, o.text, o.ord";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      option_id:   row.get(0)?,
      question_id: row.get(1)?,
      text:        row.get(2)?,
      ord:         row.get(3)?,
    })
  }

  pub fn into_option(self) -> Result<QuestionOption> {
    Ok(QuestionOption {
      option_id:   decode_uuid(&self.option_id)?,
      question_id: decode_uuid(&self.question_id)?,
      text:        self.text,
      order:       self.ord,
    })
  }
}

/// Attach options to their questions. Both inputs are already in display
/// order; the output keeps that order.
pub fn assemble_questions(
  questions: Vec<RawQuestion>,
  options: Vec<RawOption>,
) -> Result<Vec<Question>> {
  let mut by_question: HashMap<Uuid, Vec<QuestionOption>> = HashMap::new();
  for raw in options {
    let option = raw.into_option()?;
    by_question.entry(option.question_id).or_default().push(option);
  }

  questions
    .into_iter()
    .map(|raw| {
      let question_id = decode_uuid(&raw.question_id)?;
      Ok(Question {
        question_id,
        survey_id: decode_uuid(&raw.survey_id)?,
        text: raw.text,
        kind: decode_kind(&raw.kind)?,
        required: raw.required,
        order: raw.ord,
        meta: decode_json(raw.meta.as_deref())?,
        options: by_question.remove(&question_id).unwrap_or_default(),
      })
    })
    .collect()
}

/// Raw strings read directly from a `responses` row.
pub struct RawResponse {
  pub response_id:  String,
  pub survey_id:    String,
  pub user_id:      Option<String>,
  pub session_id:   Option<String>,
  pub submitted_at: String,
  pub meta:         String,
}

impl RawResponse {
  pub const COLUMNS: &'static str =
    "response_id, survey_id, user_id, session_id, submitted_at, meta";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      response_id:  row.get(0)?,
      survey_id:    row.get(1)?,
      user_id:      row.get(2)?,
      session_id:   row.get(3)?,
      submitted_at: row.get(4)?,
      meta:         row.get(5)?,
    })
  }

  pub fn into_response(self) -> Result<Response> {
    let meta: ResponseMeta = serde_json::from_str(&self.meta)?;
    Ok(Response {
      response_id: decode_uuid(&self.response_id)?,
      survey_id: decode_uuid(&self.survey_id)?,
      respondent: decode_identity(
        self.user_id.as_deref(),
        self.session_id.as_deref(),
      )?,
      submitted_at: decode_dt(&self.submitted_at)?,
      meta,
    })
  }
}

/// Raw strings read directly from an `answer_values` row.
pub struct RawAnswer {
  pub answer_id:    String,
  pub response_id:  String,
  pub question_id:  String,
  pub value_text:   Option<String>,
  pub value_number: Option<f64>,
}

/// Attach `(answer_id, option_id)` selection pairs to their answers.
pub fn assemble_answers(
  answers: Vec<RawAnswer>,
  selections: Vec<(String, String)>,
) -> Result<Vec<Answer>> {
  let mut by_answer: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
  for (answer_id, option_id) in selections {
    by_answer
      .entry(decode_uuid(&answer_id)?)
      .or_default()
      .push(decode_uuid(&option_id)?);
  }

  answers
    .into_iter()
    .map(|raw| {
      let answer_id = decode_uuid(&raw.answer_id)?;
      Ok(Answer {
        answer_id,
        response_id: decode_uuid(&raw.response_id)?,
        question_id: decode_uuid(&raw.question_id)?,
        value_text: raw.value_text,
        value_number: raw.value_number,
        option_ids: by_answer.remove(&answer_id).unwrap_or_default(),
      })
    })
    .collect()
}

/// An `answer_values` row joined with its response's submission time.
pub struct RawAnswerRow {
  pub response_id:  String,
  pub question_id:  String,
  pub value_text:   Option<String>,
  pub value_number: Option<f64>,
  pub submitted_at: String,
}

impl RawAnswerRow {
  pub fn into_row(self) -> Result<AnswerRow> {
    Ok(AnswerRow {
      response_id:  decode_uuid(&self.response_id)?,
      question_id:  decode_uuid(&self.question_id)?,
      value_text:   self.value_text,
      value_number: self.value_number,
      submitted_at: decode_dt(&self.submitted_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let early = DateTime::parse_from_rfc3339("2024-01-01T09:00:00.5Z")
      .unwrap()
      .with_timezone(&Utc);
    let late = DateTime::parse_from_rfc3339("2024-01-01T09:00:01Z")
      .unwrap()
      .with_timezone(&Utc);
    assert!(encode_dt(early) < encode_dt(late));
    assert_eq!(encode_dt(late), "2024-01-01T09:00:01.000000Z");
    assert_eq!(decode_dt(&encode_dt(early)).unwrap(), early);
  }

  #[test]
  fn kind_codec_agrees_with_core() {
    for kind in [
      QuestionKind::Single,
      QuestionKind::Multi,
      QuestionKind::Scale,
      QuestionKind::Text,
    ] {
      assert_eq!(encode_kind(kind), serde_json::to_value(kind).unwrap());
      assert_eq!(decode_kind(encode_kind(kind)).unwrap(), kind);
    }
  }

  #[test]
  fn identity_requires_exactly_one_column() {
    assert!(decode_identity(None, None).is_err());
    assert!(decode_identity(Some(&encode_uuid(Uuid::nil())), Some("s")).is_err());
    assert_eq!(decode_identity(None, Some("s")).unwrap(), Identity::Anonymous {
      session_id: "s".into(),
    });
  }
}
