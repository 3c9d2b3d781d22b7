//! [`SqliteStore`], the SQLite implementation of [`SurveyStore`].

use std::{ffi::c_int, path::Path};

use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use tally_core::{
  analytics::AnswerSheet,
  identity::Identity,
  response::{NewResponse, Response, ResponseDetail},
  store::SurveyStore,
  survey::{
    NewOption, NewQuestion, NewSurvey, Question, QuestionOption, QuestionPatch,
    Survey, SurveyDetail, SurveyFilter, SurveyPatch,
  },
  user::{StoredCredential, User},
};

use crate::{
  Error, Result,
  encode::{
    RawAnswer, RawAnswerRow, RawOption, RawQuestion, RawResponse, RawSurvey,
    RawUser, assemble_answers, assemble_questions, decode_uuid, encode_dt,
    encode_identity, encode_json, encode_kind, encode_uuid, now,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally survey store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store. Useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row helpers (run on the database thread) ────────────────────────────────

/// The extended result code of a constraint violation, if `err` is one.
fn constraint_code(err: &rusqlite::Error) -> Option<c_int> {
  match err {
    rusqlite::Error::SqliteFailure(e, _)
      if e.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      Some(e.extended_code)
    }
    _ => None,
  }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
  constraint_code(err) == Some(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
  constraint_code(err) == Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

fn fetch_survey(
  conn: &rusqlite::Connection,
  survey_id: &str,
) -> rusqlite::Result<Option<RawSurvey>> {
  conn
    .query_row(
      &format!("SELECT {} FROM surveys WHERE survey_id = ?1", RawSurvey::COLUMNS),
      rusqlite::params![survey_id],
      RawSurvey::from_row,
    )
    .optional()
}

/// Questions and options of a survey, each in display order (explicit order,
/// then insertion order).
fn fetch_questions(
  conn: &rusqlite::Connection,
  survey_id: &str,
) -> rusqlite::Result<(Vec<RawQuestion>, Vec<RawOption>)> {
  let questions = conn
    .prepare(&format!(
      "SELECT {} FROM questions q WHERE q.survey_id = ?1 ORDER BY q.ord, q.rowid",
      RawQuestion::COLUMNS
    ))?
    .query_map(rusqlite::params![survey_id], RawQuestion::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let options = conn
    .prepare(&format!(
      "SELECT {}
       FROM options o
       JOIN questions q ON q.question_id = o.question_id
       WHERE q.survey_id = ?1
       ORDER BY o.ord, o.rowid",
      RawOption::COLUMNS
    ))?
    .query_map(rusqlite::params![survey_id], RawOption::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok((questions, options))
}

/// A single question with its options.
fn fetch_question(
  conn: &rusqlite::Connection,
  question_id: &str,
) -> rusqlite::Result<Option<(RawQuestion, Vec<RawOption>)>> {
  let question = conn
    .query_row(
      &format!(
        "SELECT {} FROM questions q WHERE q.question_id = ?1",
        RawQuestion::COLUMNS
      ),
      rusqlite::params![question_id],
      RawQuestion::from_row,
    )
    .optional()?;

  let Some(question) = question else {
    return Ok(None);
  };

  let options = conn
    .prepare(&format!(
      "SELECT {} FROM options o WHERE o.question_id = ?1 ORDER BY o.ord, o.rowid",
      RawOption::COLUMNS
    ))?
    .query_map(rusqlite::params![question_id], RawOption::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Some((question, options)))
}

type RawSurveyDetail = (RawSurvey, Vec<RawQuestion>, Vec<RawOption>);

fn fetch_survey_detail(
  conn: &rusqlite::Connection,
  survey_id: &str,
) -> rusqlite::Result<Option<RawSurveyDetail>> {
  let Some(survey) = fetch_survey(conn, survey_id)? else {
    return Ok(None);
  };
  let (questions, options) = fetch_questions(conn, survey_id)?;
  Ok(Some((survey, questions, options)))
}

fn into_detail((survey, questions, options): RawSurveyDetail) -> Result<SurveyDetail> {
  Ok(SurveyDetail {
    survey:    survey.into_survey()?,
    questions: assemble_questions(questions, options)?,
  })
}

fn into_question((question, options): (RawQuestion, Vec<RawOption>)) -> Result<Question> {
  assemble_questions(vec![question], options)?
    .pop()
    .ok_or_else(|| Error::Decode("question row vanished during decode".into()))
}

/// Whether a response keyed by `identity` already exists for the survey.
fn response_exists(
  conn: &rusqlite::Connection,
  survey_id: &str,
  user_id: Option<&str>,
  session_id: Option<&str>,
) -> rusqlite::Result<bool> {
  conn.query_row(
    "SELECT EXISTS (
       SELECT 1 FROM responses
       WHERE survey_id = ?1
         AND ((?2 IS NOT NULL AND user_id = ?2)
           OR (?3 IS NOT NULL AND session_id = ?3))
     )",
    rusqlite::params![survey_id, user_id, session_id],
    |r| r.get(0),
  )
}

/// Insert one option row.
fn insert_option(
  conn: &rusqlite::Connection,
  option: &QuestionOption,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO options (option_id, question_id, text, ord) VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![
      encode_uuid(option.option_id),
      encode_uuid(option.question_id),
      option.text,
      option.order,
    ],
  )?;
  Ok(())
}

fn insert_question(
  conn: &rusqlite::Connection,
  question: &Question,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO questions (question_id, survey_id, text, kind, required, ord, meta)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      encode_uuid(question.question_id),
      encode_uuid(question.survey_id),
      question.text,
      encode_kind(question.kind),
      question.required,
      question.order,
      encode_json(question.meta.as_ref()),
    ],
  )?;
  for option in &question.options {
    insert_option(conn, option)?;
  }
  Ok(())
}

/// Build a [`Question`] (with fresh ids) from caller input. Options without an
/// explicit order take their list position.
fn build_question(survey_id: Uuid, input: NewQuestion, order: i64) -> Question {
  let question_id = Uuid::new_v4();
  let options = input
    .options
    .into_iter()
    .enumerate()
    .map(|(idx, o)| QuestionOption {
      option_id: Uuid::new_v4(),
      question_id,
      text: o.text,
      order: o.order.unwrap_or(idx as i64),
    })
    .collect();

  Question {
    question_id,
    survey_id,
    text: input.text,
    kind: input.kind,
    required: input.required,
    order: input.order.unwrap_or(order),
    meta: input.meta,
    options,
  }
}

/// Column values of one `responses` row, already encoded.
pub(crate) struct ResponseRow {
  pub response_id:  String,
  pub survey_id:    String,
  pub user_id:      Option<String>,
  pub session_id:   Option<String>,
  pub submitted_at: String,
  pub meta:         String,
}

/// Insert one response row. A second row for the same identity and survey
/// fails with a unique violation.
pub(crate) fn insert_response(
  conn: &rusqlite::Connection,
  row: &ResponseRow,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO responses (
       response_id, survey_id, user_id, session_id, submitted_at, meta
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      row.response_id,
      row.survey_id,
      row.user_id,
      row.session_id,
      row.submitted_at,
      row.meta,
    ],
  )?;
  Ok(())
}

/// Outcome of the response-recording transaction.
enum Recording {
  Recorded,
  NotAvailable,
  Duplicate,
  Dangling,
}

// ─── SurveyStore impl ────────────────────────────────────────────────────────

impl SurveyStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, email: &str, password_hash: &str) -> Result<User> {
    let user = User {
      user_id:    Uuid::new_v4(),
      email:      email.to_owned(),
      created_at: now(),
    };

    let id_str   = encode_uuid(user.user_id);
    let email_s  = user.email.clone();
    let hash_str = password_hash.to_owned();
    let at_str   = encode_dt(user.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO users (user_id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, email_s, hash_str, at_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(tally_core::Error::EmailTaken(user.email).into());
    }
    Ok(user)
  }

  async fn get_credential(&self, email: &str) -> Result<Option<StoredCredential>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, password_hash, created_at
               FROM users WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok(RawUser {
                  user_id:       row.get(0)?,
                  email:         row.get(1)?,
                  password_hash: row.get(2)?,
                  created_at:    row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_credential).transpose()
  }

  // ── Surveys ───────────────────────────────────────────────────────────────

  async fn create_survey(&self, owner_id: Uuid, input: NewSurvey) -> Result<SurveyDetail> {
    let survey = Survey {
      survey_id: Uuid::new_v4(),
      owner_id,
      title: input.title,
      description: input.description,
      is_published: false,
      settings: input.settings,
      created_at: now(),
    };
    let questions: Vec<Question> = input
      .questions
      .into_iter()
      .enumerate()
      .map(|(idx, q)| build_question(survey.survey_id, q, idx as i64))
      .collect();

    let detail = SurveyDetail { survey, questions };
    let to_insert = detail.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let s = &to_insert.survey;
        let result = tx.execute(
          "INSERT INTO surveys (
             survey_id, owner_id, title, description, is_published, settings, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            encode_uuid(s.survey_id),
            encode_uuid(s.owner_id),
            s.title,
            s.description,
            s.is_published,
            encode_json(s.settings.as_ref()),
            encode_dt(s.created_at),
          ],
        );
        match result {
          Ok(_) => {}
          Err(e) if is_foreign_key_violation(&e) => return Ok(false),
          Err(e) => return Err(e.into()),
        }
        for question in &to_insert.questions {
          insert_question(&tx, question)?;
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(
        tally_core::Error::DanglingReference(format!("unknown owner {owner_id}")).into(),
      );
    }
    Ok(detail)
  }

  async fn get_survey(&self, id: Uuid) -> Result<Option<Survey>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(fetch_survey(conn, &id_str)?))
      .await?;

    raw.map(RawSurvey::into_survey).transpose()
  }

  async fn get_survey_detail(&self, id: Uuid) -> Result<Option<SurveyDetail>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        Ok(fetch_survey_detail(&tx, &id_str)?)
      })
      .await?;

    raw.map(into_detail).transpose()
  }

  async fn list_surveys(&self, filter: SurveyFilter) -> Result<Vec<SurveyDetail>> {
    let owner_str = filter.owner_id.map(encode_uuid);
    let published = filter.published;

    let raws: Vec<RawSurveyDetail> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let surveys = tx
          .prepare(&format!(
            "SELECT {} FROM surveys
             WHERE (?1 IS NULL OR owner_id = ?1)
               AND (?2 IS NULL OR is_published = ?2)
             ORDER BY created_at DESC, rowid DESC",
            RawSurvey::COLUMNS
          ))?
          .query_map(rusqlite::params![owner_str, published], RawSurvey::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(surveys.len());
        for survey in surveys {
          let (questions, options) = fetch_questions(&tx, &survey.survey_id)?;
          out.push((survey, questions, options));
        }
        Ok(out)
      })
      .await?;

    raws.into_iter().map(into_detail).collect()
  }

  async fn update_survey(&self, id: Uuid, patch: SurveyPatch) -> Result<Option<SurveyDetail>> {
    let id_str   = encode_uuid(id);
    let settings = encode_json(patch.settings.as_ref());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE surveys SET
             title        = COALESCE(?2, title),
             description  = COALESCE(?3, description),
             settings     = COALESCE(?4, settings),
             is_published = COALESCE(?5, is_published)
           WHERE survey_id = ?1",
          rusqlite::params![
            id_str,
            patch.title,
            patch.description,
            settings,
            patch.is_published,
          ],
        )?;
        let detail = fetch_survey_detail(&tx, &id_str)?;
        tx.commit()?;
        Ok(detail)
      })
      .await?;

    raw.map(into_detail).transpose()
  }

  async fn toggle_published(&self, id: Uuid) -> Result<Option<Survey>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE surveys SET is_published = NOT is_published WHERE survey_id = ?1",
          rusqlite::params![id_str],
        )?;
        let survey = fetch_survey(&tx, &id_str)?;
        tx.commit()?;
        Ok(survey)
      })
      .await?;

    raw.map(RawSurvey::into_survey).transpose()
  }

  async fn delete_survey(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM surveys WHERE survey_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Questions and options ─────────────────────────────────────────────────

  async fn add_question(&self, survey_id: Uuid, input: NewQuestion) -> Result<Question> {
    let survey_str = encode_uuid(survey_id);

    // The default order is only known inside the transaction, so the
    // question is built there and handed back.
    let question = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if fetch_survey(&tx, &survey_str)?.is_none() {
          return Ok(None);
        }
        let next: i64 = tx.query_row(
          "SELECT COALESCE(MAX(ord) + 1, 0) FROM questions WHERE survey_id = ?1",
          rusqlite::params![survey_str],
          |r| r.get(0),
        )?;
        let question = build_question(survey_id, input, next);
        insert_question(&tx, &question)?;
        tx.commit()?;
        Ok(Some(question))
      })
      .await?;

    question.ok_or_else(|| tally_core::Error::SurveyNotFound(survey_id).into())
  }

  async fn get_question(&self, id: Uuid) -> Result<Option<Question>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        Ok(fetch_question(&tx, &id_str)?)
      })
      .await?;

    raw.map(into_question).transpose()
  }

  async fn update_question(&self, id: Uuid, patch: QuestionPatch) -> Result<Option<Question>> {
    let id_str   = encode_uuid(id);
    let kind_str = patch.kind.map(encode_kind);
    let meta     = encode_json(patch.meta.as_ref());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE questions SET
             text     = COALESCE(?2, text),
             kind     = COALESCE(?3, kind),
             required = COALESCE(?4, required),
             ord      = COALESCE(?5, ord),
             meta     = COALESCE(?6, meta)
           WHERE question_id = ?1",
          rusqlite::params![
            id_str,
            patch.text,
            kind_str,
            patch.required,
            patch.order,
            meta,
          ],
        )?;
        let question = fetch_question(&tx, &id_str)?;
        tx.commit()?;
        Ok(question)
      })
      .await?;

    raw.map(into_question).transpose()
  }

  async fn delete_question(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM questions WHERE question_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn add_option(&self, question_id: Uuid, input: NewOption) -> Result<Question> {
    let question_str = encode_uuid(question_id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if fetch_question(&tx, &question_str)?.is_none() {
          return Ok(None);
        }
        let next: i64 = tx.query_row(
          "SELECT COALESCE(MAX(ord) + 1, 0) FROM options WHERE question_id = ?1",
          rusqlite::params![question_str],
          |r| r.get(0),
        )?;
        insert_option(&tx, &QuestionOption {
          option_id: Uuid::new_v4(),
          question_id,
          text: input.text,
          order: input.order.unwrap_or(next),
        })?;
        let question = fetch_question(&tx, &question_str)?;
        tx.commit()?;
        Ok(question)
      })
      .await?;

    match raw {
      Some(raw) => into_question(raw),
      None => Err(tally_core::Error::QuestionNotFound(question_id).into()),
    }
  }

  // ── Responses ─────────────────────────────────────────────────────────────

  async fn has_responded(&self, survey_id: Uuid, identity: &Identity) -> Result<bool> {
    let survey_str            = encode_uuid(survey_id);
    let (user_id, session_id) = encode_identity(identity);

    let exists = self
      .conn
      .call(move |conn| {
        Ok(response_exists(
          conn,
          &survey_str,
          user_id.as_deref(),
          session_id.as_deref(),
        )?)
      })
      .await?;

    Ok(exists)
  }

  async fn record_response(&self, input: NewResponse) -> Result<Response> {
    let response = Response {
      response_id:  Uuid::new_v4(),
      survey_id:    input.survey_id,
      respondent:   input.respondent,
      submitted_at: now(),
      meta:         input.meta,
    };

    let (user_id, session_id) = encode_identity(&response.respondent);
    let row = ResponseRow {
      response_id: encode_uuid(response.response_id),
      survey_id: encode_uuid(response.survey_id),
      user_id,
      session_id,
      submitted_at: encode_dt(response.submitted_at),
      meta: serde_json::to_string(&response.meta)?,
    };
    let answers = input.answers;

    let outcome = self
      .conn
      .call(move |conn| {
        // IMMEDIATE takes the write lock up front so the checks below and the
        // insert see the same state.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let published: Option<bool> = tx
          .query_row(
            "SELECT is_published FROM surveys WHERE survey_id = ?1",
            rusqlite::params![row.survey_id],
            |r| r.get(0),
          )
          .optional()?;
        if published != Some(true) {
          return Ok(Recording::NotAvailable);
        }

        if response_exists(
          &tx,
          &row.survey_id,
          row.user_id.as_deref(),
          row.session_id.as_deref(),
        )? {
          return Ok(Recording::Duplicate);
        }

        match insert_response(&tx, &row) {
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => return Ok(Recording::Duplicate),
          Err(e) => return Err(e.into()),
        }

        for answer in answers {
          let answer_id = encode_uuid(Uuid::new_v4());
          let inserted = tx.execute(
            "INSERT INTO answer_values (
               answer_id, response_id, question_id, value_text, value_number
             ) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
              answer_id,
              row.response_id,
              encode_uuid(answer.question_id),
              answer.value_text,
              answer.value_number,
            ],
          );
          match inserted {
            Ok(_) => {}
            Err(e) if is_foreign_key_violation(&e) => return Ok(Recording::Dangling),
            Err(e) => return Err(e.into()),
          }

          for option_id in answer.option_ids {
            let inserted = tx.execute(
              "INSERT INTO answer_options (answer_option_id, answer_id, option_id)
               VALUES (?1, ?2, ?3)",
              rusqlite::params![
                encode_uuid(Uuid::new_v4()),
                answer_id,
                encode_uuid(option_id),
              ],
            );
            match inserted {
              Ok(_) => {}
              Err(e) if is_foreign_key_violation(&e) => return Ok(Recording::Dangling),
              Err(e) => return Err(e.into()),
            }
          }
        }

        tx.commit()?;
        Ok(Recording::Recorded)
      })
      .await?;

    let survey_id = response.survey_id;
    match outcome {
      Recording::Recorded => Ok(response),
      Recording::NotAvailable => Err(tally_core::Error::SurveyNotAvailable(survey_id).into()),
      Recording::Duplicate => Err(tally_core::Error::DuplicateSubmission(survey_id).into()),
      Recording::Dangling => Err(
        tally_core::Error::DanglingReference(
          "answer references an unknown question or option".into(),
        )
        .into(),
      ),
    }
  }

  async fn list_responses(&self, survey_id: Uuid) -> Result<Vec<Response>> {
    let survey_str = encode_uuid(survey_id);

    let raws: Vec<RawResponse> = self
      .conn
      .call(move |conn| {
        let rows = conn
          .prepare(&format!(
            "SELECT {} FROM responses WHERE survey_id = ?1 ORDER BY submitted_at, rowid",
            RawResponse::COLUMNS
          ))?
          .query_map(rusqlite::params![survey_str], RawResponse::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawResponse::into_response).collect()
  }

  async fn get_response(&self, id: Uuid) -> Result<Option<ResponseDetail>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let response = tx
          .query_row(
            &format!(
              "SELECT {} FROM responses WHERE response_id = ?1",
              RawResponse::COLUMNS
            ),
            rusqlite::params![id_str],
            RawResponse::from_row,
          )
          .optional()?;
        let Some(response) = response else {
          return Ok(None);
        };

        let answers = tx
          .prepare(
            "SELECT answer_id, response_id, question_id, value_text, value_number
             FROM answer_values WHERE response_id = ?1 ORDER BY rowid",
          )?
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawAnswer {
              answer_id:    row.get(0)?,
              response_id:  row.get(1)?,
              question_id:  row.get(2)?,
              value_text:   row.get(3)?,
              value_number: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let selections = tx
          .prepare(
            "SELECT ao.answer_id, ao.option_id
             FROM answer_options ao
             JOIN answer_values av ON av.answer_id = ao.answer_id
             WHERE av.response_id = ?1
             ORDER BY ao.rowid",
          )?
          .query_map(rusqlite::params![id_str], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<(String, String)>>>()?;

        Ok(Some((response, answers, selections)))
      })
      .await?;

    let Some((response, answers, selections)) = raw else {
      return Ok(None);
    };
    Ok(Some(ResponseDetail {
      response: response.into_response()?,
      answers:  assemble_answers(answers, selections)?,
    }))
  }

  // ── Analytics input ───────────────────────────────────────────────────────

  async fn answer_sheet(&self, survey_id: Uuid) -> Result<Option<AnswerSheet>> {
    let survey_str = encode_uuid(survey_id);

    let raw = self
      .conn
      .call(move |conn| {
        // One read transaction so every query sees the same snapshot.
        let tx = conn.transaction()?;
        if fetch_survey(&tx, &survey_str)?.is_none() {
          return Ok(None);
        }

        let response_count: i64 = tx.query_row(
          "SELECT COUNT(*) FROM responses WHERE survey_id = ?1",
          rusqlite::params![survey_str],
          |r| r.get(0),
        )?;

        let (questions, options) = fetch_questions(&tx, &survey_str)?;

        let answers = tx
          .prepare(
            "SELECT av.response_id, av.question_id, av.value_text, av.value_number,
                    r.submitted_at
             FROM answer_values av
             JOIN responses r ON r.response_id = av.response_id
             WHERE r.survey_id = ?1
             ORDER BY r.submitted_at DESC",
          )?
          .query_map(rusqlite::params![survey_str], |row| {
            Ok(RawAnswerRow {
              response_id:  row.get(0)?,
              question_id:  row.get(1)?,
              value_text:   row.get(2)?,
              value_number: row.get(3)?,
              submitted_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let selected = tx
          .prepare(
            "SELECT ao.option_id
             FROM answer_options ao
             JOIN options   o ON o.option_id   = ao.option_id
             JOIN questions q ON q.question_id = o.question_id
             WHERE q.survey_id = ?1",
          )?
          .query_map(rusqlite::params![survey_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(Some((response_count, questions, options, answers, selected)))
      })
      .await?;

    let Some((response_count, questions, options, answers, selected)) = raw else {
      return Ok(None);
    };

    Ok(Some(AnswerSheet {
      survey_id,
      response_count: u64::try_from(response_count)
        .map_err(|_| Error::Decode(format!("negative count {response_count}")))?,
      questions: assemble_questions(questions, options)?,
      answers: answers
        .into_iter()
        .map(RawAnswerRow::into_row)
        .collect::<Result<_>>()?,
      selected_options: selected
        .iter()
        .map(|s| decode_uuid(s))
        .collect::<Result<_>>()?,
    }))
  }
}
