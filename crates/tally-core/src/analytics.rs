//! Response aggregation.
//!
//! Reports are never stored. Every request reads an [`AnswerSheet`] (a raw
//! snapshot of a survey's questions and recorded answers) and folds it into a
//! [`SurveyReport`] with one [`QuestionReport`] per question, branching on the
//! question kind:
//!
//! - **single / multi**: per-option selection counts and percentages. The
//!   denominator is the total number of *selections* for the question, so a
//!   respondent who ticks two boxes on a multi question counts twice.
//! - **scale**: an exact-value histogram and the arithmetic mean.
//! - **text**: every non-null text answer, newest submission first.
//!
//! Rows that do not fit the question's kind (a number on a text question, a
//! stray selection) are ignored rather than rejected.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  store::SurveyStore,
  survey::{Question, QuestionKind},
};

// ─── Input snapshot ──────────────────────────────────────────────────────────

/// One stored answer, joined with its response's submission time.
#[derive(Debug, Clone)]
pub struct AnswerRow {
  pub response_id:  Uuid,
  pub question_id:  Uuid,
  pub value_text:   Option<String>,
  pub value_number: Option<f64>,
  pub submitted_at: DateTime<Utc>,
}

/// Everything the engine needs to report on one survey, read at a single
/// point in time.
#[derive(Debug, Clone)]
pub struct AnswerSheet {
  pub survey_id:        Uuid,
  /// Number of responses recorded for the survey, whatever they answered.
  pub response_count:   u64,
  /// Questions (with options) in display order.
  pub questions:        Vec<Question>,
  pub answers:          Vec<AnswerRow>,
  /// The option id of every stored selection, one entry per selection.
  pub selected_options: Vec<Uuid>,
}

// ─── Output ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionStats {
  pub option_id:  Uuid,
  pub text:       String,
  pub count:      u64,
  /// Share of all selections for the question, in `0.0..=100.0`.
  pub percentage: f64,
}

/// One histogram bar: how many respondents gave exactly `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleBucket {
  pub value: f64,
  pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextExcerpt {
  pub response_id:  Uuid,
  pub text:         String,
  pub submitted_at: DateTime<Utc>,
}

/// The kind-specific part of a question report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Breakdown {
  Single {
    options: Vec<OptionStats>,
  },
  Multi {
    options: Vec<OptionStats>,
  },
  Scale {
    /// Sorted by ascending value; empty when nobody answered.
    histogram: Vec<ScaleBucket>,
    avg:       Option<f64>,
  },
  Text {
    /// Newest submission first.
    text_responses: Vec<TextExcerpt>,
  },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionReport {
  pub question_id:     Uuid,
  /// Selections for single/multi, values for scale, excerpts for text.
  pub total_responses: u64,
  #[serde(flatten)]
  pub breakdown:       Breakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyReport {
  pub survey_id:       Uuid,
  /// Number of responses to the survey; independent of any question total.
  pub total_responses: u64,
  pub questions:       Vec<QuestionReport>,
}

impl SurveyReport {
  /// Pick one question's report out of the survey report.
  pub fn into_question(self, question_id: Uuid) -> Result<QuestionReport> {
    self
      .questions
      .into_iter()
      .find(|q| q.question_id == question_id)
      .ok_or(Error::QuestionNotFound(question_id))
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

impl AnswerSheet {
  /// Fold the snapshot into a report, one entry per question in order.
  pub fn report(&self) -> SurveyReport {
    let mut selections: HashMap<Uuid, u64> = HashMap::new();
    for option_id in &self.selected_options {
      *selections.entry(*option_id).or_default() += 1;
    }

    let mut by_question: HashMap<Uuid, Vec<&AnswerRow>> = HashMap::new();
    for row in &self.answers {
      by_question.entry(row.question_id).or_default().push(row);
    }

    let questions = self
      .questions
      .iter()
      .map(|q| {
        let answers = by_question
          .get(&q.question_id)
          .map(Vec::as_slice)
          .unwrap_or_default();
        fold_question(q, answers, &selections)
      })
      .collect();

    SurveyReport {
      survey_id: self.survey_id,
      total_responses: self.response_count,
      questions,
    }
  }
}

fn fold_question(
  question: &Question,
  answers: &[&AnswerRow],
  selections: &HashMap<Uuid, u64>,
) -> QuestionReport {
  let (total_responses, breakdown) = match question.kind {
    QuestionKind::Single => {
      let (total, options) = option_stats(question, selections);
      (total, Breakdown::Single { options })
    }
    QuestionKind::Multi => {
      let (total, options) = option_stats(question, selections);
      (total, Breakdown::Multi { options })
    }
    QuestionKind::Scale => {
      let values: Vec<f64> =
        answers.iter().filter_map(|a| a.value_number).collect();
      let avg = mean(&values);
      (values.len() as u64, Breakdown::Scale {
        histogram: histogram(values),
        avg,
      })
    }
    QuestionKind::Text => {
      let text_responses = text_excerpts(answers);
      (text_responses.len() as u64, Breakdown::Text { text_responses })
    }
  };

  QuestionReport { question_id: question.question_id, total_responses, breakdown }
}

/// Every option appears, selected or not. Returns the selection total too.
fn option_stats(
  question: &Question,
  selections: &HashMap<Uuid, u64>,
) -> (u64, Vec<OptionStats>) {
  let counts: Vec<u64> = question
    .options
    .iter()
    .map(|o| selections.get(&o.option_id).copied().unwrap_or(0))
    .collect();
  let total: u64 = counts.iter().sum();

  let stats = question
    .options
    .iter()
    .zip(counts)
    .map(|(option, count)| OptionStats {
      option_id: option.option_id,
      text: option.text.clone(),
      count,
      percentage: percentage(count, total),
    })
    .collect();

  (total, stats)
}

fn percentage(count: u64, total: u64) -> f64 {
  if total == 0 {
    0.0
  } else {
    100.0 * count as f64 / total as f64
  }
}

fn mean(values: &[f64]) -> Option<f64> {
  if values.is_empty() {
    None
  } else {
    Some(values.iter().sum::<f64>() / values.len() as f64)
  }
}

/// Group by exact value; no binning.
fn histogram(mut values: Vec<f64>) -> Vec<ScaleBucket> {
  values.sort_by(f64::total_cmp);

  let mut buckets: Vec<ScaleBucket> = Vec::new();
  for value in values {
    match buckets.last_mut() {
      Some(last) if last.value == value => last.count += 1,
      _ => buckets.push(ScaleBucket { value, count: 1 }),
    }
  }
  buckets
}

fn text_excerpts(answers: &[&AnswerRow]) -> Vec<TextExcerpt> {
  let mut excerpts: Vec<TextExcerpt> = answers
    .iter()
    .filter_map(|a| {
      a.value_text.as_ref().map(|text| TextExcerpt {
        response_id:  a.response_id,
        text:         text.clone(),
        submitted_at: a.submitted_at,
      })
    })
    .collect();
  excerpts.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
  excerpts
}

// ─── Facade ──────────────────────────────────────────────────────────────────

/// Compute the report for a whole survey from the latest committed answers.
pub async fn survey_report<S: SurveyStore>(
  store: &S,
  survey_id: Uuid,
) -> Result<SurveyReport> {
  let sheet = store
    .answer_sheet(survey_id)
    .await
    .map_err(Into::into)?
    .ok_or(Error::SurveyNotFound(survey_id))?;
  Ok(sheet.report())
}

/// Compute the report for one question of a survey.
///
/// Fails with [`Error::QuestionNotFound`] when the question is not part of
/// `survey_id`, even if it exists in another survey.
pub async fn question_report<S: SurveyStore>(
  store: &S,
  survey_id: Uuid,
  question_id: Uuid,
) -> Result<QuestionReport> {
  survey_report(store, survey_id).await?.into_question(question_id)
}
