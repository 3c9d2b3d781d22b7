//! Integration tests for `SqliteStore` against an in-memory database.

use tally_core::{
  analytics::{self, Breakdown},
  identity::Identity,
  response::{NewAnswer, NewResponse, ResponseMeta},
  store::SurveyStore,
  submission,
  survey::{
    NewOption, NewQuestion, NewSurvey, QuestionKind, QuestionPatch,
    SurveyDetail, SurveyFilter, SurveyPatch,
  },
};
use uuid::Uuid;

use crate::{
  Error, SqliteStore,
  encode::encode_uuid,
  store::{ResponseRow, insert_response, is_unique_violation},
};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn owner(s: &SqliteStore) -> Uuid {
  s.add_user(&format!("{}@example.com", Uuid::new_v4()), "hash")
    .await
    .unwrap()
    .user_id
}

fn poll() -> NewSurvey {
  NewSurvey {
    title:       "Lunch".into(),
    description: "Where should we eat?".into(),
    settings:    None,
    questions:   vec![
      NewQuestion::new("Pick one", QuestionKind::Single)
        .with_options(["Tacos", "Ramen", "Salad"]),
      NewQuestion::new("Pick any", QuestionKind::Multi)
        .with_options(["Mon", "Tue", "Wed"]),
      NewQuestion::new("How hungry?", QuestionKind::Scale),
      NewQuestion::new("Anything else?", QuestionKind::Text),
    ],
  }
}

/// A published copy of [`poll`].
async fn published_poll(s: &SqliteStore) -> SurveyDetail {
  let owner_id = owner(s).await;
  let detail = s.create_survey(owner_id, poll()).await.unwrap();
  s.toggle_published(detail.survey.survey_id).await.unwrap();
  s.get_survey_detail(detail.survey.survey_id)
    .await
    .unwrap()
    .unwrap()
}

fn anonymous(session: &str) -> Identity {
  Identity::Anonymous { session_id: session.into() }
}

fn response(survey_id: Uuid, respondent: Identity, answers: Vec<NewAnswer>) -> NewResponse {
  NewResponse {
    survey_id,
    respondent,
    answers,
    meta: ResponseMeta::default(),
  }
}

async fn count(s: &SqliteStore, table: &'static str) -> i64 {
  s.conn
    .call(move |conn| {
      Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
    })
    .await
    .unwrap()
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_user_and_get_credential() {
  let s = store().await;
  let user = s.add_user("alice@example.com", "$argon2id$stub").await.unwrap();

  let cred = s.get_credential("alice@example.com").await.unwrap().unwrap();
  assert_eq!(cred.user, user);
  assert_eq!(cred.password_hash, "$argon2id$stub");

  assert!(s.get_credential("bob@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  s.add_user("alice@example.com", "a").await.unwrap();

  let err = s.add_user("alice@example.com", "b").await.unwrap_err();
  assert!(matches!(err, Error::Core(tally_core::Error::EmailTaken(_))));
}

// ─── Surveys ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_survey_detail() {
  let s = store().await;
  let owner_id = owner(&s).await;

  let created = s.create_survey(owner_id, poll()).await.unwrap();
  assert!(!created.survey.is_published);
  assert_eq!(created.questions.len(), 4);

  let fetched = s
    .get_survey_detail(created.survey.survey_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.survey, created.survey);

  let texts: Vec<_> = fetched.questions.iter().map(|q| q.text.as_str()).collect();
  assert_eq!(texts, ["Pick one", "Pick any", "How hungry?", "Anything else?"]);

  let options: Vec<_> = fetched.questions[0]
    .options
    .iter()
    .map(|o| o.text.as_str())
    .collect();
  assert_eq!(options, ["Tacos", "Ramen", "Salad"]);
  assert!(fetched.questions[3].options.is_empty());
}

#[tokio::test]
async fn create_survey_for_unknown_owner_fails() {
  let s = store().await;
  let err = s.create_survey(Uuid::new_v4(), poll()).await.unwrap_err();
  assert!(matches!(err, Error::Core(tally_core::Error::DanglingReference(_))));
  assert_eq!(count(&s, "surveys").await, 0);
}

#[tokio::test]
async fn get_survey_missing_returns_none() {
  let s = store().await;
  assert!(s.get_survey(Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.get_survey_detail(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_surveys_filters_by_owner_and_state() {
  let s = store().await;
  let alice = owner(&s).await;
  let bob = owner(&s).await;

  let a1 = s.create_survey(alice, poll()).await.unwrap();
  s.create_survey(alice, poll()).await.unwrap();
  s.create_survey(bob, poll()).await.unwrap();
  s.toggle_published(a1.survey.survey_id).await.unwrap();

  let all = s.list_surveys(SurveyFilter::default()).await.unwrap();
  assert_eq!(all.len(), 3);

  let mine = s
    .list_surveys(SurveyFilter { owner_id: Some(alice), published: None })
    .await
    .unwrap();
  assert_eq!(mine.len(), 2);
  assert!(mine.iter().all(|d| d.survey.owner_id == alice));
  assert!(mine[0].survey.created_at >= mine[1].survey.created_at);

  let live = s
    .list_surveys(SurveyFilter { owner_id: None, published: Some(true) })
    .await
    .unwrap();
  assert_eq!(live.len(), 1);
  assert_eq!(live[0].survey.survey_id, a1.survey.survey_id);
  assert_eq!(live[0].questions.len(), 4);
}

#[tokio::test]
async fn update_survey_only_touches_given_fields() {
  let s = store().await;
  let owner_id = owner(&s).await;
  let created = s.create_survey(owner_id, poll()).await.unwrap();

  let updated = s
    .update_survey(created.survey.survey_id, SurveyPatch {
      title: Some("Dinner".into()),
      settings: Some(serde_json::json!({ "theme": "dark" })),
      ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();

  assert_eq!(updated.survey.title, "Dinner");
  assert_eq!(updated.survey.description, created.survey.description);
  assert_eq!(updated.survey.settings, Some(serde_json::json!({ "theme": "dark" })));
  assert!(!updated.survey.is_published);

  let missing = s
    .update_survey(Uuid::new_v4(), SurveyPatch::default())
    .await
    .unwrap();
  assert!(missing.is_none());
}

#[tokio::test]
async fn toggle_published_flips_each_time() {
  let s = store().await;
  let owner_id = owner(&s).await;
  let id = s.create_survey(owner_id, poll()).await.unwrap().survey.survey_id;

  assert!(s.toggle_published(id).await.unwrap().unwrap().is_published);
  assert!(!s.toggle_published(id).await.unwrap().unwrap().is_published);
  assert!(s.toggle_published(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Questions and options ───────────────────────────────────────────────────

#[tokio::test]
async fn add_question_appends_after_existing() {
  let s = store().await;
  let owner_id = owner(&s).await;
  let id = s.create_survey(owner_id, poll()).await.unwrap().survey.survey_id;

  let added = s
    .add_question(id, NewQuestion::new("Dessert?", QuestionKind::Single).with_options(["Yes", "No"]))
    .await
    .unwrap();
  assert_eq!(added.order, 4);
  assert_eq!(added.options.len(), 2);

  let detail = s.get_survey_detail(id).await.unwrap().unwrap();
  assert_eq!(detail.questions.last().unwrap().question_id, added.question_id);
}

#[tokio::test]
async fn add_question_to_missing_survey_fails() {
  let s = store().await;
  let err = s
    .add_question(Uuid::new_v4(), NewQuestion::new("Orphan", QuestionKind::Text))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(tally_core::Error::SurveyNotFound(_))));
}

#[tokio::test]
async fn update_question_and_add_option() {
  let s = store().await;
  let detail = published_poll(&s).await;
  let q = &detail.questions[0];

  let updated = s
    .update_question(q.question_id, QuestionPatch {
      text: Some("Pick exactly one".into()),
      required: Some(false),
      ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.text, "Pick exactly one");
  assert!(!updated.required);
  assert_eq!(updated.kind, QuestionKind::Single);
  assert_eq!(updated.options.len(), 3);

  let with_pho = s
    .add_option(q.question_id, NewOption { text: "Pho".into(), order: None })
    .await
    .unwrap();
  let texts: Vec<_> = with_pho.options.iter().map(|o| o.text.as_str()).collect();
  assert_eq!(texts, ["Tacos", "Ramen", "Salad", "Pho"]);

  let err = s
    .add_option(Uuid::new_v4(), NewOption { text: "x".into(), order: None })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(tally_core::Error::QuestionNotFound(_))));
}

#[tokio::test]
async fn delete_question_removes_its_answers() {
  let s = store().await;
  let detail = published_poll(&s).await;
  let text_q = detail.questions[3].question_id;

  s.record_response(response(detail.survey.survey_id, anonymous("s1"), vec![
    NewAnswer::text(text_q, "more tacos"),
  ]))
  .await
  .unwrap();
  assert_eq!(count(&s, "answer_values").await, 1);

  assert!(s.delete_question(text_q).await.unwrap());
  assert!(!s.delete_question(text_q).await.unwrap());
  assert!(s.get_question(text_q).await.unwrap().is_none());
  assert_eq!(count(&s, "answer_values").await, 0);
  assert_eq!(count(&s, "responses").await, 1);
}

// ─── Responses ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_and_fetch_response() {
  let s = store().await;
  let detail = published_poll(&s).await;
  let survey_id = detail.survey.survey_id;
  let multi = &detail.questions[1];

  let mut input = response(survey_id, anonymous("s1"), vec![
    NewAnswer::options(multi.question_id, vec![
      multi.options[0].option_id,
      multi.options[2].option_id,
    ]),
    NewAnswer::number(detail.questions[2].question_id, 3.0),
  ]);
  input.meta.user_agent = Some("curl/8".into());

  let recorded = s.record_response(input).await.unwrap();
  assert_eq!(recorded.respondent, anonymous("s1"));

  let fetched = s.get_response(recorded.response_id).await.unwrap().unwrap();
  assert_eq!(fetched.response.submitted_at, recorded.submitted_at);
  assert_eq!(fetched.response.meta.user_agent.as_deref(), Some("curl/8"));
  assert_eq!(fetched.answers.len(), 2);
  assert_eq!(fetched.answers[0].option_ids, [
    multi.options[0].option_id,
    multi.options[2].option_id,
  ]);
  assert_eq!(fetched.answers[1].value_number, Some(3.0));

  assert!(s.get_response(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn anonymous_duplicate_is_rejected() {
  let s = store().await;
  let survey_id = published_poll(&s).await.survey.survey_id;

  s.record_response(response(survey_id, anonymous("s1"), vec![]))
    .await
    .unwrap();
  let err = s
    .record_response(response(survey_id, anonymous("s1"), vec![]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(tally_core::Error::DuplicateSubmission(_))));

  // A different session is a different respondent.
  s.record_response(response(survey_id, anonymous("s2"), vec![]))
    .await
    .unwrap();
  assert_eq!(s.list_responses(survey_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn authenticated_duplicate_is_rejected() {
  let s = store().await;
  let survey_id = published_poll(&s).await.survey.survey_id;
  let user = Identity::Authenticated { user_id: Uuid::new_v4() };

  assert!(!s.has_responded(survey_id, &user).await.unwrap());
  s.record_response(response(survey_id, user.clone(), vec![]))
    .await
    .unwrap();
  assert!(s.has_responded(survey_id, &user).await.unwrap());

  let err = s
    .record_response(response(survey_id, user, vec![]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(tally_core::Error::DuplicateSubmission(_))));
  assert_eq!(count(&s, "responses").await, 1);
}

#[tokio::test]
async fn concurrent_submissions_record_exactly_one() {
  let s = store().await;
  let survey_id = published_poll(&s).await.survey.survey_id;
  let user = Identity::Authenticated { user_id: Uuid::new_v4() };

  let (a, b) = tokio::join!(
    s.record_response(response(survey_id, user.clone(), vec![])),
    s.record_response(response(survey_id, user.clone(), vec![])),
  );

  assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
  let err = a.err().or(b.err()).unwrap();
  assert!(matches!(err, Error::Core(tally_core::Error::DuplicateSubmission(_))));
  assert_eq!(count(&s, "responses").await, 1);
}

#[tokio::test]
async fn unique_index_rejects_second_row_for_identity() {
  let s = store().await;
  let survey_id = encode_uuid(published_poll(&s).await.survey.survey_id);

  let row = move |user_id: Option<&str>, session_id: Option<&str>| ResponseRow {
    response_id:  encode_uuid(Uuid::new_v4()),
    survey_id:    survey_id.clone(),
    user_id:      user_id.map(str::to_owned),
    session_id:   session_id.map(str::to_owned),
    submitted_at: "2024-01-01T09:00:00.000000Z".into(),
    meta:         "{}".into(),
  };
  let rows = [
    row(Some("u1"), None),
    row(Some("u1"), None),
    row(None, Some("s1")),
    row(None, Some("s1")),
    row(None, Some("s2")),
  ];

  let outcomes = s
    .conn
    .call(move |conn| {
      Ok(
        rows
          .iter()
          .map(|r| match insert_response(conn, r) {
            Ok(()) => "ok",
            Err(e) if is_unique_violation(&e) => "duplicate",
            Err(_) => "other",
          })
          .collect::<Vec<_>>(),
      )
    })
    .await
    .unwrap();

  assert_eq!(outcomes, ["ok", "duplicate", "ok", "duplicate", "ok"]);
  assert_eq!(count(&s, "responses").await, 3);
}

#[tokio::test]
async fn row_written_outside_the_store_still_blocks_resubmission() {
  let s = store().await;
  let survey_id = published_poll(&s).await.survey.survey_id;
  let row = ResponseRow {
    response_id:  encode_uuid(Uuid::new_v4()),
    survey_id:    encode_uuid(survey_id),
    user_id:      None,
    session_id:   Some("s1".into()),
    submitted_at: "2024-01-01T09:00:00.000000Z".into(),
    meta:         "{}".into(),
  };
  s.conn
    .call(move |conn| Ok(insert_response(conn, &row)?))
    .await
    .unwrap();

  let err = s
    .record_response(response(survey_id, anonymous("s1"), vec![]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(tally_core::Error::DuplicateSubmission(_))));
}

#[tokio::test]
async fn draft_survey_rejects_submissions() {
  let s = store().await;
  let owner_id = owner(&s).await;
  let survey_id = s.create_survey(owner_id, poll()).await.unwrap().survey.survey_id;

  let err = s
    .record_response(response(survey_id, anonymous("s1"), vec![]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(tally_core::Error::SurveyNotAvailable(_))));

  s.toggle_published(survey_id).await.unwrap();
  s.record_response(response(survey_id, anonymous("s1"), vec![]))
    .await
    .unwrap();

  let err = s
    .record_response(response(Uuid::new_v4(), anonymous("s1"), vec![]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(tally_core::Error::SurveyNotAvailable(_))));
}

#[tokio::test]
async fn dangling_option_persists_nothing() {
  let s = store().await;
  let detail = published_poll(&s).await;
  let survey_id = detail.survey.survey_id;

  let err = s
    .record_response(response(survey_id, anonymous("s1"), vec![
      NewAnswer::text(detail.questions[3].question_id, "hi"),
      NewAnswer::options(detail.questions[0].question_id, vec![Uuid::new_v4()]),
    ]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(tally_core::Error::DanglingReference(_))));

  assert_eq!(count(&s, "responses").await, 0);
  assert_eq!(count(&s, "answer_values").await, 0);
  assert_eq!(count(&s, "answer_options").await, 0);

  // The failed attempt does not count as a submission.
  s.record_response(response(survey_id, anonymous("s1"), vec![]))
    .await
    .unwrap();
}

#[tokio::test]
async fn list_responses_oldest_first() {
  let s = store().await;
  let survey_id = published_poll(&s).await.survey.survey_id;

  for session in ["a", "b", "c"] {
    s.record_response(response(survey_id, anonymous(session), vec![]))
      .await
      .unwrap();
  }

  let listed = s.list_responses(survey_id).await.unwrap();
  let sessions: Vec<_> = listed
    .iter()
    .filter_map(|r| r.respondent.session_id())
    .collect();
  assert_eq!(sessions, ["a", "b", "c"]);
  assert!(listed.windows(2).all(|w| w[0].submitted_at <= w[1].submitted_at));
}

// ─── Submission facade ───────────────────────────────────────────────────────

#[tokio::test]
async fn submit_checks_before_recording() {
  let s = store().await;
  let survey_id = published_poll(&s).await.survey.survey_id;
  let who = anonymous("s1");

  assert!(submission::may_submit(&s, survey_id, &who).await.unwrap());
  submission::submit(&s, survey_id, who.clone(), vec![], ResponseMeta::default())
    .await
    .unwrap();
  assert!(!submission::may_submit(&s, survey_id, &who).await.unwrap());

  let err = submission::submit(&s, survey_id, who, vec![], ResponseMeta::default())
    .await
    .unwrap_err();
  assert!(matches!(err, tally_core::Error::DuplicateSubmission(_)));

  let err = submission::submit(
    &s,
    Uuid::new_v4(),
    anonymous("s2"),
    vec![],
    ResponseMeta::default(),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, tally_core::Error::SurveyNotAvailable(_)));
}

// ─── Analytics ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn report_counts_selections_across_responses() {
  let s = store().await;
  let detail = published_poll(&s).await;
  let survey_id = detail.survey.survey_id;
  let single = &detail.questions[0];
  let multi = &detail.questions[1];

  // Three responses; only the first answers the multi-choice question, and
  // it picks two options.
  s.record_response(response(survey_id, anonymous("a"), vec![
    NewAnswer::options(single.question_id, vec![single.options[0].option_id]),
    NewAnswer::options(multi.question_id, vec![
      multi.options[0].option_id,
      multi.options[1].option_id,
    ]),
  ]))
  .await
  .unwrap();
  s.record_response(response(survey_id, anonymous("b"), vec![
    NewAnswer::options(single.question_id, vec![single.options[0].option_id]),
  ]))
  .await
  .unwrap();
  s.record_response(response(survey_id, anonymous("c"), vec![
    NewAnswer::options(single.question_id, vec![single.options[1].option_id]),
  ]))
  .await
  .unwrap();

  let report = analytics::survey_report(&s, survey_id).await.unwrap();
  assert_eq!(report.total_responses, 3);
  assert_eq!(report.questions.len(), 4);

  let Breakdown::Single { options } = &report.questions[0].breakdown else {
    panic!("expected single breakdown");
  };
  let counts: Vec<_> = options.iter().map(|o| o.count).collect();
  assert_eq!(counts, [2, 1, 0]);

  let multi_report = &report.questions[1];
  assert_eq!(multi_report.total_responses, 2);
  let Breakdown::Multi { options } = &multi_report.breakdown else {
    panic!("expected multi breakdown");
  };
  let percentages: Vec<_> = options.iter().map(|o| o.percentage).collect();
  assert_eq!(percentages, [50.0, 50.0, 0.0]);
}

#[tokio::test]
async fn report_with_no_responses_has_zeroes() {
  let s = store().await;
  let survey_id = published_poll(&s).await.survey.survey_id;

  let report = analytics::survey_report(&s, survey_id).await.unwrap();
  assert_eq!(report.total_responses, 0);
  for q in &report.questions {
    assert_eq!(q.total_responses, 0);
    match &q.breakdown {
      Breakdown::Single { options } | Breakdown::Multi { options } => {
        assert_eq!(options.len(), 3);
        assert!(options.iter().all(|o| o.count == 0 && o.percentage == 0.0));
      }
      Breakdown::Scale { histogram, avg } => {
        assert!(histogram.is_empty());
        assert!(avg.is_none());
      }
      Breakdown::Text { text_responses } => assert!(text_responses.is_empty()),
    }
  }
}

#[tokio::test]
async fn report_scale_and_text() {
  let s = store().await;
  let detail = published_poll(&s).await;
  let survey_id = detail.survey.survey_id;
  let scale = detail.questions[2].question_id;
  let text = detail.questions[3].question_id;

  for (session, value, note) in [("a", 5.0, "first"), ("b", 3.0, "second"), ("c", 5.0, "third")] {
    s.record_response(response(survey_id, anonymous(session), vec![
      NewAnswer::number(scale, value),
      NewAnswer::text(text, note),
    ]))
    .await
    .unwrap();
  }

  let scale_report = analytics::question_report(&s, survey_id, scale).await.unwrap();
  assert_eq!(scale_report.total_responses, 3);
  let Breakdown::Scale { histogram, avg } = scale_report.breakdown else {
    panic!("expected scale breakdown");
  };
  let buckets: Vec<_> = histogram.iter().map(|b| (b.value, b.count)).collect();
  assert_eq!(buckets, [(3.0, 1), (5.0, 2)]);
  let avg = avg.unwrap();
  assert!((avg - 13.0 / 3.0).abs() < 1e-9);

  let text_report = analytics::question_report(&s, survey_id, text).await.unwrap();
  let Breakdown::Text { text_responses } = text_report.breakdown else {
    panic!("expected text breakdown");
  };
  assert_eq!(text_responses.len(), 3);
  assert!(
    text_responses
      .windows(2)
      .all(|w| w[0].submitted_at >= w[1].submitted_at)
  );
}

#[tokio::test]
async fn question_report_matches_survey_entry() {
  let s = store().await;
  let detail = published_poll(&s).await;
  let survey_id = detail.survey.survey_id;
  let pick = &detail.questions[0];
  submission::submit(
    &s,
    survey_id,
    anonymous("s1"),
    vec![NewAnswer::options(pick.question_id, vec![pick.options[1].option_id])],
    ResponseMeta::default(),
  )
  .await
  .unwrap();

  let single = analytics::question_report(&s, survey_id, pick.question_id)
    .await
    .unwrap();
  let whole = analytics::survey_report(&s, survey_id).await.unwrap();
  assert_eq!(single, whole.questions[0]);
  assert_eq!(single.total_responses, 1);
}

#[tokio::test]
async fn question_report_rejects_foreign_question() {
  let s = store().await;
  let first = published_poll(&s).await;
  let second = published_poll(&s).await;

  let err = analytics::question_report(
    &s,
    first.survey.survey_id,
    second.questions[0].question_id,
  )
  .await
  .unwrap_err();
  assert!(matches!(err, tally_core::Error::QuestionNotFound(_)));

  let err = analytics::survey_report(&s, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, tally_core::Error::SurveyNotFound(_)));
}

// ─── Cascades ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_survey_cascades_everything() {
  let s = store().await;
  let detail = published_poll(&s).await;
  let survey_id = detail.survey.survey_id;
  let single = &detail.questions[0];

  s.record_response(response(survey_id, anonymous("a"), vec![
    NewAnswer::options(single.question_id, vec![single.options[0].option_id]),
    NewAnswer::text(detail.questions[3].question_id, "bye"),
  ]))
  .await
  .unwrap();

  assert!(s.delete_survey(survey_id).await.unwrap());
  assert!(!s.delete_survey(survey_id).await.unwrap());

  for table in [
    "surveys",
    "questions",
    "options",
    "responses",
    "answer_values",
    "answer_options",
  ] {
    assert_eq!(count(&s, table).await, 0, "{table} not emptied");
  }
  assert_eq!(count(&s, "users").await, 1);
}
