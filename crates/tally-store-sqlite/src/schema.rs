//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.
//!
//! Ownership subtrees are removed with `ON DELETE CASCADE`, which only fires
//! while `foreign_keys` is enabled on the connection.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS surveys (
    survey_id    TEXT PRIMARY KEY,
    owner_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    title        TEXT NOT NULL,
    description  TEXT NOT NULL,
    is_published INTEGER NOT NULL DEFAULT 0,
    settings     TEXT,            -- JSON or NULL
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS questions (
    question_id TEXT PRIMARY KEY,
    survey_id   TEXT NOT NULL REFERENCES surveys(survey_id) ON DELETE CASCADE,
    text        TEXT NOT NULL,
    kind        TEXT NOT NULL CHECK (kind IN ('single', 'multi', 'scale', 'text')),
    required    INTEGER NOT NULL DEFAULT 1,
    ord         INTEGER NOT NULL DEFAULT 0,
    meta        TEXT             -- JSON or NULL
);

CREATE TABLE IF NOT EXISTS options (
    option_id   TEXT PRIMARY KEY,
    question_id TEXT NOT NULL REFERENCES questions(question_id) ON DELETE CASCADE,
    text        TEXT NOT NULL,
    ord         INTEGER NOT NULL DEFAULT 0
);

-- Exactly one of user_id / session_id identifies the respondent.
-- user_id is the opaque id vouched for by the credential layer.
CREATE TABLE IF NOT EXISTS responses (
    response_id  TEXT PRIMARY KEY,
    survey_id    TEXT NOT NULL REFERENCES surveys(survey_id) ON DELETE CASCADE,
    user_id      TEXT,
    session_id   TEXT,
    submitted_at TEXT NOT NULL,   -- fixed-width RFC 3339 UTC; server-assigned
    meta         TEXT NOT NULL DEFAULT '{}',
    CHECK ((user_id IS NULL) <> (session_id IS NULL))
);

-- One response per identity per survey. These indexes are the authority;
-- the pre-insert lookup only avoids opening a doomed transaction.
CREATE UNIQUE INDEX IF NOT EXISTS responses_once_per_user
    ON responses(survey_id, user_id) WHERE user_id IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS responses_once_per_session
    ON responses(survey_id, session_id) WHERE session_id IS NOT NULL;

CREATE TABLE IF NOT EXISTS answer_values (
    answer_id    TEXT PRIMARY KEY,
    response_id  TEXT NOT NULL REFERENCES responses(response_id) ON DELETE CASCADE,
    question_id  TEXT NOT NULL REFERENCES questions(question_id) ON DELETE CASCADE,
    value_text   TEXT,
    value_number REAL
);

CREATE TABLE IF NOT EXISTS answer_options (
    answer_option_id TEXT PRIMARY KEY,
    answer_id        TEXT NOT NULL REFERENCES answer_values(answer_id) ON DELETE CASCADE,
    option_id        TEXT NOT NULL REFERENCES options(option_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS surveys_owner_idx          ON surveys(owner_id);
CREATE INDEX IF NOT EXISTS questions_survey_idx       ON questions(survey_id);
CREATE INDEX IF NOT EXISTS options_question_idx       ON options(question_id);
CREATE INDEX IF NOT EXISTS responses_submitted_idx    ON responses(survey_id, submitted_at);
CREATE INDEX IF NOT EXISTS answer_values_response_idx ON answer_values(response_id);
CREATE INDEX IF NOT EXISTS answer_values_question_idx ON answer_values(question_id);
CREATE INDEX IF NOT EXISTS answer_options_answer_idx  ON answer_options(answer_id);
CREATE INDEX IF NOT EXISTS answer_options_option_idx  ON answer_options(option_id);

PRAGMA user_version = 1;
";
