//! Survey owners and respondents who sign in.
//!
//! Credentials are checked by the HTTP layer; the core only ever sees the
//! resulting user id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub email:      String,
  pub created_at: DateTime<Utc>,
}

/// A user together with the argon2 PHC string used to verify their password.
/// Never serialised.
#[derive(Debug, Clone)]
pub struct StoredCredential {
  pub user:          User,
  pub password_hash: String,
}
