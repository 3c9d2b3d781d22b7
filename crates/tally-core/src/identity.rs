//! Respondent identity resolution.
//!
//! A respondent is either a signed-in user or an anonymous browser carrying a
//! session cookie. The two schemes are mutually exclusive, so identity is a
//! two-variant enum rather than a pair of nullable ids.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the cookie carrying an anonymous respondent's session token.
pub const SESSION_COOKIE: &str = "survey_session_id";

/// Lifetime of a freshly minted session cookie (one year).
pub const SESSION_COOKIE_MAX_AGE: Duration = Duration::from_secs(31_536_000);

/// The canonical respondent for one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
  Authenticated { user_id: Uuid },
  Anonymous { session_id: String },
}

impl Identity {
  pub fn user_id(&self) -> Option<Uuid> {
    match self {
      Self::Authenticated { user_id } => Some(*user_id),
      Self::Anonymous { .. } => None,
    }
  }

  pub fn session_id(&self) -> Option<&str> {
    match self {
      Self::Authenticated { .. } => None,
      Self::Anonymous { session_id } => Some(session_id),
    }
  }
}

/// `SameSite` attribute of a cookie directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
  Strict,
  Lax,
}

/// Instruction to the transport layer to store a cookie on the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDirective {
  pub name:      &'static str,
  pub value:     String,
  pub max_age:   Duration,
  pub http_only: bool,
  pub same_site: SameSite,
}

impl CookieDirective {
  /// The long-lived, HTTP-only, lax session cookie for `session_id`.
  pub fn session(session_id: impl Into<String>) -> Self {
    Self {
      name:      SESSION_COOKIE,
      value:     session_id.into(),
      max_age:   SESSION_COOKIE_MAX_AGE,
      http_only: true,
      same_site: SameSite::Lax,
    }
  }
}

/// Result of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
  pub identity:   Identity,
  /// Present only when a new session token was minted for this request.
  pub set_cookie: Option<CookieDirective>,
}

/// Generate a new opaque session token: 128 random bits, hyphenated.
pub fn mint_session_token() -> String { Uuid::new_v4().hyphenated().to_string() }

/// Resolve the respondent for a request.
///
/// `authenticated` is the user id vouched for by the credential layer, if
/// any. `session_cookie` is the raw cookie value; an empty value counts as
/// absent. A minted token becomes this request's identity immediately.
pub fn resolve(
  authenticated: Option<Uuid>,
  session_cookie: Option<&str>,
) -> Resolution {
  if let Some(user_id) = authenticated {
    return Resolution {
      identity:   Identity::Authenticated { user_id },
      set_cookie: None,
    };
  }

  match session_cookie.filter(|s| !s.is_empty()) {
    Some(session_id) => Resolution {
      identity:   Identity::Anonymous { session_id: session_id.to_owned() },
      set_cookie: None,
    },
    None => {
      let token = mint_session_token();
      Resolution {
        identity:   Identity::Anonymous { session_id: token.clone() },
        set_cookie: Some(CookieDirective::session(token)),
      }
    }
  }
}
