//! Reading the respondent cookie and rendering `Set-Cookie` directives.

use axum::http::{HeaderMap, HeaderValue, header};
use tally_core::identity::{CookieDirective, SESSION_COOKIE, SameSite};

/// The value of the session cookie, if the request carries one.
pub fn read_session(headers: &HeaderMap) -> Option<String> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == SESSION_COOKIE)
    .map(|(_, value)| value.trim_matches('"').to_owned())
}

/// Render a directive as a `Set-Cookie` header value.
pub fn render(directive: &CookieDirective, secure: bool) -> String {
  let mut out = format!(
    "{}={}; Path=/; Max-Age={}",
    directive.name,
    directive.value,
    directive.max_age.as_secs(),
  );
  if directive.http_only {
    out.push_str("; HttpOnly");
  }
  out.push_str(match directive.same_site {
    SameSite::Strict => "; SameSite=Strict",
    SameSite::Lax => "; SameSite=Lax",
  });
  if secure {
    out.push_str("; Secure");
  }
  out
}

/// Append the directive to `headers`, if there is one.
pub fn apply(headers: &mut HeaderMap, directive: Option<&CookieDirective>, secure: bool) {
  let Some(directive) = directive else { return };
  match HeaderValue::from_str(&render(directive, secure)) {
    Ok(value) => {
      headers.append(header::SET_COOKIE, value);
    }
    Err(e) => tracing::warn!(error = %e, "dropping unencodable session cookie"),
  }
}
