//! Current user resolution
//!
//! The `ct_user_id` cookie names the selected user. A missing, malformed or
//! unknown id resolves to the default user and the cookie is re-issued. The
//! resolved user is placed in request extensions as [`CurrentUser`].

use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use cash_track_core::User;

use crate::state::AppState;
use crate::ServerError;

pub const USER_COOKIE: &str = "ct_user_id";

/// User the request acts for
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }

    pub fn cutoff_day(&self) -> u32 {
        self.0.cutoff_day
    }
}

/// `Set-Cookie` value selecting `user_id`
pub fn user_cookie(user_id: i64) -> String {
    format!("{}={}; Path=/", USER_COOKIE, user_id)
}

fn cookie_user_id(headers: &HeaderMap) -> Option<i64> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == USER_COOKIE)
        .and_then(|(_, value)| value.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
}

/// Returns the user and whether the cookie must be re-issued
async fn resolve(state: &AppState, headers: &HeaderMap) -> Result<(User, bool), ServerError> {
    if let Some(id) = cookie_user_id(headers) {
        if let Some(user) = state.repository.get_user(id).await? {
            return Ok((user, false));
        }
        tracing::debug!(user_id = id, "Unknown user in cookie, using default");
    }

    let user = match state.repository.get_user(state.default_user_id).await? {
        Some(user) => user,
        None => state.repository.ensure_default_user().await?,
    };
    Ok((user, true))
}

/// Middleware for every `/api` route
pub async fn user_context(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let (user, reissue) = match resolve(&state, request.headers()).await {
        Ok(resolved) => resolved,
        Err(e) => return e.into_response(),
    };
    let user_id = user.id;
    request.extensions_mut().insert(CurrentUser(user));

    let mut response = next.run(request).await;

    // a handler that selected a user has already set the cookie
    if reissue && !response.headers().contains_key(SET_COOKIE) {
        if let Ok(value) = HeaderValue::from_str(&user_cookie(user_id)) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_cookie_user_id() {
        assert_eq!(cookie_user_id(&headers("ct_user_id=3")), Some(3));
        assert_eq!(cookie_user_id(&headers("theme=dark; ct_user_id=12 ; x=1")), Some(12));
        assert_eq!(cookie_user_id(&headers("ct_user_id=abc")), None);
        assert_eq!(cookie_user_id(&headers("ct_user_id=0")), None);
        assert_eq!(cookie_user_id(&headers("ct_user_id=-4")), None);
        assert_eq!(cookie_user_id(&headers("other=5")), None);
        assert_eq!(cookie_user_id(&HeaderMap::new()), None);
    }

    #[test]
    fn test_user_cookie_format() {
        assert_eq!(user_cookie(7), "ct_user_id=7; Path=/");
    }
}
