//! Credentials, header derivation and the login/logout state transitions.

use std::collections::BTreeMap;

use http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{self, ReservationApi};
use crate::session::{Field, Session};
use crate::store::CacheStore;
use crate::sync::{persist, recover_credentials};

/// Outgoing headers that authenticate a call to the reservation API.
///
/// Derived from the access token whenever it is needed. The copy kept in the
/// session and the cache is a convenience, never the source of truth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthHeaders(BTreeMap<String, String>);

impl AuthHeaders {
    pub fn bearer(token: &str) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_owned(), format!("Bearer {token}"));
        headers.insert("Content-Type".to_owned(), "application/json".to_owned());
        Self(headers)
    }

    /// Looks a header up by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_header_map(&self) -> Result<HeaderMap, api::Error> {
        let mut map = HeaderMap::with_capacity(self.0.len());
        for (name, value) in &self.0 {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            map.insert(name, HeaderValue::from_str(value)?);
        }
        Ok(map)
    }
}

/// What the presentation layer should do after a state transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum Transition {
    /// State changed; start a new cycle so every view observes it.
    Rerun,
}

/// Login failures, each carrying a message fit to show the user.
#[derive(Error, Debug)]
pub enum LoginError {
    /// The API rejected the credentials.
    #[error("Login failed: {0}")]
    Rejected(String),

    /// The API could not be reached.
    #[error("API connection error: {0}")]
    Connection(String),

    /// The token was issued but the store identity could not be fetched.
    #[error("Login succeeded, but the store information could not be loaded.")]
    StoreUnavailable,
}

impl From<api::Error> for LoginError {
    fn from(err: api::Error) -> Self {
        match err {
            api::Error::Rejected { message, .. } => LoginError::Rejected(message),
            api::Error::Transport(err) => LoginError::Connection(err.to_string()),
            other => LoginError::Rejected(other.to_string()),
        }
    }
}

/// Returns the headers for an authenticated call, or `None` when no access
/// token exists in the session or the cache.
///
/// When the session has no token but the cache does, the session is first
/// rehydrated from the cache. The derived headers are stored in the session and
/// persisted, so this call mutates both layers whenever it returns `Some`.
#[tracing::instrument(name = "deriving auth headers", skip_all, fields(cycle = %session.id()))]
pub fn auth_headers<C: CacheStore>(session: &Session, cache: &C) -> Option<AuthHeaders> {
    let token = match session.access_token() {
        Some(token) => token,
        None => {
            if !recover_credentials(session, cache) {
                tracing::debug!("no access token in session or cache");
                return None;
            }
            session.access_token()?
        }
    };

    let headers = AuthHeaders::bearer(&token);
    session.set_headers(headers.clone());
    persist(session, cache);
    Some(headers)
}

/// Logs the owner in.
///
/// On success the session holds both tokens, `logged_in`, and the store
/// identity, and everything has been persisted to the cache.
///
/// When the API rejects the credentials nothing is mutated. When the token is
/// issued but the store identity cannot be fetched, `logged_in` is set back to
/// `false` while the tokens stay in the session.
#[tracing::instrument(name = "logging in", skip(api, session, cache, password), fields(cycle = %session.id()))]
pub async fn login<A, C>(
    api: &A,
    session: &Session,
    cache: &C,
    email: &str,
    password: &str,
) -> Result<Transition, LoginError>
where
    A: ReservationApi,
    C: CacheStore,
{
    let tokens = api.login(email, password).await.map_err(|err| {
        tracing::error!(err = %err, "login request failed");
        LoginError::from(err)
    })?;

    session.set_tokens(tokens.access_token, tokens.refresh_token);
    session.set_logged_in(true);

    if !fetch_identity(api, session, cache).await {
        session.set_logged_in(false);
        tracing::warn!("rolled back login, store identity unavailable");
        return Err(LoginError::StoreUnavailable);
    }

    persist(session, cache);
    tracing::info!("owner logged in");
    Ok(Transition::Rerun)
}

/// Clears the cache, then the session.
///
/// The cache is reset first so that the cycle started by the returned
/// [`Transition`] rehydrates from the cleared values.
#[tracing::instrument(name = "logging out", skip_all, fields(cycle = %session.id()))]
pub fn logout<C: CacheStore>(session: &Session, cache: &C) -> Transition {
    cache.reset();
    for field in Field::ALL {
        session.remove(field);
    }
    Transition::Rerun
}

async fn fetch_identity<A, C>(api: &A, session: &Session, cache: &C) -> bool
where
    A: ReservationApi,
    C: CacheStore,
{
    let Some(headers) = auth_headers(session, cache) else {
        return false;
    };

    match api.fetch_identity(&headers).await {
        Ok(identity) => {
            session.set_store(identity.store_id, identity.store_name);
            true
        }
        Err(err) => {
            tracing::error!(err = %err, "failed to fetch store identity");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{AUTHORIZATION, CONTENT_TYPE};

    #[test]
    fn bearer_headers() {
        let headers = AuthHeaders::bearer("abc");
        assert_eq!(headers.get("Authorization"), Some("Bearer abc"));
        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn header_map_conversion() {
        let map = AuthHeaders::bearer("abc").to_header_map().unwrap();
        assert_eq!(map[AUTHORIZATION], "Bearer abc");
        assert_eq!(map[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn invalid_token_is_rejected_by_header_map() {
        assert!(AuthHeaders::bearer("bad\ntoken").to_header_map().is_err());
    }

    #[test]
    fn login_error_messages() {
        let err = LoginError::from(api::Error::Rejected {
            status: http::StatusCode::UNAUTHORIZED,
            message: "wrong password".into(),
        });
        assert_eq!(err.to_string(), "Login failed: wrong password");
    }
}
