//! Client-held session state shared by every route of one client.
//!
//! The session carries the query parameters forwarded on each outgoing
//! request (notably the pagination `cursor` and the `internal_ext` extension
//! token) and the cookie jar the sign server populates.
//!
//! All access goes through one mutex. A handshake writes cursor, extension
//! token and cookies in a single critical section via [`Session::apply_handshake`],
//! so no reader can observe a partially updated session. The lock is never
//! held across an `.await`.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::CookieRecord;

/// Query parameter carrying the pagination cursor.
pub const PARAM_CURSOR: &str = "cursor";

/// Query parameter carrying the extension token.
pub const PARAM_INTERNAL_EXT: &str = "internal_ext";

/// Cookies keyed by `(name, domain)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar(BTreeMap<(String, String), String>);

impl CookieJar {
    /// Stores a cookie, replacing any value under the same name and domain.
    pub fn set(&mut self, cookie: &CookieRecord) {
        self.0.insert(
            (cookie.name.as_str().to_owned(), cookie.domain.clone()),
            cookie.value.clone(),
        );
    }

    /// Looks a cookie up by name and domain.
    pub fn get(&self, name: &str, domain: &str) -> Option<&str> {
        self.0
            .get(&(name.to_owned(), domain.to_owned()))
            .map(String::as_str)
    }

    /// Number of stored cookies.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when no cookie is stored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(name, domain, value)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.0
            .iter()
            .map(|((name, domain), value)| (name.as_str(), domain.as_str(), value.as_str()))
    }
}

/// A consistent copy of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Query parameters sent with every request.
    pub params: BTreeMap<String, String>,
    /// Cookies received from the sign server.
    pub cookies: CookieJar,
}

impl SessionState {
    /// Current pagination cursor, if a handshake has set one.
    pub fn cursor(&self) -> Option<&str> {
        self.params.get(PARAM_CURSOR).map(String::as_str)
    }

    /// Current extension token, if a handshake has set one.
    pub fn extension_token(&self) -> Option<&str> {
        self.params.get(PARAM_INTERNAL_EXT).map(String::as_str)
    }
}

/// What a successful handshake writes into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeUpdate {
    /// Cursor from the decoded envelope, sent as `cursor` next time.
    pub cursor: String,
    /// Extension token from the envelope, sent as `internal_ext` next time.
    pub extension_token: String,
    /// Cookies parsed from `X-Set-TT-Cookie`.
    pub cookies: Vec<CookieRecord>,
}

/// Mutex-guarded session shared between routes.
#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    /// An empty session: no cursor, no extension token, no cookies.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session seeded with the given query parameters.
    pub fn with_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let params = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            state: Mutex::new(SessionState {
                params,
                cookies: CookieJar::default(),
            }),
        }
    }

    // Poisoning is ignored: the mutations below are plain map inserts.
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copies the current state.
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    /// Query parameters to send with the next request, in key order.
    pub fn query_params(&self) -> Vec<(String, String)> {
        self.lock()
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Sets one query parameter.
    pub fn set_param(&self, name: impl Into<String>, value: impl Into<String>) {
        self.lock().params.insert(name.into(), value.into());
    }

    /// Writes a handshake result as one atomic unit.
    pub fn apply_handshake(&self, update: HandshakeUpdate) {
        let mut state = self.lock();
        state.params.insert(PARAM_CURSOR.to_owned(), update.cursor);
        state
            .params
            .insert(PARAM_INTERNAL_EXT.to_owned(), update.extension_token);
        for cookie in &update.cookies {
            state.cookies.set(cookie);
        }
    }
}
