//! Newtype identifiers used by the sign-fetch routes.
//!
//! Wrapping the raw strings keeps the client name, the API key, and the
//! per-attempt correlation id from being swapped for one another (or for a
//! query parameter value) at call sites.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a non-empty `String` newtype with `new` and `as_str`.
macro_rules! string_id {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Wraps `value`; `None` when it is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                Some(value.into()).filter(|v| !v.is_empty()).map(Self)
            }

            /// The wrapped name.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Name this client announces to the sign server in the `client` query
    /// parameter (e.g. `"ttlive-rust"`).
    ClientName
}

string_id! {
    /// Name of a cookie as it appears in a cookie-pair header.
    CookieName
}

// ---------------------------------------------------------------------------
// API key
// ---------------------------------------------------------------------------

/// Opaque API key forwarded to the sign server as the `apiKey` query parameter.
///
/// `Debug` is redacted and the type does not implement `Serialize`. The raw
/// key is reachable only through [`ApiKey::expose`].
#[derive(Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a key, returning `None` if the value is empty or whitespace.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.trim().is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Returns the raw key.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

// ---------------------------------------------------------------------------
// Attempt identifier
// ---------------------------------------------------------------------------

/// Identifies a single handshake attempt.
///
/// Generated fresh for every call to the sign-fetch route and recorded on its
/// span, so the request, the classification, and the session update of one
/// attempt can be correlated in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(Uuid);

impl AttemptId {
    /// Generates a new random attempt identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
