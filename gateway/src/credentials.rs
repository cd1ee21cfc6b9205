//! Credentials presented on authenticated gateway calls.

use crate::claims::user_id_from_token;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Bearer token issued by the gateway at login
///
/// Opaque to the client. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a token; blank input is not a token
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw token
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// The user id the token's payload claims, if any
    #[must_use]
    pub fn claimed_user_id(&self) -> Option<String> {
        user_id_from_token(&self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// What the transport attaches to each request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    /// Sent as `Authorization: Bearer <token>`
    pub token: BearerToken,
    /// Sent as `x-user-id`; a client-asserted hint, never an authorization input
    pub user_id: Option<String>,
}

impl Credentials {
    /// Credentials for `token`, user id derived from its payload
    #[must_use]
    pub fn from_token(token: BearerToken) -> Self {
        let user_id = token.claimed_user_id();
        Self { token, user_id }
    }
}

/// Shared, explicitly constructed home of the current credentials
///
/// The session writes it on login/logout; the HTTP transport reads it on every request.
/// Cloning yields another handle to the same slot.
#[derive(Clone, Debug, Default)]
pub struct CredentialSlot {
    inner: Arc<RwLock<Option<Credentials>>>,
}

impl CredentialSlot {
    /// An empty slot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current credentials
    pub fn install(&self, credentials: Credentials) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(credentials);
    }

    /// Forget the current credentials
    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// A copy of the current credentials
    #[must_use]
    pub fn current(&self) -> Option<Credentials> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether any credentials are installed
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
