//! Error taxonomy for gateway calls.

use thiserror::Error;

/// Result type alias for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Everything that can go wrong between the client and the gateway.
///
/// Each variant carries the message shown to the user; `Display` is that message
/// and nothing else, so screens can render `error.to_string()` directly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Bad credentials, or an expired or invalid bearer token (HTTP 401).
    #[error("{message}")]
    Authentication {
        /// Message for the user
        message: String,
    },

    /// The caller may not touch this resource (HTTP 403).
    #[error("{message}")]
    Forbidden {
        /// Message for the user
        message: String,
    },

    /// The request conflicts with server state, e.g. the per-account seat quota (HTTP 409).
    #[error("{message}")]
    Conflict {
        /// Message for the user
        message: String,
    },

    /// Input rejected on the client before any call was made.
    #[error("{message}")]
    Validation {
        /// Message for the user
        message: String,
    },

    /// The resource does not exist (HTTP 404).
    #[error("{message}")]
    NotFound {
        /// Message for the user
        message: String,
    },

    /// The gateway answered with an envelope reporting `success: false`.
    #[error("{message}")]
    Rejected {
        /// Message for the user
        message: String,
    },

    /// Anything else: other statuses, transport failures, undecodable bodies.
    #[error("{message}")]
    Gateway {
        /// HTTP status, if a response was received
        status: Option<u16>,
        /// Message for the user
        message: String,
    },
}

impl GatewayError {
    /// Build a client-side validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Build an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Build a generic error with no HTTP status (network or local failure).
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Gateway {
            status: None,
            message: message.into(),
        }
    }

    /// Map an HTTP error status and the message extracted from its body.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => Self::Authentication { message },
            403 => Self::Forbidden { message },
            404 => Self::NotFound { message },
            409 => Self::Conflict { message },
            _ => Self::Gateway {
                status: Some(status),
                message,
            },
        }
    }

    /// The user-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Authentication { message }
            | Self::Forbidden { message }
            | Self::Conflict { message }
            | Self::Validation { message }
            | Self::NotFound { message }
            | Self::Rejected { message }
            | Self::Gateway { message, .. } => message,
        }
    }

    /// Same variant, message replaced by `fallback` when the gateway sent none.
    #[must_use]
    pub fn or_message(mut self, fallback: &str) -> Self {
        let slot = self.message_mut();
        if slot.trim().is_empty() {
            *slot = fallback.to_string();
        }
        self
    }

    /// Same variant, message replaced unconditionally.
    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        *self.message_mut() = message.to_string();
        self
    }

    fn message_mut(&mut self) -> &mut String {
        match self {
            Self::Authentication { message }
            | Self::Forbidden { message }
            | Self::Conflict { message }
            | Self::Validation { message }
            | Self::NotFound { message }
            | Self::Rejected { message }
            | Self::Gateway { message, .. } => message,
        }
    }

    /// True for [`GatewayError::Authentication`].
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// True for [`GatewayError::Conflict`].
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// True for [`GatewayError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        Self::Gateway {
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        Self::transport(format!("Unexpected response from gateway: {error}"))
    }
}
