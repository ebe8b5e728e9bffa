//! Error types for the provider bridge.
//!
//! The bridge never decides what a failure *means* for the user. It keeps
//! the provider's own machine-readable code and HTTP status so the session
//! layer can classify it into its closed set of error kinds.

/// Machine-readable error codes identity providers report.
///
/// Only the codes Authgate classifies are listed; anything else is passed
/// through untouched in [`ProviderError::Api::code`].
pub mod codes {
    pub const INVALID_CREDENTIALS: &str = "invalid_credentials";
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const EMAIL_ADDRESS_INVALID: &str = "email_address_invalid";
    pub const WEAK_PASSWORD: &str = "weak_password";
    pub const USER_ALREADY_EXISTS: &str = "user_already_exists";
    pub const EMAIL_EXISTS: &str = "email_exists";
    pub const CAPTCHA_FAILED: &str = "captcha_failed";
    pub const SESSION_NOT_FOUND: &str = "session_not_found";
}

/// Errors reported by an [`IdentityProvider`](crate::IdentityProvider).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered, but rejected the request.
    #[error("provider rejected request ({}): {message}", .code.as_deref().unwrap_or("no code"))]
    Api {
        /// Machine-readable code, when the provider sent one.
        code: Option<String>,
        /// HTTP status of the provider response, when known.
        status: Option<u16>,
        /// Human-readable message from the provider.
        message: String,
    },

    /// The provider could not be reached (DNS, TLS, connection reset, ...).
    #[error("provider unreachable: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Shorthand for an API rejection carrying a code.
    pub fn api(
        code: &str,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::Api {
            code: Some(code.to_string()),
            status: Some(status),
            message: message.into(),
        }
    }

    /// Returns the provider error code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            Self::Transport(_) => None,
        }
    }

    /// Returns `true` when the failure happened before the provider answered.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_code_and_message() {
        let err = ProviderError::api(codes::WEAK_PASSWORD, 422, "too short");
        let text = err.to_string();
        assert!(text.contains("weak_password"));
        assert!(text.contains("too short"));
        assert_eq!(err.code(), Some("weak_password"));
    }

    #[test]
    fn test_api_error_without_code_displays_placeholder() {
        let err = ProviderError::Api {
            code: None,
            status: Some(400),
            message: "bad".into(),
        };
        assert!(err.to_string().contains("no code"));
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_transport_error_is_transport() {
        let err = ProviderError::Transport("connection reset".into());
        assert!(err.is_transport());
        assert!(err.to_string().contains("connection reset"));
    }
}
