//! The closed set of authentication error kinds.
//!
//! Provider adapters report whatever their service says. Callers of the
//! coordinator only ever see [`AuthError`], so they can branch on a small,
//! stable set of kinds and show targeted guidance (a weak-password hint,
//! a "reset the challenge" prompt) instead of raw provider text.

use authgate_provider::{ProviderError, codes};

/// Errors returned by the sign-in family and other public operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No identity provider is configured. No network call was attempted.
    #[error("identity provider is not configured")]
    Configuration,

    /// Bad email/password combination, or malformed input.
    #[error("invalid credentials: {0}")]
    InvalidCredential(String),

    /// The provider rejected the password on strength grounds.
    #[error("password rejected as too weak: {0}")]
    WeakPassword(String),

    /// The email already has an account.
    #[error("email address is already registered")]
    AlreadyRegistered,

    /// The anti-automation challenge token was rejected.
    #[error("challenge verification failed: {0}")]
    ChallengeFailed(String),

    /// The provider could not be reached. Safe to retry.
    #[error("network error: {0}")]
    Network(String),

    /// A credential was rejected after the fact.
    #[error("credential rejected")]
    Unauthorized,
}

/// Discriminant of [`AuthError`], for matching without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    InvalidCredential,
    WeakPassword,
    AlreadyRegistered,
    ChallengeFailed,
    Network,
    Unauthorized,
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration => ErrorKind::Configuration,
            Self::InvalidCredential(_) => ErrorKind::InvalidCredential,
            Self::WeakPassword(_) => ErrorKind::WeakPassword,
            Self::AlreadyRegistered => ErrorKind::AlreadyRegistered,
            Self::ChallengeFailed(_) => ErrorKind::ChallengeFailed,
            Self::Network(_) => ErrorKind::Network,
            Self::Unauthorized => ErrorKind::Unauthorized,
        }
    }

    /// Only transport failures are worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// A message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration => {
                "Sign-in is not available right now. Please try again later."
            }
            Self::InvalidCredential(_) => {
                "The email or password is incorrect."
            }
            Self::WeakPassword(_) => {
                "Choose a stronger password: longer, with a mix of characters."
            }
            Self::AlreadyRegistered => {
                "An account with this email already exists. Try signing in instead."
            }
            Self::ChallengeFailed(_) => {
                "The verification challenge failed. Please complete it again."
            }
            Self::Network(_) => {
                "Couldn't reach the sign-in service. Check your connection and retry."
            }
            Self::Unauthorized => {
                "Your session has expired. Please sign in again."
            }
        }
    }
}

impl From<ProviderError> for AuthError {
    /// Classifies a provider failure: by error code first, then by
    /// well-known message fragments, then by HTTP status. Anything left is
    /// surfaced as an invalid-credential error carrying the provider text.
    fn from(err: ProviderError) -> Self {
        let (code, status, message) = match err {
            ProviderError::Transport(msg) => return Self::Network(msg),
            ProviderError::Api {
                code,
                status,
                message,
            } => (code, status, message),
        };

        match code.as_deref() {
            Some(codes::WEAK_PASSWORD) => return Self::WeakPassword(message),
            Some(codes::USER_ALREADY_EXISTS | codes::EMAIL_EXISTS) => {
                return Self::AlreadyRegistered;
            }
            Some(codes::CAPTCHA_FAILED) => return Self::ChallengeFailed(message),
            Some(codes::SESSION_NOT_FOUND) => return Self::Unauthorized,
            Some(
                codes::INVALID_CREDENTIALS
                | codes::VALIDATION_FAILED
                | codes::EMAIL_ADDRESS_INVALID,
            ) => return Self::InvalidCredential(message),
            _ => {}
        }

        let lower = message.to_lowercase();
        if lower.contains("already registered") || lower.contains("already exists") {
            return Self::AlreadyRegistered;
        }
        if lower.contains("password should be") || lower.contains("weak password") {
            return Self::WeakPassword(message);
        }
        if lower.contains("captcha") {
            return Self::ChallengeFailed(message);
        }

        match status {
            Some(429) | Some(500..=599) => Self::Network(message),
            _ => Self::InvalidCredential(message),
        }
    }
}

/// Rejects obviously malformed emails before any provider call.
pub(crate) fn validate_email(email: &str) -> Result<(), AuthError> {
    let email = email.trim();
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    });
    if valid {
        Ok(())
    } else {
        Err(AuthError::InvalidCredential(
            "enter a valid email address".into(),
        ))
    }
}

pub(crate) fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        Err(AuthError::InvalidCredential("password is required".into()))
    } else {
        Ok(())
    }
}
