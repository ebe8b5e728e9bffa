//! Human-readable outcomes broadcast to the UI.

use crate::{AuthError, ExitReason};

/// One user-facing outcome of a coordinator operation.
///
/// Broadcast on a `tokio::sync::broadcast` channel; rendering them (toast,
/// banner, log line) is up to the subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SignedUp { confirmation_required: bool },
    SignUpFailed(AuthError),
    SignedIn,
    SignInFailed(AuthError),
    MagicLinkSent,
    PasswordResetSent,
    PasswordResetFailed(AuthError),
    SignedOut { reason: ExitReason },
    /// The session was torn down after an unauthorized response.
    SessionExpired,
    /// The redirect sign-in returned with an error marker.
    CallbackFailed {
        error: String,
        description: Option<String>,
    },
}

impl Notice {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::SignUpFailed(_)
                | Self::SignInFailed(_)
                | Self::PasswordResetFailed(_)
                | Self::CallbackFailed { .. }
        )
    }

    /// The error kind carried by a failure notice.
    pub fn error(&self) -> Option<&AuthError> {
        match self {
            Self::SignUpFailed(e) | Self::SignInFailed(e) | Self::PasswordResetFailed(e) => Some(e),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::SignedUp {
                confirmation_required: true,
            } => "Account created. Check your email to confirm it.".into(),
            Self::SignedUp {
                confirmation_required: false,
            } => "Account created. You're signed in.".into(),
            Self::SignedIn => "Signed in.".into(),
            Self::MagicLinkSent => "Check your email for a sign-in link.".into(),
            Self::PasswordResetSent => {
                "Check your email for a password reset link.".into()
            }
            Self::SignedOut {
                reason: ExitReason::Idle,
            } => "You were signed out after a period of inactivity.".into(),
            Self::SignedOut { .. } => "Signed out.".into(),
            Self::SessionExpired => {
                AuthError::Unauthorized.user_message().to_string()
            }
            Self::SignUpFailed(e) | Self::SignInFailed(e) | Self::PasswordResetFailed(e) => {
                e.user_message().to_string()
            }
            Self::CallbackFailed {
                description: Some(description),
                ..
            } => format!("Sign-in was not completed: {description}"),
            Self::CallbackFailed { error, .. } => {
                format!("Sign-in was not completed ({error}).")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_uses_error_kind() {
        let notice = Notice::SignUpFailed(AuthError::AlreadyRegistered);

        assert!(notice.is_failure());
        assert_eq!(notice.message(), AuthError::AlreadyRegistered.user_message());
        assert_eq!(notice.error(), Some(&AuthError::AlreadyRegistered));
    }

    #[test]
    fn test_callback_failed_prefers_description() {
        let notice = Notice::CallbackFailed {
            error: "access_denied".into(),
            description: Some("User denied consent".into()),
        };
        assert!(notice.message().contains("User denied consent"));

        let bare = Notice::CallbackFailed {
            error: "access_denied".into(),
            description: None,
        };
        assert!(bare.message().contains("access_denied"));
    }

    #[test]
    fn test_idle_sign_out_message_differs() {
        let idle = Notice::SignedOut {
            reason: ExitReason::Idle,
        };
        let manual = Notice::SignedOut {
            reason: ExitReason::SignedOut,
        };
        assert_ne!(idle.message(), manual.message());
        assert!(!idle.is_failure());
    }
}
