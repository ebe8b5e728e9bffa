//! Coordinator configuration.

use std::time::Duration;

use authgate_store::DEFAULT_TOKEN_KEY;

use crate::OAuthCallbackGuard;

/// Configuration for a [`SessionCoordinator`](crate::SessionCoordinator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Where users land after signing out or being signed out.
    pub reentry_path: String,
    /// How long startup waits on a redirect sign-in before giving up.
    pub callback_timeout: Duration,
    /// Storage key for the persisted access token.
    pub token_key: String,
    /// Return address for redirect sign-in and magic links.
    pub redirect_url: Option<String>,
    /// Return address for password reset emails.
    pub password_reset_url: Option<String>,
    /// Buffer size of the notice broadcast channel.
    pub notice_capacity: usize,
    /// How long sign-out waits on the provider after clearing locally.
    pub sign_out_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            reentry_path: "/login".to_string(),
            callback_timeout: OAuthCallbackGuard::DEFAULT_BOUND,
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            redirect_url: None,
            password_reset_url: None,
            notice_capacity: 32,
            sign_out_timeout: Duration::from_secs(5),
        }
    }
}
