//! Typed payloads exchanged with the identity provider.
//!
//! Identity providers speak loosely-shaped JSON. Every field the rest of
//! Authgate needs is given a concrete Rust type here, so nothing above
//! this crate ever pokes at a `serde_json::Value` to find a token.
//!
//! The serde attributes follow the common provider wire format
//! (`snake_case`, optional fields defaulted), so an HTTP-backed bridge can
//! deserialize responses straight into these types.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Users and sessions
// ---------------------------------------------------------------------------

/// One sign-in method linked to a provider account.
///
/// A user who signed up with a password and later connected Google has two
/// linked identities. The list matters for sign-up: a provider answers "ok"
/// with an *empty* list when the email already belongs to an account created
/// through a different method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedIdentity {
    /// Provider-side identity id.
    pub id: String,
    /// Which sign-in method this identity represents (`email`, `google`, ...).
    pub provider: String,
}

/// The user record attached to a provider session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderUser {
    /// Opaque, stable user id.
    pub id: String,

    /// Primary email address, if the account has one.
    #[serde(default)]
    pub email: Option<String>,

    /// Linked sign-in methods.
    ///
    /// `None` means the provider didn't report identities at all, which is
    /// different from `Some(vec![])` (see [`LinkedIdentity`]).
    #[serde(default)]
    pub identities: Option<Vec<LinkedIdentity>>,

    /// Free-form metadata the provider stores alongside the user.
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl ProviderUser {
    /// Creates a user with just an id and email.
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            email,
            identities: None,
            user_metadata: serde_json::Value::Null,
        }
    }

    /// Returns `true` when the provider explicitly reported zero linked
    /// identities.
    pub fn has_no_linked_identities(&self) -> bool {
        matches!(&self.identities, Some(list) if list.is_empty())
    }
}

/// A raw session as the provider reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSession {
    /// Bearer token for API calls. May be empty on malformed payloads.
    pub access_token: String,

    /// Token used by the provider to mint a new access token.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Unix timestamp (seconds) when `access_token` expires.
    #[serde(default)]
    pub expires_at: Option<i64>,

    /// The signed-in user.
    pub user: ProviderUser,
}

impl ProviderSession {
    /// Returns the access token if it is usable (non-blank).
    pub fn usable_token(&self) -> Option<&str> {
        let token = self.access_token.trim();
        if token.is_empty() { None } else { Some(token) }
    }
}

// ---------------------------------------------------------------------------
// Change events
// ---------------------------------------------------------------------------

/// Why the provider pushed a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeKind {
    /// Sent by some providers right after subscribing, carrying whatever
    /// session exists. Handled like any other event.
    InitialSession,
    SignedIn,
    SignedOut,
    /// The provider silently refreshed the access token.
    TokenRefreshed,
    UserUpdated,
    /// The user followed a password-recovery link.
    PasswordRecovery,
}

impl fmt::Display for AuthChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InitialSession => "INITIAL_SESSION",
            Self::SignedIn => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
            Self::UserUpdated => "USER_UPDATED",
            Self::PasswordRecovery => "PASSWORD_RECOVERY",
        };
        f.write_str(name)
    }
}

/// A session-change notification pushed by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderEvent {
    pub kind: AuthChangeKind,
    /// The session after the change; `None` when signed out.
    pub session: Option<ProviderSession>,
}

impl ProviderEvent {
    pub fn new(kind: AuthChangeKind, session: Option<ProviderSession>) -> Self {
        Self { kind, session }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Email + password sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCredentials {
    pub email: String,
    pub password: String,
    /// Anti-automation challenge token, when the provider requires one.
    #[serde(default)]
    pub captcha_token: Option<String>,
}

/// Account creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub captcha_token: Option<String>,
    /// Where the confirmation email should send the user back to.
    #[serde(default)]
    pub email_redirect_to: Option<String>,
}

/// What the provider answered to a sign-up.
///
/// `session` is `None` when the provider requires email confirmation first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpResponse {
    #[serde(default)]
    pub user: Option<ProviderUser>,
    #[serde(default)]
    pub session: Option<ProviderSession>,
}

/// Passwordless "magic link" sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRequest {
    pub email: String,
    #[serde(default)]
    pub captcha_token: Option<String>,
    #[serde(default)]
    pub email_redirect_to: Option<String>,
    /// Whether an unknown email should get a fresh account.
    pub should_create_user: bool,
}

/// Password-reset email request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
    #[serde(default)]
    pub captcha_token: Option<String>,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// Third-party sign-in providers supported by the redirect flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google => f.write_str("google"),
        }
    }
}

/// Redirect-based sign-in request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthRequest {
    pub provider: OAuthProvider,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// The provider's authorization page the browser must be sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorizationUrl(pub String);

impl AuthorizationUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorizationUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
