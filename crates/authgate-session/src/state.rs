//! The published authentication state.
//!
//! [`AuthState`] is what the rest of the application reads to decide what
//! to render. It has exactly one writer, the
//! [`SessionCoordinator`](crate::SessionCoordinator), and is handed out as
//! cheap snapshots through a `tokio::sync::watch` channel.
//!
//! The signed-in half is stored as one `Option<SignedIn>`, so an identity
//! without a session (or the reverse) is unrepresentable.

use authgate_provider::ProviderUser;
use serde::Serialize;

/// Who is signed in.
///
/// Never patched field by field: enrichment produces a new `Identity` that
/// replaces the old one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl Identity {
    /// The identity derivable from a provider user, before enrichment.
    pub fn bare(user: &ProviderUser) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            display_name: None,
        }
    }

    /// Returns a copy carrying `name` as the display name.
    pub fn with_display_name(&self, name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
            ..self.clone()
        }
    }

    /// Best label for UI: display name, then email, then id.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

/// A usable session. Short-lived: call
/// [`SessionCoordinator::access_token`](crate::SessionCoordinator::access_token)
/// for live requests instead of reading this.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Progress of the display-name lookup for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Enrichment {
    Pending,
    Complete,
    /// The lookup failed or had nothing to add. The bare identity stays.
    Skipped,
}

/// Coarse state-machine position, derived from an [`AuthState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "enrichment")]
pub enum AuthPhase {
    /// Startup hasn't resolved yet. No identity does not mean signed out.
    Unresolved,
    SignedOut,
    SignedIn(Enrichment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SignedIn {
    pub(crate) identity: Identity,
    pub(crate) session: Session,
    pub(crate) enrichment: Enrichment,
}

/// Snapshot of the authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub(crate) signed_in: Option<SignedIn>,
    pub(crate) is_loading: bool,
    /// Bumped whenever a different session begins or the session ends.
    /// Background work captures it to detect that it went stale.
    pub(crate) generation: u64,
}

impl AuthState {
    /// The state at process start: loading, nobody known.
    pub(crate) fn initial() -> Self {
        Self {
            signed_in: None,
            is_loading: true,
            generation: 0,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.signed_in.as_ref().map(|s| &s.identity)
    }

    pub fn session(&self) -> Option<&Session> {
        self.signed_in.as_ref().map(|s| &s.session)
    }

    /// `true` until startup resolves. Never becomes `true` again.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in.is_some()
    }

    pub fn enrichment(&self) -> Option<Enrichment> {
        self.signed_in.as_ref().map(|s| s.enrichment)
    }

    pub fn phase(&self) -> AuthPhase {
        match (&self.signed_in, self.is_loading) {
            (Some(s), _) => AuthPhase::SignedIn(s.enrichment),
            (None, true) => AuthPhase::Unresolved,
            (None, false) => AuthPhase::SignedOut,
        }
    }
}
