//! Where the user is sent after the session ends or a redirect sign-in begins.

use std::fmt;

use tracing::debug;

/// Why the user is being returned to the re-entry page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    /// The user asked to sign out.
    SignedOut,
    /// A request came back unauthorized and the session was torn down.
    SessionExpired,
    /// The inactivity window elapsed.
    Idle,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignedOut => "signed_out",
            Self::SessionExpired => "session_expired",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The re-entry page plus an optional marker explaining the exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReentryTarget {
    pub path: String,
    pub reason: Option<ExitReason>,
}

impl ReentryTarget {
    /// Renders `path?reason=...`, or just `path` when there is no reason.
    pub fn href(&self) -> String {
        match self.reason {
            Some(reason) => {
                let sep = if self.path.contains('?') { '&' } else { '?' };
                format!("{}{sep}reason={reason}", self.path)
            }
            None => self.path.clone(),
        }
    }
}

/// A navigation request issued by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Reentry(ReentryTarget),
    /// An off-site URL, e.g. the identity provider's authorization page.
    External(String),
}

/// Performs navigation on behalf of the coordinator.
///
/// In a browser this sets the location; in a desktop or terminal app it
/// switches screens or opens a URL.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, destination: Destination);
}

/// A navigator that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, destination: Destination) {
        debug!(?destination, "navigation requested (no navigator installed)");
    }
}
