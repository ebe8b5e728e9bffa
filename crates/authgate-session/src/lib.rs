//! Session and authorization lifecycle coordination for Authgate.
//!
//! [`SessionCoordinator`] is the single writer of [`AuthState`]: who is
//! signed in, with what session, and whether startup is still resolving.
//! Everything else reads snapshots and reacts to changes.
//!
//! # Architecture
//!
//! ```text
//! UI / API callers
//!     │ sign_in, sign_up, sign_out, access_token      ▲ AuthState (watch)
//!     ▼                                               │ Notice (broadcast)
//! SessionCoordinator ─── ProfileEnricher (background, discardable)
//!     │        │
//!     │        └── OAuthCallbackGuard (bounded wait on redirect sign-in)
//!     ▼
//! IdentityProvider (authgate-provider) ─── TokenStore (authgate-store)
//! ```
//!
//! The coordinator also owns the reaction to unauthorized responses
//! ([`SessionCoordinator::install_unauthorized_hook`]) and, optionally,
//! an idle sign-out watch ([`SessionCoordinator::spawn_idle_watch`]).

mod callback;
mod config;
mod coordinator;
mod enrich;
mod error;
mod idle;
mod navigator;
mod notice;
mod state;

pub use callback::{CallbackOutcome, CallbackSignal, OAuthCallbackGuard, detect_callback};
pub use config::CoordinatorConfig;
pub use coordinator::{CoordinatorBuilder, SessionCoordinator, SignUpOutcome};
pub use enrich::{EnrichError, NoEnrichment, ProfileEnricher};
pub use error::{AuthError, ErrorKind};
pub use idle::IdleHandle;
pub use navigator::{Destination, ExitReason, Navigator, NoopNavigator, ReentryTarget};
pub use notice::Notice;
pub use state::{AuthPhase, AuthState, Enrichment, Identity, Session};
