//! Identity-provider bridge for Authgate.
//!
//! This crate is the only place that knows what an identity provider's
//! payloads look like:
//!
//! - **Types** ([`ProviderSession`], [`ProviderUser`], [`ProviderEvent`],
//!   request structs): the fully-typed shapes of everything the provider
//!   sends or receives.
//! - **Bridge** ([`IdentityProvider`] trait): the narrow async interface
//!   the session coordinator calls.
//! - **Errors** ([`ProviderError`]): what the provider reported, with its
//!   machine-readable code preserved so the layer above can classify it.
//!
//! # Architecture
//!
//! ```text
//! Session layer (above)  ← maps ProviderError codes into AuthError kinds
//!     ↕
//! Provider bridge (this crate)  ← typed payloads, no HTTP details leak up
//!     ↕
//! Remote identity service (external)
//! ```
//!
//! # Feature Flags
//!
//! - `memory`: [`MemoryProvider`], an in-process provider with accounts,
//!   sessions and a change-event stream. Used by tests and the demo.

mod bridge;
mod error;
#[cfg(feature = "memory")]
mod memory;
mod types;

pub use bridge::{IdentityProvider, ProviderEvents};
pub use error::{ProviderError, codes};
#[cfg(feature = "memory")]
pub use memory::MemoryProvider;
pub use types::{
    AuthChangeKind, AuthorizationUrl, LinkedIdentity, OAuthProvider,
    OAuthRequest, OtpRequest, PasswordCredentials, PasswordResetRequest,
    ProviderEvent, ProviderSession, ProviderUser, SignUpRequest,
    SignUpResponse,
};
