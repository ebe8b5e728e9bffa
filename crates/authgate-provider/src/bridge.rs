//! The bridge trait the session coordinator talks to.
//!
//! Authgate doesn't verify credentials or mint tokens itself; that is the
//! identity provider's job (Supabase, Auth0, Keycloak, a custom service).
//! Instead it defines [`IdentityProvider`]: one narrow async method per
//! provider operation, with typed inputs and outputs. An adapter for a real
//! service implements this trait; tests use
//! [`MemoryProvider`](crate::MemoryProvider).
//!
//! # Why return `impl Future + Send`?
//!
//! The coordinator spawns some provider calls onto Tokio tasks (the
//! best-effort sign-out after a 401, for instance). A spawned future must
//! be `Send`, so the trait spells that bound out instead of using a bare
//! `async fn`.

use std::future::Future;

use tokio::sync::mpsc;

use crate::{
    AuthorizationUrl, OAuthRequest, OtpRequest, PasswordCredentials,
    PasswordResetRequest, ProviderError, ProviderEvent, ProviderSession,
    SignUpRequest, SignUpResponse,
};

/// Stream of session-change events, in the order the provider emitted them.
pub type ProviderEvents = mpsc::UnboundedReceiver<ProviderEvent>;

/// A remote identity provider.
///
/// # Trait bounds
///
/// - `Send + Sync` → the provider is shared between the coordinator, its
///   event task and any spawned sign-out tasks.
/// - `'static` → it lives as long as the coordinator does.
///
/// # Example
///
/// ```rust
/// use authgate_provider::*;
///
/// /// A provider that is never signed in and rejects everything.
/// struct Offline;
///
/// impl IdentityProvider for Offline {
///     async fn current_session(&self) -> Result<Option<ProviderSession>, ProviderError> {
///         Ok(None)
///     }
///     fn subscribe(&self) -> ProviderEvents {
///         tokio::sync::mpsc::unbounded_channel().1
///     }
///     async fn sign_in_with_password(&self, _: &PasswordCredentials) -> Result<ProviderSession, ProviderError> {
///         Err(ProviderError::Transport("offline".into()))
///     }
///     async fn sign_in_with_otp(&self, _: &OtpRequest) -> Result<(), ProviderError> {
///         Err(ProviderError::Transport("offline".into()))
///     }
///     async fn sign_in_with_oauth(&self, _: &OAuthRequest) -> Result<AuthorizationUrl, ProviderError> {
///         Err(ProviderError::Transport("offline".into()))
///     }
///     async fn sign_up(&self, _: &SignUpRequest) -> Result<SignUpResponse, ProviderError> {
///         Err(ProviderError::Transport("offline".into()))
///     }
///     async fn reset_password_for_email(&self, _: &PasswordResetRequest) -> Result<(), ProviderError> {
///         Err(ProviderError::Transport("offline".into()))
///     }
///     async fn sign_out(&self) -> Result<(), ProviderError> {
///         Ok(())
///     }
/// }
/// ```
pub trait IdentityProvider: Send + Sync + 'static {
    /// Returns the provider's current session, refreshing it first if the
    /// provider does that transparently.
    ///
    /// Always a fresh query. Callers rely on this to pick up silently
    /// refreshed tokens.
    fn current_session(
        &self,
    ) -> impl Future<Output = Result<Option<ProviderSession>, ProviderError>> + Send;

    /// Subscribes to session-change events.
    ///
    /// Every event emitted after this call is delivered, in order, until the
    /// receiver is dropped.
    fn subscribe(&self) -> ProviderEvents;

    /// Signs in with email and password, returning the new session.
    fn sign_in_with_password(
        &self,
        credentials: &PasswordCredentials,
    ) -> impl Future<Output = Result<ProviderSession, ProviderError>> + Send;

    /// Sends a one-time sign-in link to the given email.
    fn sign_in_with_otp(
        &self,
        request: &OtpRequest,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Starts a redirect-based sign-in and returns where to send the browser.
    ///
    /// The session arrives later, on the return leg, through the change-event
    /// stream.
    fn sign_in_with_oauth(
        &self,
        request: &OAuthRequest,
    ) -> impl Future<Output = Result<AuthorizationUrl, ProviderError>> + Send;

    /// Creates an account.
    fn sign_up(
        &self,
        request: &SignUpRequest,
    ) -> impl Future<Output = Result<SignUpResponse, ProviderError>> + Send;

    /// Sends a password-reset email.
    fn reset_password_for_email(
        &self,
        request: &PasswordResetRequest,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Invalidates the current session on the provider side.
    fn sign_out(&self) -> impl Future<Output = Result<(), ProviderError>> + Send;
}
