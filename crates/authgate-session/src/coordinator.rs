//! `SessionCoordinator`: the single writer of [`AuthState`].
//!
//! Every event that can change who is signed in funnels through here:
//!
//! - **Startup**: restore the provider's session, or wait (bounded) for a
//!   redirect sign-in to finish.
//! - **Provider events**: consumed by one background task, in order, each
//!   handled to completion before the next.
//! - **Public operations**: the sign-in family, sign-out, token lookup.
//! - **Unauthorized responses**: the hook installed into the
//!   [`UnauthorizedInterceptor`] tears the session down once per epoch.
//!
//! ```text
//! provider events ─┐
//! sign-in family ──┼──► synchronize / clear_local ──► watch::Sender<AuthState>
//! 401 hook ────────┤                                     │
//! idle monitor ────┘                                     ▼
//!                                              subscribers (UI, idle watch)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use authgate_interceptor::UnauthorizedInterceptor;
use authgate_provider::{
    AuthorizationUrl, IdentityProvider, OAuthProvider, OAuthRequest,
    OtpRequest, PasswordCredentials, PasswordResetRequest, ProviderEvent,
    ProviderEvents, ProviderSession, ProviderUser, SignUpRequest,
};
use authgate_store::{KeyValueStore, MemoryStore, TokenStore};
use parking_lot::Mutex;
use tokio::sync::{broadcast, oneshot, watch};
use tracing::{debug, info, warn};

use crate::callback::{CallbackOutcome, CallbackSignal, OAuthCallbackGuard, detect_callback};
use crate::enrich::{EnrichError, NoEnrichment, ProfileEnricher};
use crate::error::{validate_email, validate_password};
use crate::state::SignedIn;
use crate::{
    AuthError, AuthState, CoordinatorConfig, Destination, Enrichment,
    ExitReason, Identity, Navigator, NoopNavigator, Notice, ReentryTarget,
    Session,
};

/// Result of a successful sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The provider issued a session right away.
    SignedIn(Identity),
    /// The account exists but the email must be confirmed first.
    ConfirmationRequired,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for a [`SessionCoordinator`].
///
/// # Example
///
/// ```rust,ignore
/// let coordinator = CoordinatorBuilder::new()
///     .config(CoordinatorConfig { reentry_path: "/signin".into(), ..Default::default() })
///     .token_backend(Arc::new(FileStore::new("tokens.json")))
///     .navigator(Arc::new(MyNavigator))
///     .build(provider);
/// coordinator.install_unauthorized_hook();
/// coordinator.start(&page_url).await;
/// ```
pub struct CoordinatorBuilder {
    config: CoordinatorConfig,
    backend: Arc<dyn KeyValueStore>,
    interceptor: UnauthorizedInterceptor,
    navigator: Arc<dyn Navigator>,
}

impl CoordinatorBuilder {
    /// Creates a builder with in-memory token storage and no navigator.
    pub fn new() -> Self {
        Self {
            config: CoordinatorConfig::default(),
            backend: Arc::new(MemoryStore::new()),
            interceptor: UnauthorizedInterceptor::new(),
            navigator: Arc::new(NoopNavigator),
        }
    }

    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets where the access token is persisted.
    pub fn token_backend(mut self, backend: Arc<dyn KeyValueStore>) -> Self {
        self.backend = backend;
        self
    }

    /// Shares an existing interceptor (the one the HTTP layer reports to).
    pub fn interceptor(mut self, interceptor: UnauthorizedInterceptor) -> Self {
        self.interceptor = interceptor;
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Builds a coordinator without profile enrichment.
    pub fn build<P: IdentityProvider>(self, provider: P) -> SessionCoordinator<P> {
        self.build_from(Some(provider), NoEnrichment)
    }

    pub fn build_with_enricher<P, E>(self, provider: P, enricher: E) -> SessionCoordinator<P, E>
    where
        P: IdentityProvider,
        E: ProfileEnricher,
    {
        self.build_from(Some(provider), enricher)
    }

    /// Builds a coordinator with no identity provider. Startup resolves
    /// signed out and every operation fails with [`AuthError::Configuration`].
    pub fn build_unconfigured<P: IdentityProvider>(self) -> SessionCoordinator<P> {
        self.build_from(None, NoEnrichment)
    }

    pub fn build_from<P, E>(self, provider: Option<P>, enricher: E) -> SessionCoordinator<P, E>
    where
        P: IdentityProvider,
        E: ProfileEnricher,
    {
        let (state, _) = watch::channel(AuthState::initial());
        let (notices, _) = broadcast::channel(self.config.notice_capacity.max(1));
        let tokens = TokenStore::new(self.backend, self.config.token_key.clone());

        SessionCoordinator {
            inner: Arc::new(Inner {
                provider,
                enricher,
                tokens,
                interceptor: self.interceptor,
                navigator: self.navigator,
                state,
                notices,
                config: self.config,
                started: AtomicBool::new(false),
                ended_token: Mutex::new(None),
                stop_events: Mutex::new(None),
            }),
        }
    }
}

impl Default for CoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

pub(crate) struct Inner<P, E> {
    provider: Option<P>,
    enricher: E,
    tokens: TokenStore,
    interceptor: UnauthorizedInterceptor,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<AuthState>,
    notices: broadcast::Sender<Notice>,
    config: CoordinatorConfig,
    started: AtomicBool,
    /// Access token of the last session cleared locally. Provider events
    /// still carrying it are stale and must not bring the session back.
    ended_token: Mutex<Option<String>>,
    /// Dropped together with the coordinator, which ends the event task.
    stop_events: Mutex<Option<oneshot::Sender<()>>>,
}

impl<P: IdentityProvider, E: ProfileEnricher> Inner<P, E> {
    /// Publishes a provider session. Returns the identity now signed in,
    /// or `None` if the session had no usable token.
    fn synchronize(self: &Arc<Self>, raw: ProviderSession) -> Option<Identity> {
        let Some(token) = raw.usable_token().map(str::to_owned) else {
            debug!("provider session has no usable token, treating as signed out");
            self.clear_local();
            return None;
        };
        let bare = Identity::bare(&raw.user);

        // Held until the state is published so a concurrent clear can't
        // slip between the check and the write.
        let ended = self.ended_token.lock();
        if ended.as_deref() == Some(token.as_str()) {
            debug!("ignoring provider session for an ended credential");
            return None;
        }

        // Re-arm before publishing: callers woken by the new state may
        // send authenticated requests immediately.
        self.interceptor.reset_epoch();
        self.tokens.set(&token);

        let mut started = None;
        let mut published = None;
        self.state.send_modify(|state| {
            state.is_loading = false;
            let session = Session::new(token);
            match state.signed_in.as_mut() {
                // Same user: a refresh. Keep the enriched display name.
                Some(current) if current.identity.id == bare.id => {
                    current.identity = Identity {
                        display_name: current.identity.display_name.clone(),
                        ..bare
                    };
                    current.session = session;
                    published = Some(current.identity.clone());
                }
                _ => {
                    state.generation += 1;
                    started = Some((state.generation, bare.clone(), session.clone()));
                    published = Some(bare.clone());
                    state.signed_in = Some(SignedIn {
                        identity: bare,
                        session,
                        enrichment: Enrichment::Pending,
                    });
                }
            }
        });
        drop(ended);

        match started {
            Some((generation, identity, session)) => {
                info!(user_id = %identity.id, generation, "session established");
                self.spawn_enrichment(generation, identity, session);
            }
            None => debug!("session refreshed"),
        }
        published
    }

    fn spawn_enrichment(self: &Arc<Self>, generation: u64, identity: Identity, session: Session) {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let result = inner.enricher.display_name(&identity, &session).await;
            inner.apply_enrichment(generation, result);
        });
    }

    /// Applies an enrichment result if its session is still the active one.
    fn apply_enrichment(&self, generation: u64, result: Result<Option<String>, EnrichError>) {
        let applied = self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            let Some(current) = state.signed_in.as_mut() else {
                return false;
            };
            match &result {
                Ok(Some(name)) => {
                    current.identity = current.identity.with_display_name(name.as_str());
                    current.enrichment = Enrichment::Complete;
                }
                Ok(None) | Err(_) => current.enrichment = Enrichment::Skipped,
            }
            true
        });

        match (&result, applied) {
            (_, false) => debug!(generation, "discarding enrichment for an ended session"),
            (Err(e), true) => debug!(error = %e, "profile enrichment failed, keeping bare identity"),
            (Ok(_), true) => debug!(generation, "profile enrichment applied"),
        }
    }

    /// Clears the local session and the persisted token. Returns `true` if
    /// someone was signed in.
    fn clear_local(&self) -> bool {
        self.clear_local_if(|_| true)
    }

    /// Like [`clear_local`](Self::clear_local), but only while `current`
    /// holds for the published state.
    fn clear_local_if(&self, current: impl Fn(&AuthState) -> bool) -> bool {
        let mut ended = self.ended_token.lock();
        let mut applies = false;
        let mut dropped = None;
        self.state.send_if_modified(|state| {
            applies = current(&*state);
            if !applies {
                return false;
            }
            match state.signed_in.take() {
                Some(signed_in) => {
                    state.generation += 1;
                    dropped = Some(signed_in.session);
                    true
                }
                None => false,
            }
        });
        if applies {
            self.tokens.clear();
        }
        match dropped {
            Some(session) => {
                *ended = Some(session.access_token().to_owned());
                true
            }
            None => false,
        }
    }

    /// Ends the loading phase. Only the first call has any effect.
    fn resolve_loading(&self) {
        let resolved = self
            .state
            .send_if_modified(|state| std::mem::replace(&mut state.is_loading, false));
        if resolved {
            debug!("startup resolved");
        }
    }

    fn apply_event(self: &Arc<Self>, event: ProviderEvent) {
        debug!(kind = %event.kind, "provider event");
        match event.session {
            Some(raw) => {
                self.synchronize(raw);
            }
            None => {
                if self.clear_local() {
                    info!(kind = %event.kind, "session ended by provider");
                }
            }
        }
    }

    /// The standard reaction to an unauthorized response.
    fn force_sign_out(self: &Arc<Self>) {
        info!("credential rejected, forcing sign-out");
        self.clear_local();
        self.notify(Notice::SessionExpired);

        if self.provider.is_some() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let inner = Arc::clone(self);
                    handle.spawn(async move {
                        if let Some(provider) = &inner.provider {
                            if let Err(e) = provider.sign_out().await {
                                warn!(error = %e, "provider sign-out after unauthorized response failed");
                            }
                        }
                    });
                }
                Err(_) => warn!("no async runtime, skipping provider sign-out"),
            }
        }

        self.navigate_reentry(Some(ExitReason::SessionExpired));
    }

    fn notify(&self, notice: Notice) {
        debug!(?notice, "notice");
        // No subscribers is fine.
        let _ = self.notices.send(notice);
    }

    fn navigate_reentry(&self, reason: Option<ExitReason>) {
        self.navigator.navigate(Destination::Reentry(ReentryTarget {
            path: self.config.reentry_path.clone(),
            reason,
        }));
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Owns the published [`AuthState`] and the public sign-in surface.
///
/// Cheap to clone; clones share everything.
pub struct SessionCoordinator<P, E = NoEnrichment> {
    pub(crate) inner: Arc<Inner<P, E>>,
}

impl<P, E> Clone for SessionCoordinator<P, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: IdentityProvider, E: ProfileEnricher> SessionCoordinator<P, E> {
    // -- Published state ----------------------------------------------------

    /// Snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Subscribes to user-facing notices.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    /// Waits until startup has resolved and returns that state.
    pub async fn resolved(&self) -> AuthState {
        let mut rx = self.inner.state.subscribe();
        let resolved = rx.wait_for(|s| !s.is_loading()).await.map(|s| s.clone());
        resolved.unwrap_or_else(|_| self.state())
    }

    pub fn interceptor(&self) -> &UnauthorizedInterceptor {
        &self.inner.interceptor
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn is_configured(&self) -> bool {
        self.inner.provider.is_some()
    }

    fn provider(&self) -> Result<&P, AuthError> {
        self.inner.provider.as_ref().ok_or(AuthError::Configuration)
    }

    // -- Startup ------------------------------------------------------------

    /// Runs the startup algorithm for a page load at `page_url`.
    ///
    /// Subscribes to provider events for the rest of the coordinator's
    /// life, then either restores the current session or, if the URL is a
    /// redirect sign-in callback, waits for the session up to the callback
    /// bound. Resolves once `is_loading` is `false`. Only the first call
    /// does anything.
    pub async fn start(&self, page_url: &str) {
        if self.inner.started.swap(true, Ordering::AcqRel) {
            warn!("coordinator already started");
            return;
        }

        let signal = detect_callback(page_url);
        let Some(provider) = self.inner.provider.as_ref() else {
            warn!("no identity provider configured, resolving signed out");
            self.inner.clear_local();
            self.inner.resolve_loading();
            return;
        };

        // Subscribe before querying so nothing slips in between.
        self.spawn_event_loop(provider.subscribe());

        match signal {
            CallbackSignal::None => self.restore(provider).await,
            CallbackSignal::Success => self.await_callback().await,
            CallbackSignal::Failed { error, description } => {
                warn!(%error, "redirect sign-in returned an error");
                self.inner.notify(Notice::CallbackFailed { error, description });
                self.await_callback().await;
            }
        }
    }

    /// Publishes the provider's current session. A session established
    /// while the query was in flight (a sign-in, a provider event) is newer
    /// and wins over the answer.
    async fn restore(&self, provider: &P) {
        let generation = self.inner.state.borrow().generation;
        let unchanged = |state: &AuthState| state.generation == generation;

        let result = provider.current_session().await;
        let superseded = !unchanged(&*self.inner.state.borrow());
        match result {
            Ok(_) if superseded => debug!("session changed during restore, keeping it"),
            Ok(Some(raw)) => {
                self.inner.synchronize(raw);
            }
            Ok(None) => {
                debug!("no session to restore");
                self.inner.clear_local_if(unchanged);
            }
            Err(e) => {
                warn!(error = %e, "session restore failed, starting signed out");
                self.inner.clear_local_if(unchanged);
            }
        }
        self.inner.resolve_loading();
    }

    async fn await_callback(&self) {
        let guard = OAuthCallbackGuard::new(self.inner.config.callback_timeout);
        info!(
            bound_ms = guard.bound().as_millis() as u64,
            "redirect sign-in detected, waiting for session"
        );

        let mut rx = self.inner.state.subscribe();
        if guard.wait(&mut rx).await == CallbackOutcome::TimedOut {
            warn!("redirect sign-in did not complete in time, resolving signed out");
            self.inner.clear_local();
            self.inner.resolve_loading();
        }
    }

    fn spawn_event_loop(&self, mut events: ProviderEvents) {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        *self.inner.stop_events.lock() = Some(stop_tx);
        let inner = Arc::downgrade(&self.inner);

        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    event = events.recv() => event,
                    _ = &mut stop_rx => None,
                };
                let Some(event) = event else { break };
                let Some(inner) = inner.upgrade() else { break };
                inner.apply_event(event);
            }
            debug!("provider event loop stopped");
        });
    }

    // -- Tokens -------------------------------------------------------------

    /// Returns a fresh access token for an outgoing request.
    ///
    /// Always asks the provider, which may have refreshed the token since
    /// it was last published. `Ok(None)` means nobody is signed in.
    pub async fn access_token(&self) -> Result<Option<String>, AuthError> {
        let provider = self.provider()?;
        let session = provider.current_session().await.map_err(|e| {
            debug!(error = %e, "access token lookup failed");
            AuthError::from(e)
        })?;
        Ok(session.and_then(|s| s.usable_token().map(str::to_owned)))
    }

    // -- Sign-in family -----------------------------------------------------

    /// Signs in with email and password.
    ///
    /// On success the new identity is already published when this returns.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
        captcha_token: Option<&str>,
    ) -> Result<Identity, AuthError> {
        let result = self.password_sign_in(email, password, captcha_token).await;
        match &result {
            Ok(identity) => {
                info!(user_id = %identity.id, "signed in with password");
                self.inner.notify(Notice::SignedIn);
            }
            Err(e) => {
                warn!(kind = ?e.kind(), "password sign-in failed");
                self.inner.notify(Notice::SignInFailed(e.clone()));
            }
        }
        result
    }

    async fn password_sign_in(
        &self,
        email: &str,
        password: &str,
        captcha_token: Option<&str>,
    ) -> Result<Identity, AuthError> {
        let provider = self.provider()?;
        validate_email(email)?;
        validate_password(password)?;

        let credentials = PasswordCredentials {
            email: email.trim().to_string(),
            password: password.to_string(),
            captcha_token: captcha_token.map(str::to_owned),
        };
        let raw = provider.sign_in_with_password(&credentials).await?;
        self.inner.synchronize(raw).ok_or_else(|| {
            AuthError::InvalidCredential("provider returned a session without a token".into())
        })
    }

    /// Creates an account.
    ///
    /// A provider "success" whose user has zero linked identities means the
    /// email already belongs to an account made another way; that is
    /// reported as [`AuthError::AlreadyRegistered`].
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        captcha_token: Option<&str>,
    ) -> Result<SignUpOutcome, AuthError> {
        let result = self.register(email, password, captcha_token).await;
        match &result {
            Ok(outcome) => {
                let confirmation_required = *outcome == SignUpOutcome::ConfirmationRequired;
                info!(confirmation_required, "signed up");
                self.inner.notify(Notice::SignedUp { confirmation_required });
            }
            Err(e) => {
                warn!(kind = ?e.kind(), "sign-up failed");
                self.inner.notify(Notice::SignUpFailed(e.clone()));
            }
        }
        result
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        captcha_token: Option<&str>,
    ) -> Result<SignUpOutcome, AuthError> {
        let provider = self.provider()?;
        validate_email(email)?;
        validate_password(password)?;

        let request = SignUpRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            captcha_token: captcha_token.map(str::to_owned),
            email_redirect_to: self.inner.config.redirect_url.clone(),
        };
        let response = provider.sign_up(&request).await?;

        if response
            .user
            .as_ref()
            .is_some_and(ProviderUser::has_no_linked_identities)
        {
            return Err(AuthError::AlreadyRegistered);
        }

        match response.session {
            Some(raw) => self
                .inner
                .synchronize(raw)
                .map(SignUpOutcome::SignedIn)
                .ok_or_else(|| {
                    AuthError::InvalidCredential(
                        "provider returned a session without a token".into(),
                    )
                }),
            None => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    /// Emails a one-time sign-in link.
    pub async fn sign_in_with_magic_link(
        &self,
        email: &str,
        captcha_token: Option<&str>,
    ) -> Result<(), AuthError> {
        let result = async {
            let provider = self.provider()?;
            validate_email(email)?;
            let request = OtpRequest {
                email: email.trim().to_string(),
                captcha_token: captcha_token.map(str::to_owned),
                email_redirect_to: self.inner.config.redirect_url.clone(),
                should_create_user: true,
            };
            provider.sign_in_with_otp(&request).await?;
            Ok::<(), AuthError>(())
        }
        .await;

        match &result {
            Ok(()) => {
                info!("magic link sent");
                self.inner.notify(Notice::MagicLinkSent);
            }
            Err(e) => {
                warn!(kind = ?e.kind(), "magic link request failed");
                self.inner.notify(Notice::SignInFailed(e.clone()));
            }
        }
        result
    }

    /// Starts a Google sign-in by navigating to the provider's
    /// authorization page. The session arrives on the return leg, through
    /// the provider's event stream.
    pub async fn sign_in_with_google(&self) -> Result<AuthorizationUrl, AuthError> {
        let result = async {
            let provider = self.provider()?;
            let request = OAuthRequest {
                provider: OAuthProvider::Google,
                redirect_to: self.inner.config.redirect_url.clone(),
            };
            Ok::<_, AuthError>(provider.sign_in_with_oauth(&request).await?)
        }
        .await;

        match &result {
            Ok(url) => {
                info!("redirecting to identity provider");
                self.inner.navigator.navigate(Destination::External(url.to_string()));
            }
            Err(e) => {
                warn!(kind = ?e.kind(), "redirect sign-in could not start");
                self.inner.notify(Notice::SignInFailed(e.clone()));
            }
        }
        result
    }

    /// Emails a password reset link.
    pub async fn reset_password_for_email(
        &self,
        email: &str,
        captcha_token: Option<&str>,
    ) -> Result<(), AuthError> {
        let result = async {
            let provider = self.provider()?;
            validate_email(email)?;
            let request = PasswordResetRequest {
                email: email.trim().to_string(),
                captcha_token: captcha_token.map(str::to_owned),
                redirect_to: self.inner.config.password_reset_url.clone(),
            };
            provider.reset_password_for_email(&request).await?;
            Ok::<(), AuthError>(())
        }
        .await;

        match &result {
            Ok(()) => {
                info!("password reset requested");
                self.inner.notify(Notice::PasswordResetSent);
            }
            Err(e) => {
                warn!(kind = ?e.kind(), "password reset request failed");
                self.inner.notify(Notice::PasswordResetFailed(e.clone()));
            }
        }
        result
    }

    // -- Sign-out -----------------------------------------------------------

    /// Signs out.
    ///
    /// Clears the local session and the persisted token, navigates to the
    /// re-entry page, then tells the provider. The provider call is
    /// best-effort and bounded by
    /// [`sign_out_timeout`](CoordinatorConfig::sign_out_timeout).
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider()?;
        self.end_session(ExitReason::SignedOut).await;
        Ok(())
    }

    pub(crate) async fn end_session(&self, reason: ExitReason) {
        let was_signed_in = self.inner.clear_local();
        info!(%reason, was_signed_in, "signed out");
        self.inner.notify(Notice::SignedOut { reason });

        let marker = (reason != ExitReason::SignedOut).then_some(reason);
        self.inner.navigate_reentry(marker);

        let Some(provider) = &self.inner.provider else {
            return;
        };
        let bound = self.inner.config.sign_out_timeout;
        match tokio::time::timeout(bound, provider.sign_out()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "provider sign-out failed, local session already cleared"),
            Err(_) => warn!(
                bound_ms = bound.as_millis() as u64,
                "provider sign-out timed out, local session already cleared"
            ),
        }
    }

    // -- Unauthorized handling ----------------------------------------------

    /// The standard unauthorized hook: clear the local session, tell the
    /// provider (in the background), then navigate to the re-entry page
    /// with a "session expired" marker.
    ///
    /// Holds only a weak reference, so installing it doesn't keep the
    /// coordinator alive.
    pub fn unauthorized_hook(&self) -> impl Fn() + Send + Sync + 'static {
        let inner = Arc::downgrade(&self.inner);
        move || {
            if let Some(inner) = inner.upgrade() {
                inner.force_sign_out();
            }
        }
    }

    /// Installs [`unauthorized_hook`](Self::unauthorized_hook) into this
    /// coordinator's interceptor.
    pub fn install_unauthorized_hook(&self) {
        self.inner.interceptor.register(self.unauthorized_hook());
    }
}

impl<P, E> std::fmt::Debug for SessionCoordinator<P, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("state", &*self.inner.state.borrow())
            .field("configured", &self.inner.provider.is_some())
            .finish()
    }
}
