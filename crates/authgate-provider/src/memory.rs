//! An in-process identity provider.
//!
//! `MemoryProvider` keeps accounts, the current session and the list of
//! event subscribers in a shared map. It behaves the way hosted providers
//! do in the cases Authgate cares about (error codes, the empty-identities
//! sign-up answer, change events after sign-in/out) and exposes knobs to
//! simulate outages and injected failures.
//!
//! Cloning is cheap and every clone shares the same state, so a test can
//! hand one clone to the coordinator and keep another to drive scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::Rng;
use tokio::sync::mpsc;

use crate::{
    AuthChangeKind, AuthorizationUrl, IdentityProvider, LinkedIdentity,
    OAuthRequest, OtpRequest, PasswordCredentials, PasswordResetRequest,
    ProviderError, ProviderEvent, ProviderEvents, ProviderSession,
    ProviderUser, SignUpRequest, SignUpResponse, codes,
};

/// Minimum password length accepted by [`MemoryProvider::sign_up`].
const MIN_PASSWORD_LEN: usize = 8;

/// Access tokens minted by the memory provider live this long (seconds).
const TOKEN_LIFETIME_SECS: i64 = 3600;

struct Account {
    user_id: String,
    /// `None` for accounts created through a redirect provider only.
    password: Option<String>,
    identities: Vec<LinkedIdentity>,
}

#[derive(Default)]
struct State {
    /// Keyed by lowercased email.
    accounts: HashMap<String, Account>,
    current: Option<ProviderSession>,
    subscribers: Vec<mpsc::UnboundedSender<ProviderEvent>>,
    offline: bool,
    fail_next: Option<ProviderError>,
    required_captcha: Option<String>,
    require_confirmation: bool,
    sent_links: Vec<String>,
    reset_requests: Vec<String>,
    session_queries: u64,
    sign_out_calls: u64,
}

impl State {
    /// Applies the outage / injected-failure knobs before an operation.
    fn gate(&mut self) -> Result<(), ProviderError> {
        if self.offline {
            return Err(ProviderError::Transport(
                "memory provider is offline".into(),
            ));
        }
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn check_captcha(&self, token: Option<&str>) -> Result<(), ProviderError> {
        match &self.required_captcha {
            Some(expected) if token != Some(expected.as_str()) => Err(
                ProviderError::api(
                    codes::CAPTCHA_FAILED,
                    400,
                    "captcha protection: request disallowed",
                ),
            ),
            _ => Ok(()),
        }
    }

    fn emit(&mut self, event: ProviderEvent) {
        // Dropped receivers are pruned as a side effect.
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn start_session(&mut self, email: &str) -> Option<ProviderSession> {
        let account = self.accounts.get(&email.to_lowercase())?;
        let session = ProviderSession {
            access_token: generate_token(),
            refresh_token: Some(generate_token()),
            expires_at: Some(unix_now() + TOKEN_LIFETIME_SECS),
            user: ProviderUser {
                id: account.user_id.clone(),
                email: Some(email.to_string()),
                identities: Some(account.identities.clone()),
                user_metadata: serde_json::Value::Null,
            },
        };
        self.current = Some(session.clone());
        self.emit(ProviderEvent::new(
            AuthChangeKind::SignedIn,
            Some(session.clone()),
        ));
        Some(session)
    }
}

/// An [`IdentityProvider`] that lives entirely in memory.
#[derive(Clone, Default)]
pub struct MemoryProvider {
    state: Arc<Mutex<State>>,
}

impl MemoryProvider {
    /// Creates a provider with no accounts and no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a password account and returns its user id.
    pub fn register(&self, email: &str, password: &str) -> String {
        let user_id = generate_user_id();
        self.state.lock().accounts.insert(
            email.to_lowercase(),
            Account {
                user_id: user_id.clone(),
                password: Some(password.to_string()),
                identities: vec![LinkedIdentity {
                    id: generate_user_id(),
                    provider: "email".into(),
                }],
            },
        );
        user_id
    }

    /// Registers an account that can only sign in through a redirect
    /// provider. Signing up with this email yields the empty-identities
    /// answer.
    pub fn register_oauth_only(&self, email: &str) -> String {
        let user_id = generate_user_id();
        self.state.lock().accounts.insert(
            email.to_lowercase(),
            Account {
                user_id: user_id.clone(),
                password: None,
                identities: vec![LinkedIdentity {
                    id: generate_user_id(),
                    provider: "google".into(),
                }],
            },
        );
        user_id
    }

    /// Completes a redirect sign-in for a registered email: creates the
    /// session and pushes a `SIGNED_IN` event, as a real provider does on
    /// the return leg.
    pub fn complete_oauth(&self, email: &str) -> Option<ProviderSession> {
        self.state.lock().start_session(email)
    }

    /// Simulates a network partition. Every call fails with a transport
    /// error while offline.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Makes the next provider call fail with `err`.
    pub fn fail_next(&self, err: ProviderError) {
        self.state.lock().fail_next = Some(err);
    }

    /// Requires this challenge token on sign-in, sign-up, magic link and
    /// password reset.
    pub fn require_captcha(&self, token: &str) {
        self.state.lock().required_captcha = Some(token.to_string());
    }

    /// When enabled, sign-up creates the account but returns no session.
    pub fn require_email_confirmation(&self, required: bool) {
        self.state.lock().require_confirmation = required;
    }

    /// Replaces the current session without emitting an event.
    ///
    /// Models state the provider restored from its own storage before the
    /// coordinator started.
    pub fn set_current(&self, session: Option<ProviderSession>) {
        self.state.lock().current = session;
    }

    /// Pushes an arbitrary event to every subscriber.
    pub fn emit(&self, event: ProviderEvent) {
        self.state.lock().emit(event);
    }

    /// Rotates the current access token and pushes `TOKEN_REFRESHED`.
    ///
    /// Returns the refreshed session, or `None` when signed out.
    pub fn refresh(&self) -> Option<ProviderSession> {
        let mut state = self.state.lock();
        let mut session = state.current.clone()?;
        session.access_token = generate_token();
        state.current = Some(session.clone());
        state.emit(ProviderEvent::new(
            AuthChangeKind::TokenRefreshed,
            Some(session.clone()),
        ));
        Some(session)
    }

    /// Returns the provider-side session, without counting a query.
    pub fn current(&self) -> Option<ProviderSession> {
        self.state.lock().current.clone()
    }

    /// How many times `current_session` was called.
    pub fn session_queries(&self) -> u64 {
        self.state.lock().session_queries
    }

    /// How many times `sign_out` was called (including failed calls).
    pub fn sign_out_calls(&self) -> u64 {
        self.state.lock().sign_out_calls
    }

    /// Emails a magic link was sent to, in order.
    pub fn sent_links(&self) -> Vec<String> {
        self.state.lock().sent_links.clone()
    }

    /// Emails a password reset was requested for, in order.
    pub fn reset_requests(&self) -> Vec<String> {
        self.state.lock().reset_requests.clone()
    }

    /// Number of live event subscribers.
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.state.lock();
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }
}

impl IdentityProvider for MemoryProvider {
    async fn current_session(
        &self,
    ) -> Result<Option<ProviderSession>, ProviderError> {
        let mut state = self.state.lock();
        state.gate()?;
        state.session_queries += 1;
        Ok(state.current.clone())
    }

    fn subscribe(&self) -> ProviderEvents {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().subscribers.push(tx);
        rx
    }

    async fn sign_in_with_password(
        &self,
        credentials: &PasswordCredentials,
    ) -> Result<ProviderSession, ProviderError> {
        let mut state = self.state.lock();
        state.gate()?;
        state.check_captcha(credentials.captcha_token.as_deref())?;

        let matches = state
            .accounts
            .get(&credentials.email.to_lowercase())
            .and_then(|account| account.password.as_deref())
            .is_some_and(|password| password == credentials.password);
        if !matches {
            return Err(ProviderError::api(
                codes::INVALID_CREDENTIALS,
                400,
                "Invalid login credentials",
            ));
        }

        state.start_session(&credentials.email).ok_or_else(|| {
            ProviderError::api(
                codes::INVALID_CREDENTIALS,
                400,
                "Invalid login credentials",
            )
        })
    }

    async fn sign_in_with_otp(
        &self,
        request: &OtpRequest,
    ) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        state.gate()?;
        state.check_captcha(request.captcha_token.as_deref())?;
        state.sent_links.push(request.email.clone());
        Ok(())
    }

    async fn sign_in_with_oauth(
        &self,
        request: &OAuthRequest,
    ) -> Result<AuthorizationUrl, ProviderError> {
        self.state.lock().gate()?;
        let mut url = format!(
            "https://memory.invalid/authorize?provider={}",
            request.provider
        );
        if let Some(redirect) = &request.redirect_to {
            url.push_str("&redirect_to=");
            url.push_str(redirect);
        }
        Ok(AuthorizationUrl(url))
    }

    async fn sign_up(
        &self,
        request: &SignUpRequest,
    ) -> Result<SignUpResponse, ProviderError> {
        let mut state = self.state.lock();
        state.gate()?;
        state.check_captcha(request.captcha_token.as_deref())?;

        if !request.email.contains('@') {
            return Err(ProviderError::api(
                codes::EMAIL_ADDRESS_INVALID,
                400,
                format!("Email address \"{}\" is invalid", request.email),
            ));
        }
        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(ProviderError::api(
                codes::WEAK_PASSWORD,
                422,
                format!(
                    "Password should be at least {MIN_PASSWORD_LEN} characters."
                ),
            ));
        }

        let key = request.email.to_lowercase();
        if let Some(existing) = state.accounts.get(&key) {
            if existing.password.is_some() {
                return Err(ProviderError::api(
                    codes::USER_ALREADY_EXISTS,
                    422,
                    "User already registered",
                ));
            }
            // Hosted providers hide account existence for other sign-in
            // methods: the call "succeeds" with zero linked identities.
            let mut user =
                ProviderUser::new(existing.user_id.clone(), Some(request.email.clone()));
            user.identities = Some(Vec::new());
            return Ok(SignUpResponse {
                user: Some(user),
                session: None,
            });
        }

        let user_id = generate_user_id();
        let identities = vec![LinkedIdentity {
            id: generate_user_id(),
            provider: "email".into(),
        }];
        state.accounts.insert(
            key,
            Account {
                user_id: user_id.clone(),
                password: Some(request.password.clone()),
                identities: identities.clone(),
            },
        );

        let mut user = ProviderUser::new(user_id, Some(request.email.clone()));
        user.identities = Some(identities);

        if state.require_confirmation {
            return Ok(SignUpResponse {
                user: Some(user),
                session: None,
            });
        }

        let session = state.start_session(&request.email);
        Ok(SignUpResponse {
            user: Some(user),
            session,
        })
    }

    async fn reset_password_for_email(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        state.gate()?;
        state.check_captcha(request.captcha_token.as_deref())?;
        state.reset_requests.push(request.email.clone());
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        state.sign_out_calls += 1;
        state.gate()?;
        if state.current.take().is_some() {
            state.emit(ProviderEvent::new(AuthChangeKind::SignedOut, None));
        }
        Ok(())
    }
}

/// Generates a random 32-character hex token (128 bits of entropy).
fn generate_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Generates a random 16-character hex id.
fn generate_user_id() -> String {
    let bytes: [u8; 8] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
