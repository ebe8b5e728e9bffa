//! `Authgate` builder: wires every component into one handle.
//!
//! ```text
//! AuthgateConfig ──► CoordinatorConfig, IdleConfig, token backend
//!
//! IdentityProvider ──► SessionCoordinator ◄── UnauthorizedInterceptor ◄── AuthorizedClient
//!                            │  ▲
//!                            ▼  │ activity
//!                        idle watch
//! ```

use std::sync::Arc;

use authgate_http::{AuthorizedClient, HttpTransport};
use authgate_idle::ActivityKind;
use authgate_interceptor::UnauthorizedInterceptor;
use authgate_provider::IdentityProvider;
use authgate_session::{
    AuthState, CoordinatorBuilder, IdleHandle, Navigator, NoEnrichment,
    NoopNavigator, ProfileEnricher, SessionCoordinator,
};
use authgate_store::{FileStore, KeyValueStore, MemoryStore};
use tracing::info;

use crate::{AuthgateConfig, AuthgateError};

/// Builder for an [`Authgate`] handle.
///
/// # Example
///
/// ```rust,ignore
/// let mut auth = Authgate::builder()
///     .config(AuthgateConfig::from_env()?)
///     .navigator(Arc::new(BrowserNavigator))
///     .build(provider);
/// auth.start(&page_url).await;
/// let client = auth.client(my_transport);
/// ```
pub struct AuthgateBuilder {
    config: AuthgateConfig,
    navigator: Arc<dyn Navigator>,
    backend: Option<Arc<dyn KeyValueStore>>,
}

impl AuthgateBuilder {
    pub fn new() -> Self {
        Self {
            config: AuthgateConfig::default(),
            navigator: Arc::new(NoopNavigator),
            backend: None,
        }
    }

    pub fn config(mut self, config: AuthgateConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads the configuration from `AUTHGATE__*` environment variables.
    pub fn config_from_env(self) -> Result<Self, AuthgateError> {
        Ok(self.config(AuthgateConfig::from_env()?))
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Overrides the token backend chosen from the configuration.
    pub fn token_backend(mut self, backend: Arc<dyn KeyValueStore>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn build<P: IdentityProvider>(self, provider: P) -> Authgate<P> {
        self.build_from(Some(provider), NoEnrichment)
    }

    pub fn build_with_enricher<P, E>(self, provider: P, enricher: E) -> Authgate<P, E>
    where
        P: IdentityProvider,
        E: ProfileEnricher,
    {
        self.build_from(Some(provider), enricher)
    }

    /// Builds without an identity provider; see
    /// [`CoordinatorBuilder::build_unconfigured`].
    pub fn build_unconfigured<P: IdentityProvider>(self) -> Authgate<P> {
        self.build_from(None, NoEnrichment)
    }

    fn build_from<P, E>(self, provider: Option<P>, enricher: E) -> Authgate<P, E>
    where
        P: IdentityProvider,
        E: ProfileEnricher,
    {
        let backend: Arc<dyn KeyValueStore> = match (self.backend, &self.config.token_file) {
            (Some(backend), _) => backend,
            (None, Some(path)) => Arc::new(FileStore::new(path)),
            (None, None) => Arc::new(MemoryStore::new()),
        };
        let interceptor = UnauthorizedInterceptor::new();

        let coordinator = CoordinatorBuilder::new()
            .config(self.config.coordinator_config())
            .token_backend(backend)
            .interceptor(interceptor)
            .navigator(self.navigator)
            .build_from(provider, enricher);
        coordinator.install_unauthorized_hook();

        Authgate {
            coordinator,
            config: self.config,
            idle: None,
        }
    }
}

impl Default for AuthgateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully wired session: coordinator, unauthorized hook, token storage
/// and (once started) the idle watch.
pub struct Authgate<P, E = NoEnrichment> {
    coordinator: SessionCoordinator<P, E>,
    config: AuthgateConfig,
    idle: Option<IdleHandle>,
}

impl<P: IdentityProvider, E: ProfileEnricher> Authgate<P, E> {
    pub fn builder() -> AuthgateBuilder {
        AuthgateBuilder::new()
    }

    /// Runs startup for a page load at `page_url`, then starts the idle
    /// watch. Resolves once the auth state is known.
    pub async fn start(&mut self, page_url: &str) -> AuthState {
        self.coordinator.start(page_url).await;
        if self.idle.is_none() {
            self.idle = Some(self.coordinator.spawn_idle_watch(self.config.idle_config()));
        }
        let state = self.coordinator.state();
        info!(
            signed_in = state.is_signed_in(),
            idle_timeout_ms = self.config.idle_timeout_ms,
            "authgate started"
        );
        state
    }

    pub fn coordinator(&self) -> &SessionCoordinator<P, E> {
        &self.coordinator
    }

    pub fn config(&self) -> &AuthgateConfig {
        &self.config
    }

    /// The idle watch, once [`start`](Self::start) has run.
    pub fn idle(&self) -> Option<&IdleHandle> {
        self.idle.as_ref()
    }

    /// Reports user activity to the idle watch. Does nothing before start.
    pub fn record_activity(&self, kind: ActivityKind) {
        if let Some(idle) = &self.idle {
            idle.record(kind);
        }
    }

    /// An API client that authenticates with this session and reports 401s
    /// to its interceptor.
    pub fn client<T: HttpTransport>(&self, transport: T) -> AuthorizedClient<T, SessionCoordinator<P, E>> {
        AuthorizedClient::new(
            transport,
            self.coordinator.clone(),
            self.coordinator.interceptor().clone(),
        )
    }
}

impl<P, E> std::fmt::Debug for Authgate<P, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authgate")
            .field("coordinator", &self.coordinator)
            .field("config", &self.config)
            .field("idle", &self.idle)
            .finish()
    }
}
