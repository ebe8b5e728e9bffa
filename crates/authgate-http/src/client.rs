//! `AuthorizedClient`: attaches the session's token and reports 401s.

use authgate_interceptor::UnauthorizedInterceptor;
use authgate_provider::IdentityProvider;
use authgate_session::{AuthError, ProfileEnricher, SessionCoordinator};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::request::AUTHORIZATION;
use crate::{ClientError, HttpRequest, HttpResponse};

/// Sends requests to the API server.
pub trait HttpTransport: Send + Sync + 'static {
    /// The error type for failed sends.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends one request and waits for its response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error>;
}

/// Supplies the access token for outgoing requests.
pub trait TokenSource: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the current token, or `None` when nobody is signed in.
    async fn access_token(&self) -> Result<Option<String>, Self::Error>;
}

impl<P: IdentityProvider, E: ProfileEnricher> TokenSource for SessionCoordinator<P, E> {
    type Error = AuthError;

    async fn access_token(&self) -> Result<Option<String>, AuthError> {
        SessionCoordinator::access_token(self).await
    }
}

/// HTTP client for authenticated API calls.
///
/// Every non-public request carries `Authorization: Bearer <token>`, with
/// the token looked up fresh from the [`TokenSource`] per request. A 401
/// is reported to the [`UnauthorizedInterceptor`] (unless the request
/// opted out) and returned to the caller as [`ClientError::Unauthorized`].
pub struct AuthorizedClient<T, S> {
    transport: T,
    tokens: S,
    interceptor: UnauthorizedInterceptor,
}

impl<T: HttpTransport, S: TokenSource> AuthorizedClient<T, S> {
    pub fn new(transport: T, tokens: S, interceptor: UnauthorizedInterceptor) -> Self {
        Self {
            transport,
            tokens,
            interceptor,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn interceptor(&self) -> &UnauthorizedInterceptor {
        &self.interceptor
    }

    /// Sends a request. Only 2xx responses are returned as `Ok`.
    pub async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ClientError> {
        if !request.is_public() {
            let token = self
                .tokens
                .access_token()
                .await
                .map_err(|e| ClientError::Token(Box::new(e)))?;
            let Some(token) = token else {
                debug!(method = %request.method, path = %request.path, "no session for authenticated request");
                return Err(ClientError::NotAuthenticated);
            };
            request.set_header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let method = request.method;
        let path = request.path.clone();
        let intercept = request.intercept();

        let response = self.transport.send(request).await.map_err(|e| {
            warn!(%method, %path, error = %e, "request failed");
            ClientError::Transport(Box::new(e))
        })?;

        if response.is_unauthorized() {
            let outcome = self.interceptor.on_unauthorized(intercept);
            debug!(%method, %path, ?outcome, "unauthorized response");
            return Err(ClientError::Unauthorized);
        }
        if !response.is_success() {
            debug!(%method, %path, status = response.status, "request rejected");
            return Err(ClientError::Status {
                status: response.status,
                body: response.text(),
            });
        }
        Ok(response)
    }

    /// GETs `path` and decodes the JSON response.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ClientError> {
        let response = self.send(HttpRequest::get(path)).await?;
        Ok(response.json()?)
    }

    /// POSTs `body` as JSON to `path` and decodes the JSON response.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(HttpRequest::post(path).json(body)?).await?;
        Ok(response.json()?)
    }
}

impl<T, S> std::fmt::Debug for AuthorizedClient<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedClient")
            .field("interceptor", &self.interceptor)
            .finish_non_exhaustive()
    }
}
