//! Integration tests for `AuthorizedClient`.
//!
//! A scripted transport stands in for the API server. Most tests use a real
//! `SessionCoordinator` over the in-memory provider as the token source, so
//! a 401 travels the whole way: client, interceptor, forced sign-out.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use authgate_http::{
    AUTHORIZATION, AuthorizedClient, ClientError, HttpRequest, HttpResponse,
    HttpTransport, TokenSource, TransportError,
};
use authgate_interceptor::UnauthorizedInterceptor;
use authgate_provider::MemoryProvider;
use authgate_session::{AuthError, CoordinatorBuilder, SessionCoordinator};
use futures_util::future::join_all;
use parking_lot::Mutex;

// =========================================================================
// Helpers
// =========================================================================

const EMAIL: &str = "a@x.com";
const PASSWORD: &str = "correct-pw";

#[derive(Default)]
struct Script {
    queued: VecDeque<Result<HttpResponse, TransportError>>,
    fallback: Option<u16>,
    seen: Vec<HttpRequest>,
}

/// Answers from a queue, then with the fallback status.
#[derive(Clone, Default)]
struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    fn always(status: u16) -> Self {
        let transport = Self::default();
        transport.script.lock().fallback = Some(status);
        transport
    }

    fn push(&self, response: HttpResponse) {
        self.script.lock().queued.push_back(Ok(response));
    }

    fn push_err(&self, err: TransportError) {
        self.script.lock().queued.push_back(Err(err));
    }

    fn seen(&self) -> Vec<HttpRequest> {
        self.script.lock().seen.clone()
    }
}

impl HttpTransport for ScriptedTransport {
    type Error = TransportError;

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut script = self.script.lock();
        script.seen.push(request);
        match script.queued.pop_front() {
            Some(answer) => answer,
            None => Ok(HttpResponse::new(script.fallback.unwrap_or(200))),
        }
    }
}

/// Always returns the same token.
struct StaticToken(&'static str);

impl TokenSource for StaticToken {
    type Error = std::convert::Infallible;

    async fn access_token(&self) -> Result<Option<String>, Self::Error> {
        Ok(Some(self.0.to_string()))
    }
}

struct Fixture {
    provider: MemoryProvider,
    coordinator: SessionCoordinator<MemoryProvider>,
    transport: ScriptedTransport,
    client: AuthorizedClient<ScriptedTransport, SessionCoordinator<MemoryProvider>>,
}

async fn fixture() -> Fixture {
    let provider = MemoryProvider::new();
    provider.register(EMAIL, PASSWORD);
    let interceptor = UnauthorizedInterceptor::new();
    let coordinator = CoordinatorBuilder::new()
        .interceptor(interceptor.clone())
        .build(provider.clone());
    coordinator.install_unauthorized_hook();
    coordinator.start("/").await;

    let transport = ScriptedTransport::default();
    let client = AuthorizedClient::new(transport.clone(), coordinator.clone(), interceptor);
    Fixture {
        provider,
        coordinator,
        transport,
        client,
    }
}

async fn sign_in(f: &Fixture) {
    f.coordinator.sign_in(EMAIL, PASSWORD, None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1)).await;
}

// =========================================================================
// Credentials
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_send_attaches_current_bearer_token() {
    let f = fixture().await;
    sign_in(&f).await;
    let token = f.provider.current().unwrap().access_token;

    f.client.send(HttpRequest::get("/api/orders")).await.unwrap();

    let seen = f.transport.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].header_value(AUTHORIZATION),
        Some(format!("Bearer {token}").as_str())
    );
}

#[tokio::test(start_paused = true)]
async fn test_send_uses_refreshed_token() {
    let f = fixture().await;
    sign_in(&f).await;
    let refreshed = f.provider.refresh().unwrap().access_token;

    f.client.send(HttpRequest::get("/api/orders")).await.unwrap();

    assert_eq!(
        f.transport.seen()[0].header_value(AUTHORIZATION),
        Some(format!("Bearer {refreshed}").as_str())
    );
}

#[tokio::test(start_paused = true)]
async fn test_send_signed_out_is_not_authenticated() {
    let f = fixture().await;

    let err = f.client.send(HttpRequest::get("/api/orders")).await.unwrap_err();

    assert!(matches!(err, ClientError::NotAuthenticated));
    assert!(f.transport.seen().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_public_request_sent_without_credential() {
    let f = fixture().await;

    f.client
        .send(HttpRequest::get("/api/catalog").public())
        .await
        .unwrap();

    assert_eq!(f.transport.seen()[0].header_value(AUTHORIZATION), None);
}

#[tokio::test(start_paused = true)]
async fn test_token_lookup_failure_is_token_error() {
    let f = fixture().await;
    sign_in(&f).await;
    f.provider.set_offline(true);

    let err = f.client.send(HttpRequest::get("/api/orders")).await.unwrap_err();

    let source = match err {
        ClientError::Token(source) => source,
        other => panic!("expected a token error, got {other:?}"),
    };
    assert!(matches!(
        source.downcast_ref::<AuthError>(),
        Some(AuthError::Network(_))
    ));
    assert!(f.transport.seen().is_empty());
}

// =========================================================================
// Unauthorized responses
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_unauthorized_response_forces_sign_out() {
    let f = fixture().await;
    sign_in(&f).await;
    f.transport.push(HttpResponse::new(401));

    let err = f.client.send(HttpRequest::get("/api/orders")).await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized));
    assert!(!f.coordinator.state().is_signed_in());
    assert_eq!(f.client.interceptor().fired_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_opted_out_unauthorized_keeps_session() {
    let f = fixture().await;
    sign_in(&f).await;
    f.transport.push(HttpResponse::new(401));

    let err = f
        .client
        .send(HttpRequest::post("/api/checkout").handle_unauthorized_locally())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized));
    assert!(f.coordinator.state().is_signed_in());
    assert!(!f.client.interceptor().is_handled());
    assert_eq!(f.client.interceptor().fired_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_public_unauthorized_keeps_session() {
    let f = fixture().await;
    sign_in(&f).await;
    f.transport.push(HttpResponse::new(401));

    let err = f
        .client
        .send(HttpRequest::post("/api/newsletter").public())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized));
    assert!(f.coordinator.state().is_signed_in());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_unauthorized_fire_hook_once() {
    for n in [1usize, 5, 100] {
        let interceptor = UnauthorizedInterceptor::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        interceptor.register(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let client = AuthorizedClient::new(
            ScriptedTransport::always(401),
            StaticToken("t"),
            interceptor,
        );

        let results = join_all((0..n).map(|i| client.send(HttpRequest::get(format!("/api/{i}"))))).await;

        assert!(
            results
                .iter()
                .all(|r| matches!(r, Err(ClientError::Unauthorized))),
            "n = {n}"
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1, "n = {n}");
        assert_eq!(client.interceptor().fired_count(), 1, "n = {n}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_unauthorized_sign_out_once() {
    let f = fixture().await;
    sign_in(&f).await;
    for _ in 0..5 {
        f.transport.push(HttpResponse::new(401));
    }

    let results = join_all((0..5).map(|_| f.client.send(HttpRequest::get("/api/orders")))).await;

    assert!(results.iter().all(Result::is_err));
    assert_eq!(f.client.interceptor().fired_count(), 1);
    assert!(!f.coordinator.state().is_signed_in());
}

#[tokio::test(start_paused = true)]
async fn test_new_session_rearms_after_unauthorized() {
    let f = fixture().await;
    sign_in(&f).await;
    f.transport.push(HttpResponse::new(401));
    let _ = f.client.send(HttpRequest::get("/api/orders")).await;
    tokio::time::sleep(Duration::from_millis(1)).await;

    sign_in(&f).await;
    f.transport.push(HttpResponse::new(401));
    let _ = f.client.send(HttpRequest::get("/api/orders")).await;

    assert_eq!(f.client.interceptor().fired_count(), 2);
    assert!(!f.coordinator.state().is_signed_in());
}

// =========================================================================
// Other outcomes
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_server_error_is_status() {
    let f = fixture().await;
    sign_in(&f).await;
    f.transport.push(HttpResponse::new(503).with_body("maintenance"));

    let err = f.client.send(HttpRequest::get("/api/orders")).await.unwrap_err();

    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected a status error, got {other:?}"),
    }
    assert!(f.coordinator.state().is_signed_in());
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_is_transport_error() {
    let f = fixture().await;
    sign_in(&f).await;
    f.transport.push_err(TransportError::Timeout);

    let err = f.client.send(HttpRequest::get("/api/orders")).await.unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
    assert!(f.coordinator.state().is_signed_in());
}

#[tokio::test(start_paused = true)]
async fn test_get_json_decodes_body() {
    let f = fixture().await;
    sign_in(&f).await;
    f.transport.push(
        HttpResponse::new(200)
            .with_json(&serde_json::json!({ "orders": [1, 2] }))
            .unwrap(),
    );

    let value: serde_json::Value = f.client.get_json("/api/orders").await.unwrap();

    assert_eq!(value["orders"], serde_json::json!([1, 2]));
}

#[tokio::test(start_paused = true)]
async fn test_post_json_sends_body() {
    let f = fixture().await;
    sign_in(&f).await;
    f.transport.push(
        HttpResponse::new(201)
            .with_json(&serde_json::json!({ "id": 7 }))
            .unwrap(),
    );

    let created: serde_json::Value = f
        .client
        .post_json("/api/orders", &serde_json::json!({ "sku": "A-1" }))
        .await
        .unwrap();

    assert_eq!(created["id"], 7);
    let sent = &f.transport.seen()[0];
    assert_eq!(sent.body.as_deref(), Some(br#"{"sku":"A-1"}"#.as_slice()));
}

#[tokio::test(start_paused = true)]
async fn test_undecodable_body_is_json_error() {
    let f = fixture().await;
    sign_in(&f).await;
    f.transport.push(HttpResponse::new(200).with_body("not json"));

    let err = f
        .client
        .get_json::<serde_json::Value>("/api/orders")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Json(_)));
}
