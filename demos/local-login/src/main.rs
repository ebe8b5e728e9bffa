use std::sync::Arc;
use std::time::Duration;

use authgate::http::TransportError;
use authgate::prelude::*;
use authgate::provider::MemoryProvider;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fake browser and API server
// ---------------------------------------------------------------------------

/// Prints where the app would send the user.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, destination: Destination) {
        match destination {
            Destination::Reentry(target) => println!("  -> navigate to {}", target.href()),
            Destination::External(url) => println!("  -> redirect to {url}"),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Order {
    id: u32,
    item: String,
}

/// An API server that accepts the provider's current token until revoked.
#[derive(Clone)]
struct LocalApi {
    provider: MemoryProvider,
    revoked: Arc<Mutex<bool>>,
}

impl LocalApi {
    fn revoke(&self) {
        *self.revoked.lock() = true;
    }
}

impl HttpTransport for LocalApi {
    type Error = TransportError;

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let expected = self
            .provider
            .current()
            .map(|s| format!("Bearer {}", s.access_token));
        let presented = request.header_value(authgate::http::AUTHORIZATION);
        if *self.revoked.lock() || expected.is_none() || presented != expected.as_deref() {
            return Ok(HttpResponse::new(401));
        }

        let orders = vec![Order {
            id: 1,
            item: "keyboard".into(),
        }];
        HttpResponse::new(200)
            .with_json(&orders)
            .map_err(|e| TransportError::Connect(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), AuthgateError> {
    authgate::telemetry::init_tracing();

    let provider = MemoryProvider::new();
    provider.register_oauth_only("grace@example.com");

    let mut auth = Authgate::<MemoryProvider>::builder()
        .config_from_env()?
        .navigator(Arc::new(ConsoleNavigator))
        .build(provider.clone());

    let mut notices = auth.coordinator().notices();
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            println!("  [notice] {}", notice.message());
        }
    });

    let state = auth.start("http://localhost:3000/").await;
    println!("startup resolved, signed in: {}", state.is_signed_in());

    println!("sign up with an email that already uses Google sign-in");
    if let Err(e) = auth
        .coordinator()
        .sign_up("grace@example.com", "a-long-password", None)
        .await
    {
        println!("  sign-up refused: {}", e.user_message());
    }

    println!("sign up a new account");
    auth.coordinator()
        .sign_up("ada@example.com", "a-long-password", None)
        .await?;
    auth.coordinator().sign_out().await?;

    println!("sign in with password");
    let identity = auth
        .coordinator()
        .sign_in("ada@example.com", "a-long-password", None)
        .await?;
    println!("  signed in as {}", identity.label());

    let api = LocalApi {
        provider: provider.clone(),
        revoked: Arc::new(Mutex::new(false)),
    };
    let client = auth.client(api.clone());
    let orders: Vec<Order> = client.get_json("/api/orders").await?;
    for order in &orders {
        println!("  order #{}: {}", order.id, order.item);
    }

    println!("server revokes the credential");
    api.revoke();
    let (first, second) = tokio::join!(
        client.send(HttpRequest::get("/api/orders")),
        client.send(HttpRequest::get("/api/profile")),
    );
    println!("  two requests failed: {}, {}", first.is_err(), second.is_err());
    println!(
        "  forced sign-outs: {}, signed in: {}",
        auth.coordinator().interceptor().fired_count(),
        auth.coordinator().state().is_signed_in()
    );

    // Let the notice printer catch up before exiting.
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
