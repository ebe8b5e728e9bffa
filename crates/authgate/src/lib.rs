//! # Authgate
//!
//! Session and authorization lifecycle coordination for client
//! applications backed by a hosted identity provider.
//!
//! Authgate keeps one published answer to "who is signed in, with what
//! token" consistent across startup, redirect sign-in, token refresh,
//! unauthorized API responses and idle timeouts. Applications plug in an
//! [`IdentityProvider`](provider::IdentityProvider), a
//! [`Navigator`](session::Navigator) and an HTTP transport; Authgate
//! handles the rest.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use authgate::prelude::*;
//!
//! // let mut auth = Authgate::builder()
//! //     .config_from_env()?
//! //     .build(my_provider);
//! // auth.start(&page_url).await;
//! // auth.coordinator().sign_in("ada@example.com", "pw", None).await?;
//! // let orders: Vec<Order> = auth.client(my_transport).get_json("/api/orders").await?;
//! ```
//!
//! ## Crates
//!
//! | Module | Crate |
//! |---|---|
//! | [`provider`] | `authgate-provider` |
//! | [`store`] | `authgate-store` |
//! | [`interceptor`] | `authgate-interceptor` |
//! | [`idle`] | `authgate-idle` |
//! | [`session`] | `authgate-session` |
//! | [`http`] | `authgate-http` |

mod app;
mod config;
mod error;
pub mod telemetry;

pub use app::{Authgate, AuthgateBuilder};
pub use config::AuthgateConfig;
pub use error::AuthgateError;

pub use authgate_http as http;
pub use authgate_idle as idle;
pub use authgate_interceptor as interceptor;
pub use authgate_provider as provider;
pub use authgate_session as session;
pub use authgate_store as store;

pub mod prelude {
    pub use crate::{Authgate, AuthgateBuilder, AuthgateConfig, AuthgateError};
    pub use authgate_http::{
        AuthorizedClient, ClientError, HttpRequest, HttpResponse, HttpTransport,
        TokenSource,
    };
    pub use authgate_idle::ActivityKind;
    pub use authgate_interceptor::{Intercept, UnauthorizedInterceptor};
    pub use authgate_provider::IdentityProvider;
    pub use authgate_session::{
        AuthError, AuthPhase, AuthState, Destination, ExitReason, Identity,
        Navigator, Notice, ProfileEnricher, SessionCoordinator, SignUpOutcome,
    };
}
