//! HTTP layer for Authgate.
//!
//! Provides the [`HttpTransport`] and [`TokenSource`] traits and
//! [`AuthorizedClient`], which ties them to the session:
//!
//! - authenticated requests carry the token from
//!   [`SessionCoordinator::access_token`](authgate_session::SessionCoordinator::access_token)
//!   as a bearer credential;
//! - a 401 goes through the shared
//!   [`UnauthorizedInterceptor`](authgate_interceptor::UnauthorizedInterceptor),
//!   which signs the user out at most once per session.
//!
//! The transport itself is left to the application (a `reqwest` wrapper,
//! a test double, ...).

#![allow(async_fn_in_trait)]

mod client;
mod error;
mod request;

pub use client::{AuthorizedClient, HttpTransport, TokenSource};
pub use error::{BoxError, ClientError, TransportError};
pub use request::{AUTHORIZATION, CONTENT_TYPE, HttpRequest, HttpResponse, Method};
