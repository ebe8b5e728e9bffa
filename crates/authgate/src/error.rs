//! Unified error type for Authgate.

use authgate_http::ClientError;
use authgate_provider::ProviderError;
use authgate_session::AuthError;
use authgate_store::StoreError;

/// Top-level error that wraps every crate-specific error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum AuthgateError {
    /// A sign-in family or session operation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The identity provider reported an error.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Token persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An API request failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
