//! Best-effort profile enrichment.
//!
//! A session is usable the moment the provider hands it over. Looking up
//! the user's display name (usually a profile API call) happens afterwards
//! in the background, and the result is dropped if the session ended in
//! the meantime.

use std::future::Future;

use crate::{Identity, Session};

/// Why an enrichment lookup produced nothing. Logged, never surfaced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("profile lookup failed: {0}")]
pub struct EnrichError(pub String);

/// Looks up extra profile data for a freshly established session.
///
/// # Example
///
/// ```rust
/// use authgate_session::{EnrichError, Identity, ProfileEnricher, Session};
///
/// /// Uses the part of the email before the `@`.
/// struct EmailLocalPart;
///
/// impl ProfileEnricher for EmailLocalPart {
///     async fn display_name(&self, identity: &Identity, _: &Session) -> Result<Option<String>, EnrichError> {
///         Ok(identity.email.as_deref().and_then(|e| e.split('@').next()).map(str::to_owned))
///     }
/// }
/// ```
pub trait ProfileEnricher: Send + Sync + 'static {
    /// Returns the display name for `identity`, or `None` if there isn't one.
    ///
    /// `session` carries the token for authenticated profile requests.
    fn display_name(
        &self,
        identity: &Identity,
        session: &Session,
    ) -> impl Future<Output = Result<Option<String>, EnrichError>> + Send;
}

/// Skips enrichment; identities stay bare.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEnrichment;

impl ProfileEnricher for NoEnrichment {
    async fn display_name(
        &self,
        _identity: &Identity,
        _session: &Session,
    ) -> Result<Option<String>, EnrichError> {
        Ok(None)
    }
}
