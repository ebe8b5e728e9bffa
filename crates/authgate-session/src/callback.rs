//! Recognising and bounding the return leg of a redirect sign-in.
//!
//! After the identity provider redirects back, the page URL carries
//! either a success marker (`#access_token=...`, or `?code=...` for PKCE)
//! or an error marker (`error=...&error_description=...`, in the fragment
//! or the query). [`detect_callback`] reads those markers once, at load.
//!
//! If it is a callback, [`OAuthCallbackGuard`] holds the coordinator in
//! the loading state until a session is published, but never longer than
//! its bound.

use std::time::Duration;

use tokio::sync::watch;
use url::Url;

use crate::AuthState;

/// What the page URL says about the current load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackSignal {
    /// An ordinary page load.
    None,
    /// The provider redirected back with a success marker.
    Success,
    /// The provider redirected back with an error marker.
    Failed {
        error: String,
        description: Option<String>,
    },
}

impl CallbackSignal {
    pub fn is_callback(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Inspects a page URL for redirect sign-in markers.
///
/// Accepts absolute URLs and bare paths (`/welcome#access_token=...`).
/// Unparseable input is treated as an ordinary load.
pub fn detect_callback(page_url: &str) -> CallbackSignal {
    let parsed = match Url::parse(page_url) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            match Url::parse("http://localhost/").and_then(|base| base.join(page_url)) {
                Ok(url) => url,
                Err(_) => return CallbackSignal::None,
            }
        }
        Err(_) => return CallbackSignal::None,
    };

    let fragment: Vec<(String, String)> = parsed
        .fragment()
        .map(|f| {
            url::form_urlencoded::parse(f.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();
    let query: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();

    let lookup = |key: &str| {
        fragment
            .iter()
            .chain(query.iter())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    if let Some(error) = lookup("error") {
        return CallbackSignal::Failed {
            error,
            description: lookup("error_description"),
        };
    }

    let has_token = fragment.iter().any(|(k, v)| k == "access_token" && !v.is_empty());
    let has_code = query.iter().any(|(k, v)| k == "code" && !v.is_empty());
    if has_token || has_code {
        CallbackSignal::Success
    } else {
        CallbackSignal::None
    }
}

/// How a bounded callback wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Startup resolved (normally: a session was published) within the bound.
    Resolved,
    /// The bound elapsed first.
    TimedOut,
}

/// Bounds how long startup may wait on a redirect sign-in.
#[derive(Debug, Clone, Copy)]
pub struct OAuthCallbackGuard {
    bound: Duration,
}

impl OAuthCallbackGuard {
    pub const DEFAULT_BOUND: Duration = Duration::from_millis(8000);

    pub fn new(bound: Duration) -> Self {
        Self { bound }
    }

    pub fn bound(&self) -> Duration {
        self.bound
    }

    /// Waits until `state` stops loading or the bound elapses.
    pub async fn wait(&self, state: &mut watch::Receiver<AuthState>) -> CallbackOutcome {
        let resolved = async { state.wait_for(|s| !s.is_loading()).await.is_ok() };
        match tokio::time::timeout(self.bound, resolved).await {
            Ok(true) => CallbackOutcome::Resolved,
            // Sender gone: nothing will ever resolve it.
            Ok(false) | Err(_) => CallbackOutcome::TimedOut,
        }
    }
}

impl Default for OAuthCallbackGuard {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BOUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_callback_plain_load_is_none() {
        assert_eq!(detect_callback("https://app.example/dashboard"), CallbackSignal::None);
        assert_eq!(detect_callback("/"), CallbackSignal::None);
        assert_eq!(detect_callback(""), CallbackSignal::None);
    }

    #[test]
    fn test_detect_callback_token_fragment_is_success() {
        let url = "https://app.example/#access_token=abc&refresh_token=def&token_type=bearer";
        assert_eq!(detect_callback(url), CallbackSignal::Success);
    }

    #[test]
    fn test_detect_callback_relative_path_with_fragment() {
        assert_eq!(detect_callback("/welcome#access_token=abc"), CallbackSignal::Success);
    }

    #[test]
    fn test_detect_callback_pkce_code_is_success() {
        assert_eq!(
            detect_callback("https://app.example/auth/callback?code=xyz"),
            CallbackSignal::Success
        );
    }

    #[test]
    fn test_detect_callback_error_fragment_decodes_description() {
        let url = "https://app.example/#error=access_denied&error_description=User+denied+consent";
        assert_eq!(
            detect_callback(url),
            CallbackSignal::Failed {
                error: "access_denied".into(),
                description: Some("User denied consent".into()),
            }
        );
    }

    #[test]
    fn test_detect_callback_error_in_query() {
        let signal = detect_callback("/login?error=server_error");
        assert_eq!(
            signal,
            CallbackSignal::Failed {
                error: "server_error".into(),
                description: None,
            }
        );
        assert!(signal.is_callback());
    }

    #[test]
    fn test_detect_callback_empty_token_is_not_success() {
        assert_eq!(detect_callback("/#access_token="), CallbackSignal::None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_at_bound() {
        let (_tx, mut rx) = watch::channel(AuthState::initial());
        let start = tokio::time::Instant::now();

        let outcome = OAuthCallbackGuard::default().wait(&mut rx).await;

        assert_eq!(outcome, CallbackOutcome::TimedOut);
        assert_eq!(start.elapsed(), Duration::from_millis(8000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_when_resolved() {
        let (tx, mut rx) = watch::channel(AuthState::initial());
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            tx.send_modify(|s| s.is_loading = false);
            // Keep the sender alive past the guard's check.
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let outcome = OAuthCallbackGuard::default().wait(&mut rx).await;

        assert_eq!(outcome, CallbackOutcome::Resolved);
    }
}
