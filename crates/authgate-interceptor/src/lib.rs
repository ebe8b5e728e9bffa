//! At-most-once handling of "unauthorized" responses.
//!
//! When a session expires server-side, every request in flight tends to
//! come back `401` at roughly the same moment. The application wants to
//! react exactly once: clear the local session, tell the user, send them
//! to the re-entry page. [`UnauthorizedInterceptor`] is the latch that
//! makes that true.
//!
//! # Epochs
//!
//! An *epoch* is the span between two successful sign-ins. The first
//! unauthorized response in an epoch claims the latch with an atomic
//! swap and fires the registered hook; every later one in the same epoch
//! is reported as [`InterceptOutcome::AlreadyHandled`]. The session
//! coordinator calls [`UnauthorizedInterceptor::reset_epoch`] whenever a
//! session is established, re-arming the latch.
//!
//! # Integration
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use authgate_interceptor::{InterceptOutcome, Intercept, UnauthorizedInterceptor};
//!
//! let interceptor = UnauthorizedInterceptor::new();
//! let calls = Arc::new(AtomicU32::new(0));
//! let seen = calls.clone();
//! interceptor.register(move || {
//!     seen.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! assert_eq!(interceptor.on_unauthorized(Intercept::Global), InterceptOutcome::Fired);
//! assert_eq!(interceptor.on_unauthorized(Intercept::Global), InterceptOutcome::AlreadyHandled);
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info};

/// The callback run on the first unauthorized response of an epoch.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Whether a given request participates in global unauthorized handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intercept {
    /// A `401` on this request may trigger the global hook.
    #[default]
    Global,
    /// The caller handles `401` itself; the latch is left untouched.
    OptOut,
}

/// What the interceptor did with one unauthorized response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptOutcome {
    /// This response claimed the epoch and the hook ran.
    Fired,
    /// Another response already claimed this epoch.
    AlreadyHandled,
    /// The request opted out of global handling.
    OptedOut,
    /// No hook is registered. The epoch is not consumed.
    NoHook,
}

struct Inner {
    handled: AtomicBool,
    hook: RwLock<Option<UnauthorizedHook>>,
    fired: AtomicU64,
}

/// Shared at-most-once latch for unauthorized responses.
///
/// Cloning is cheap and every clone observes the same latch, so one
/// interceptor can be handed to any number of HTTP clients.
#[derive(Clone)]
pub struct UnauthorizedInterceptor {
    inner: Arc<Inner>,
}

impl UnauthorizedInterceptor {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                handled: AtomicBool::new(false),
                hook: RwLock::new(None),
                fired: AtomicU64::new(0),
            }),
        }
    }

    /// Installs the hook, replacing any previous one.
    pub fn register<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.inner.hook.write() = Some(Arc::new(hook));
        debug!("unauthorized hook registered");
    }

    /// Removes the hook. Later unauthorized responses report [`InterceptOutcome::NoHook`].
    pub fn clear(&self) {
        *self.inner.hook.write() = None;
    }

    pub fn has_hook(&self) -> bool {
        self.inner.hook.read().is_some()
    }

    /// Re-arms the latch for a new epoch.
    pub fn reset_epoch(&self) {
        if self.inner.handled.swap(false, Ordering::AcqRel) {
            debug!("unauthorized latch re-armed");
        }
    }

    /// `true` once this epoch's unauthorized response has been handled.
    pub fn is_handled(&self) -> bool {
        self.inner.handled.load(Ordering::Acquire)
    }

    /// Total number of times the hook has run, across all epochs.
    pub fn fired_count(&self) -> u64 {
        self.inner.fired.load(Ordering::Relaxed)
    }

    /// Reports one unauthorized response.
    ///
    /// The check-and-set is a single atomic swap, so among any number of
    /// concurrent callers exactly one observes `false` and fires the hook.
    /// The hook runs on the caller's thread after the lock is released.
    pub fn on_unauthorized(&self, intercept: Intercept) -> InterceptOutcome {
        if intercept == Intercept::OptOut {
            return InterceptOutcome::OptedOut;
        }

        let Some(hook) = self.inner.hook.read().clone() else {
            debug!("unauthorized response with no hook registered");
            return InterceptOutcome::NoHook;
        };

        if self.inner.handled.swap(true, Ordering::AcqRel) {
            return InterceptOutcome::AlreadyHandled;
        }

        self.inner.fired.fetch_add(1, Ordering::Relaxed);
        info!("unauthorized response, running session-expired hook");
        hook();
        InterceptOutcome::Fired
    }
}

impl Default for UnauthorizedInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UnauthorizedInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnauthorizedInterceptor")
            .field("handled", &self.is_handled())
            .field("has_hook", &self.has_hook())
            .field("fired", &self.fired_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn counting() -> (UnauthorizedInterceptor, Arc<AtomicU32>) {
        let interceptor = UnauthorizedInterceptor::new();
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        interceptor.register(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (interceptor, calls)
    }

    #[test]
    fn test_on_unauthorized_first_call_fires() {
        let (interceptor, calls) = counting();

        assert_eq!(interceptor.on_unauthorized(Intercept::Global), InterceptOutcome::Fired);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(interceptor.is_handled());
    }

    #[test]
    fn test_on_unauthorized_repeat_in_epoch_is_suppressed() {
        let (interceptor, calls) = counting();

        for _ in 0..5 {
            interceptor.on_unauthorized(Intercept::Global);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(interceptor.fired_count(), 1);
    }

    #[test]
    fn test_on_unauthorized_opt_out_leaves_latch_alone() {
        let (interceptor, calls) = counting();

        assert_eq!(interceptor.on_unauthorized(Intercept::OptOut), InterceptOutcome::OptedOut);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!interceptor.is_handled());

        // A global request afterwards still fires.
        assert_eq!(interceptor.on_unauthorized(Intercept::Global), InterceptOutcome::Fired);
    }

    #[test]
    fn test_on_unauthorized_without_hook_does_not_consume_epoch() {
        let interceptor = UnauthorizedInterceptor::new();

        assert_eq!(interceptor.on_unauthorized(Intercept::Global), InterceptOutcome::NoHook);
        assert!(!interceptor.is_handled());
    }

    #[test]
    fn test_reset_epoch_rearms_latch() {
        let (interceptor, calls) = counting();
        interceptor.on_unauthorized(Intercept::Global);

        interceptor.reset_epoch();

        assert!(!interceptor.is_handled());
        assert_eq!(interceptor.on_unauthorized(Intercept::Global), InterceptOutcome::Fired);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_register_replaces_previous_hook() {
        let (interceptor, first) = counting();
        let second = Arc::new(AtomicU32::new(0));
        let seen = second.clone();
        interceptor.register(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        interceptor.on_unauthorized(Intercept::Global);

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_removes_hook() {
        let (interceptor, _) = counting();
        interceptor.clear();

        assert!(!interceptor.has_hook());
        assert_eq!(interceptor.on_unauthorized(Intercept::Global), InterceptOutcome::NoHook);
    }

    #[test]
    fn test_hook_may_reenter_interceptor() {
        // The hook reads interceptor state; no lock is held while it runs.
        let interceptor = UnauthorizedInterceptor::new();
        let probe = interceptor.clone();
        let observed = Arc::new(AtomicBool::new(false));
        let flag = observed.clone();
        interceptor.register(move || {
            flag.store(probe.is_handled() && probe.has_hook(), Ordering::SeqCst);
        });

        interceptor.on_unauthorized(Intercept::Global);

        assert!(observed.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_on_unauthorized_concurrent_fires_once() {
        for n in [1usize, 5, 100] {
            let (interceptor, calls) = counting();

            let mut handles = Vec::with_capacity(n);
            for _ in 0..n {
                let interceptor = interceptor.clone();
                handles.push(tokio::spawn(async move {
                    interceptor.on_unauthorized(Intercept::Global)
                }));
            }

            let mut fired = 0;
            for handle in handles {
                if handle.await.unwrap() == InterceptOutcome::Fired {
                    fired += 1;
                }
            }

            assert_eq!(fired, 1, "n = {n}");
            assert_eq!(calls.load(Ordering::SeqCst), 1, "n = {n}");
        }
    }
}
