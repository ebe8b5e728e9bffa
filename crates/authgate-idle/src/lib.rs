//! Inactivity deadline tracking for Authgate.
//!
//! An [`IdleMonitor`] holds a single deadline. Every user activity signal
//! pushes it `timeout` into the future; if the deadline passes,
//! [`IdleMonitor::wait_for_idle`] resolves and the caller signs the user
//! out.
//!
//! # Disabled mode
//!
//! When `timeout_ms` is 0 the monitor is disabled and `wait_for_idle`
//! pends forever. The same happens while the monitor is disarmed (nobody
//! is signed in), so it can sit in a `tokio::select!` loop unconditionally:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(kind) = activity_rx.recv() => monitor.record_activity(kind),
//!         () = monitor.wait_for_idle() => coordinator.sign_out_idle().await,
//!     }
//! }
//! ```

use std::time::Duration;

use serde::Deserialize;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, info, trace};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Idle timeout configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Inactivity window in milliseconds. 0 disables the monitor.
    pub timeout_ms: u64,
}

impl IdleConfig {
    pub fn with_timeout_ms(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }

    /// The inactivity window. Returns `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// A user interaction that counts as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PointerDown,
    KeyDown,
    Scroll,
    TouchStart,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 4] = [
        ActivityKind::PointerDown,
        ActivityKind::KeyDown,
        ActivityKind::Scroll,
        ActivityKind::TouchStart,
    ];
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::PointerDown => "pointer_down",
            Self::KeyDown => "key_down",
            Self::Scroll => "scroll",
            Self::TouchStart => "touch_start",
        })
    }
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

/// Single-deadline inactivity monitor.
///
/// One per signed-in user. Arm it when a session starts, disarm it when
/// the session ends.
#[derive(Debug)]
pub struct IdleMonitor {
    timeout: Option<Duration>,
    deadline: Option<TokioInstant>,
    armed: bool,
}

impl IdleMonitor {
    pub fn new(config: IdleConfig) -> Self {
        let timeout = config.timeout();
        match timeout {
            Some(t) => debug!(timeout_ms = t.as_millis() as u64, "idle monitor created"),
            None => debug!("idle monitor created disabled"),
        }
        Self {
            timeout,
            deadline: None,
            armed: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.timeout.is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// When the monitor will fire, if armed and enabled.
    pub fn deadline(&self) -> Option<TokioInstant> {
        self.deadline
    }

    /// Starts watching. The deadline is `timeout` from now.
    ///
    /// Idempotent: arming an armed monitor restarts the window.
    pub fn arm(&mut self) {
        self.armed = true;
        self.restart();
        trace!("idle monitor armed");
    }

    /// Stops watching. Safe to call when already disarmed.
    pub fn disarm(&mut self) {
        if self.armed {
            trace!("idle monitor disarmed");
        }
        self.armed = false;
        self.deadline = None;
    }

    /// Records user activity, pushing the deadline out by a full window.
    ///
    /// Ignored while disarmed.
    pub fn record_activity(&mut self, kind: ActivityKind) {
        if !self.armed {
            return;
        }
        trace!(%kind, "activity");
        self.restart();
    }

    /// Changes the window at runtime.
    ///
    /// 0 disables the monitor and cancels any pending deadline. A non-zero
    /// value restarts the window from now if armed.
    pub fn set_timeout_ms(&mut self, timeout_ms: u64) {
        self.timeout = IdleConfig::with_timeout_ms(timeout_ms).timeout();
        debug!(timeout_ms, "idle timeout changed");
        self.restart();
    }

    /// Resolves when the deadline passes, then disarms.
    ///
    /// Pends forever while disabled or disarmed.
    pub async fn wait_for_idle(&mut self) {
        let Some(deadline) = self.deadline.filter(|_| self.armed) else {
            std::future::pending::<()>().await;
            return;
        };

        time::sleep_until(deadline).await;

        info!(
            timeout_ms = self.timeout.map(|t| t.as_millis() as u64),
            "idle timeout reached"
        );
        self.disarm();
    }

    fn restart(&mut self) {
        self.deadline = match (self.armed, self.timeout) {
            (true, Some(t)) => Some(TokioInstant::now() + t),
            _ => None,
        };
    }
}
