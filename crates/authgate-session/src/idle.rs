//! Drives an [`IdleMonitor`] from the coordinator's state.
//!
//! The watch task arms the monitor when a session begins, disarms it when
//! the session ends, and signs out when the monitor fires. Activity and
//! timeout changes reach it through an [`IdleHandle`].

use std::sync::Arc;

use authgate_idle::{ActivityKind, IdleConfig, IdleMonitor};
use authgate_provider::IdentityProvider;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::{ExitReason, ProfileEnricher, SessionCoordinator};

/// Feeds user activity and settings to a running idle watch.
///
/// Dropping the handle stops the watch.
#[derive(Debug)]
pub struct IdleHandle {
    activity: mpsc::UnboundedSender<ActivityKind>,
    timeout_ms: watch::Sender<u64>,
}

impl IdleHandle {
    /// Reports one user interaction.
    pub fn record(&self, kind: ActivityKind) {
        let _ = self.activity.send(kind);
    }

    /// Changes the inactivity window. `0` disables the watch and cancels
    /// any pending deadline.
    pub fn set_timeout_ms(&self, timeout_ms: u64) {
        self.timeout_ms.send_replace(timeout_ms);
    }

    pub fn timeout_ms(&self) -> u64 {
        *self.timeout_ms.borrow()
    }
}

impl<P: IdentityProvider, E: ProfileEnricher> SessionCoordinator<P, E> {
    /// Starts signing the user out after `config.timeout_ms` of inactivity.
    pub fn spawn_idle_watch(&self, config: IdleConfig) -> IdleHandle {
        let (activity_tx, mut activity_rx) = mpsc::unbounded_channel();
        let (timeout_tx, mut timeout_rx) = watch::channel(config.timeout_ms);

        let mut state_rx = self.subscribe();
        let mut monitor = IdleMonitor::new(config);
        let mut generation = {
            let state = state_rx.borrow_and_update();
            if state.is_signed_in() {
                monitor.arm();
            }
            state.generation
        };
        let coordinator = Arc::downgrade(&self.inner);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = state_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let state = state_rx.borrow_and_update();
                        if !state.is_signed_in() {
                            monitor.disarm();
                        } else if state.generation != generation {
                            monitor.arm();
                        }
                        generation = state.generation;
                    }
                    kind = activity_rx.recv() => match kind {
                        Some(kind) => monitor.record_activity(kind),
                        None => break,
                    },
                    changed = timeout_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let timeout_ms = *timeout_rx.borrow_and_update();
                        monitor.set_timeout_ms(timeout_ms);
                    }
                    () = monitor.wait_for_idle() => {
                        let Some(inner) = coordinator.upgrade() else { break };
                        SessionCoordinator { inner }
                            .end_session(ExitReason::Idle)
                            .await;
                    }
                }
            }
            debug!("idle watch stopped");
        });

        IdleHandle {
            activity: activity_tx,
            timeout_ms: timeout_tx,
        }
    }
}
