//! Busy/locked signalling towards the presentation layer
//!
//! The adapter never owns UI state. It reports two transitions per invocation
//! through a [`StatusNotifier`] handed in by the caller: the driver is busy, and
//! interactive controls should be locked. [`BusyGuard`] publishes the inverse
//! transitions when dropped, so they also happen on early returns and unwinding.

use std::sync::mpsc::Sender;
use tracing::debug;

pub trait StatusNotifier: Send + Sync {
    fn set_busy(&self, busy: bool);
    fn set_controls_locked(&self, locked: bool);
}

/// Ignores every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl StatusNotifier for NoopNotifier {
    fn set_busy(&self, _busy: bool) {}
    fn set_controls_locked(&self, _locked: bool) {}
}

/// Emits each signal as a `tracing` debug event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl StatusNotifier for TracingNotifier {
    fn set_busy(&self, busy: bool) {
        debug!(busy, "driver status");
    }

    fn set_controls_locked(&self, locked: bool) {
        debug!(locked, "interactive controls");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiSignal {
    Busy(bool),
    ControlsLocked(bool),
}

/// Forwards signals over an mpsc channel.
///
/// Sends to a receiver that has gone away are dropped; a UI that shut down must
/// not fail driver calls.
#[derive(Debug)]
pub struct ChannelNotifier {
    tx: Sender<UiSignal>,
}

impl ChannelNotifier {
    #[must_use]
    pub fn new(tx: Sender<UiSignal>) -> Self {
        Self { tx }
    }

    fn send(&self, signal: UiSignal) {
        let _ = self.tx.send(signal);
    }
}

impl StatusNotifier for ChannelNotifier {
    fn set_busy(&self, busy: bool) {
        self.send(UiSignal::Busy(busy));
    }

    fn set_controls_locked(&self, locked: bool) {
        self.send(UiSignal::ControlsLocked(locked));
    }
}

/// Scoped busy/locked state.
pub struct BusyGuard<'a> {
    notifier: &'a dyn StatusNotifier,
}

impl<'a> BusyGuard<'a> {
    pub fn new(notifier: &'a dyn StatusNotifier) -> Self {
        notifier.set_busy(true);
        notifier.set_controls_locked(true);
        Self { notifier }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.notifier.set_busy(false);
        self.notifier.set_controls_locked(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::{Arc, mpsc};

    #[test]
    fn test_guard_publishes_and_reverts_in_order() {
        let (tx, rx) = mpsc::channel();
        let notifier = ChannelNotifier::new(tx);
        {
            let _guard = BusyGuard::new(&notifier);
        }
        let signals: Vec<UiSignal> = rx.try_iter().collect();
        assert_eq!(
            signals,
            vec![
                UiSignal::Busy(true),
                UiSignal::ControlsLocked(true),
                UiSignal::Busy(false),
                UiSignal::ControlsLocked(false),
            ]
        );
    }

    #[test]
    fn test_guard_reverts_on_unwind() {
        let (tx, rx) = mpsc::channel();
        let notifier = ChannelNotifier::new(tx);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = BusyGuard::new(&notifier);
            panic!("driver call blew up");
        }));
        assert!(result.is_err());
        let signals: Vec<UiSignal> = rx.try_iter().collect();
        assert_eq!(signals.last(), Some(&UiSignal::ControlsLocked(false)));
        assert!(signals.contains(&UiSignal::Busy(false)));
    }

    #[test]
    fn test_shared_notifier_from_many_threads() {
        let (tx, rx) = mpsc::channel();
        let notifier: Arc<dyn StatusNotifier> = Arc::new(ChannelNotifier::new(tx));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let notifier = Arc::clone(&notifier);
                std::thread::spawn(move || drop(BusyGuard::new(notifier.as_ref())))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        drop(notifier);

        let signals: Vec<UiSignal> = rx.iter().collect();
        assert_eq!(signals.len(), 16);
        let raised = signals.iter().filter(|s| **s == UiSignal::Busy(true)).count();
        assert_eq!(raised, 4);
    }

    #[test]
    fn test_disconnected_receiver_is_ignored() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let notifier = ChannelNotifier::new(tx);
        let _guard = BusyGuard::new(&notifier);
    }
}
