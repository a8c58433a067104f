//=========================================================================
// Notification Channel
//=========================================================================
//
// User-facing failure reports.
//
// Architecture:
//   History / Scheduler ──report()──> Sender ──> Receiver ──drain()──> UI
//
// Every reported error is also written to the log, so a missing or
// dropped receiver never hides a failure.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, warn};

//=== Internal Dependencies ===============================================

use crate::core::error::{EngineError, ErrorKind};

//=== Severity ============================================================

/// How loudly a notification should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

//=== Notification ========================================================

/// A single reported failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub kind: ErrorKind,
    pub message: String,
}

//=== NotificationSender ==================================================

/// Cloneable reporting handle held by engine subsystems.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    sender: Sender<Notification>,
}

impl NotificationSender {
    /// Logs the error and forwards it to the receiver.
    ///
    /// Irreversible actions are warnings; everything else is an error.
    pub fn report(&self, target: &str, err: &EngineError) {
        let severity = match err.kind() {
            ErrorKind::IrreversibleAction => Severity::Warning,
            _ => Severity::Error,
        };

        match severity {
            Severity::Warning => warn!(target: target, "{}", err),
            Severity::Error => error!(target: target, "{}", err),
        }

        let notification = Notification {
            severity,
            kind: err.kind(),
            message: err.to_string(),
        };

        if self.sender.send(notification).is_err() {
            debug!(target: target, "Notification receiver dropped, report kept in log only");
        }
    }
}

//=== NotificationReceiver ================================================

/// Consumer side, typically polled by the editor UI between ticks.
#[derive(Debug)]
pub struct NotificationReceiver {
    receiver: Receiver<Notification>,
}

impl NotificationReceiver {
    /// Takes every pending notification in arrival order.
    pub fn drain(&self) -> Vec<Notification> {
        self.receiver.try_iter().collect()
    }

    /// Returns `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

/// Creates a connected sender/receiver pair.
pub fn notification_channel() -> (NotificationSender, NotificationReceiver) {
    let (sender, receiver) = unbounded();
    (
        NotificationSender { sender },
        NotificationReceiver { receiver },
    )
}

/// Sender whose receiver has already been dropped.
///
/// Reports still reach the log.
pub(crate) fn detached_sender() -> NotificationSender {
    notification_channel().0
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_reaches_receiver_in_order() {
        let (tx, rx) = notification_channel();

        tx.report("test", &EngineError::contract("a", "execute"));
        tx.report("test", &EngineError::IrreversibleAction { command: "b".into() });

        let drained = rx.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].kind, ErrorKind::ContractViolation);
        assert_eq!(drained[0].severity, Severity::Error);
        assert_eq!(drained[1].severity, Severity::Warning);
        assert!(rx.is_empty());
    }

    #[test]
    fn report_without_receiver_does_not_panic() {
        let tx = detached_sender();
        tx.report("test", &EngineError::UnknownExtension("ghost".into()));
    }
}
