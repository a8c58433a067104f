//=========================================================================
// Command History
//=========================================================================
//
// Linear, bounded undo/redo timeline.
//
// Architecture:
//   execute ──ok──> undo_stack (bounded, oldest evicted) ; redo cleared
//   undo    ──ok──> redo_stack
//   redo    ──ok──> undo_stack (bounded)
//
// Failure policy (nothing here is fatal):
//   - missing execute       → ContractViolation, never queued
//   - execute error/panic   → HookFailure, never queued
//   - missing undo          → IrreversibleAction, entry dropped
//   - undo error/panic      → HookFailure, entry dropped
//   - redo error/panic      → HookFailure, entry dropped
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;
use std::fmt;

use log::{debug, trace};

//=== Internal Dependencies ===============================================

use super::Command;
use crate::core::error::EngineError;
use crate::core::extension::invoke::guarded;
use crate::core::notify::{detached_sender, NotificationSender};

//=== Constants ===========================================================

/// Undo depth used when none is configured.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

//=== CommandHistory ======================================================

/// Undo and redo stacks for commands on a `T`.
///
/// Not reentrant: a command's body must not call back into the history
/// that is running it. The `&mut` receivers make that impossible in
/// safe code.
pub struct CommandHistory<T> {
    undo_stack: VecDeque<Box<dyn Command<T>>>,
    redo_stack: Vec<Box<dyn Command<T>>>,
    max_depth: usize,
    notifier: NotificationSender,
}

impl<T> CommandHistory<T> {
    //--- Construction -----------------------------------------------------

    /// Creates an empty history with the default depth of 50.
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_HISTORY_DEPTH)
    }

    /// Creates an empty history keeping at most `max_depth` undo entries.
    ///
    /// # Panics
    ///
    /// Panics if `max_depth == 0`.
    pub fn with_max_depth(max_depth: usize) -> Self {
        assert!(max_depth > 0, "History depth must be positive");
        Self {
            undo_stack: VecDeque::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth,
            notifier: detached_sender(),
        }
    }

    /// Routes failure reports to `notifier`.
    pub fn with_notifications(mut self, notifier: NotificationSender) -> Self {
        self.notifier = notifier;
        self
    }

    //--- Operations -------------------------------------------------------

    /// Runs `command` and records it.
    ///
    /// Returns `true` if the command ran and entered the history.
    pub fn execute<C>(&mut self, command: C, target: &mut T) -> bool
    where
        C: Command<T> + 'static,
    {
        self.execute_boxed(Box::new(command), target)
    }

    /// Boxed form of [`execute`](Self::execute).
    pub fn execute_boxed(&mut self, mut command: Box<dyn Command<T>>, target: &mut T) -> bool {
        if !command.has_execute() {
            self.notifier
                .report("history", &EngineError::contract(command.name(), "execute"));
            return false;
        }

        if let Err(reason) = guarded(|| command.execute(target)) {
            self.notifier
                .report("history", &EngineError::hook(command.name(), "execute", reason));
            return false;
        }

        debug!(target: "history", "Executed '{}'", command.name());
        self.push_undo(command);

        if !self.redo_stack.is_empty() {
            trace!(target: "history", "Discarding {} redo entries", self.redo_stack.len());
            self.redo_stack.clear();
        }
        true
    }

    /// Reverts the most recent command.
    ///
    /// Returns `true` if an entry was undone and moved to the redo stack.
    pub fn undo(&mut self, target: &mut T) -> bool {
        let Some(mut command) = self.undo_stack.pop_back() else {
            debug!(target: "history", "Nothing to undo");
            return false;
        };

        if !command.has_undo() {
            self.notifier.report(
                "history",
                &EngineError::IrreversibleAction {
                    command: command.name().to_string(),
                },
            );
            return false;
        }

        if let Err(reason) = guarded(|| command.undo(target)) {
            self.notifier
                .report("history", &EngineError::hook(command.name(), "undo", reason));
            return false;
        }

        debug!(target: "history", "Undid '{}'", command.name());
        self.redo_stack.push(command);
        true
    }

    /// Re-applies the most recently undone command.
    ///
    /// Returns `true` if an entry was re-executed and moved back to the
    /// undo stack. A failed redo drops the entry.
    pub fn redo(&mut self, target: &mut T) -> bool {
        let Some(mut command) = self.redo_stack.pop() else {
            debug!(target: "history", "Nothing to redo");
            return false;
        };

        if let Err(reason) = guarded(|| command.execute(target)) {
            self.notifier
                .report("history", &EngineError::hook(command.name(), "redo", reason));
            return false;
        }

        debug!(target: "history", "Redid '{}'", command.name());
        self.push_undo(command);
        true
    }

    /// Empties both stacks, e.g. when switching projects.
    pub fn clear(&mut self) {
        debug!(
            target: "history",
            "Clearing history ({} undo, {} redo)",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    //--- Queries ----------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Name of the command the next undo would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(|command| command.name())
    }

    /// Name of the command the next redo would re-apply.
    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(|command| command.name())
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    //--- Internal ---------------------------------------------------------

    fn push_undo(&mut self, command: Box<dyn Command<T>>) {
        self.undo_stack.push_back(command);
        while self.undo_stack.len() > self.max_depth {
            if let Some(evicted) = self.undo_stack.pop_front() {
                trace!(target: "history", "Evicted '{}' past depth {}", evicted.name(), self.max_depth);
            }
        }
    }
}

impl<T> Default for CommandHistory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CommandHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHistory")
            .field("undo", &self.undo_label())
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::notify::{notification_channel, Severity};
    use crate::editor::FnCommand;
    use crate::core::extension::HookResult;
    use anyhow::bail;

    #[derive(Debug, Default)]
    struct Doc {
        x: i32,
    }

    /// Sets `x`, remembering the previous value for undo.
    struct SetX {
        value: i32,
        previous: Option<i32>,
    }

    fn set_x(value: i32) -> SetX {
        SetX {
            value,
            previous: None,
        }
    }

    impl Command<Doc> for SetX {
        fn name(&self) -> &str {
            "Set x"
        }

        fn has_undo(&self) -> bool {
            true
        }

        fn execute(&mut self, doc: &mut Doc) -> HookResult {
            self.previous = Some(doc.x);
            doc.x = self.value;
            Ok(())
        }

        fn undo(&mut self, doc: &mut Doc) -> HookResult {
            if let Some(previous) = self.previous.take() {
                doc.x = previous;
            }
            Ok(())
        }
    }

    fn increment() -> FnCommand<Doc> {
        FnCommand::new("Increment")
            .on_execute(|doc: &mut Doc| {
                doc.x += 1;
                Ok(())
            })
            .on_undo(|doc: &mut Doc| {
                doc.x -= 1;
                Ok(())
            })
    }

    //=====================================================================
    // Stack Discipline
    //=====================================================================

    #[test]
    fn undoing_everything_fills_redo() {
        let mut doc = Doc::default();
        let mut history = CommandHistory::new();

        for _ in 0..50 {
            assert!(history.execute(increment(), &mut doc));
        }
        for _ in 0..50 {
            assert!(history.undo(&mut doc));
        }

        assert_eq!(history.undo_count(), 0);
        assert_eq!(history.redo_count(), 50);
        assert_eq!(doc.x, 0);
        assert!(!history.undo(&mut doc));
    }

    #[test]
    fn execute_after_undo_clears_redo() {
        let mut doc = Doc::default();
        let mut history = CommandHistory::new();

        for _ in 0..3 {
            history.execute(increment(), &mut doc);
        }
        history.undo(&mut doc);
        history.undo(&mut doc);
        assert_eq!(history.redo_count(), 2);

        history.execute(set_x(7), &mut doc);
        assert_eq!(history.redo_count(), 0);
        assert!(!history.can_redo());
        assert!(!history.redo(&mut doc));
        assert_eq!(doc.x, 7);
    }

    #[test]
    fn depth_bound_evicts_oldest_and_keeps_redo() {
        let mut doc = Doc::default();
        let mut history = CommandHistory::new();

        for _ in 0..50 {
            history.execute(increment(), &mut doc);
        }
        assert_eq!(history.undo_count(), 50);

        history.execute(set_x(100), &mut doc);
        assert_eq!(history.undo_count(), 50, "51st entry evicts the oldest");
        assert_eq!(history.undo_label(), Some("Set x"));

        for _ in 0..50 {
            assert!(history.undo(&mut doc));
        }
        assert_eq!(doc.x, 1, "Evicted entry is no longer reversible");
        assert_eq!(history.redo_count(), 50);
        assert!(!history.can_undo());
    }

    #[test]
    fn redo_respects_depth_bound() {
        let mut doc = Doc::default();
        let mut history = CommandHistory::with_max_depth(2);

        for _ in 0..3 {
            history.execute(increment(), &mut doc);
        }
        assert_eq!((doc.x, history.undo_count()), (3, 2));

        history.undo(&mut doc);
        history.undo(&mut doc);
        assert!(!history.undo(&mut doc));
        assert_eq!((doc.x, history.redo_count()), (1, 2));

        history.redo(&mut doc);
        history.redo(&mut doc);
        assert_eq!(doc.x, 3);
        assert_eq!((history.undo_count(), history.redo_count()), (2, 0));
    }

    #[test]
    fn undo_and_redo_restore_values() {
        let mut doc = Doc::default();
        let mut history = CommandHistory::new();

        history.execute(set_x(10), &mut doc);
        history.execute(set_x(20), &mut doc);

        assert!(history.undo(&mut doc));
        assert_eq!(doc.x, 10);
        assert!(history.can_redo());

        assert!(history.redo(&mut doc));
        assert_eq!(doc.x, 20);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn labels_peek_next_entries() {
        let mut doc = Doc::default();
        let mut history = CommandHistory::new();
        assert_eq!(history.undo_label(), None);

        history.execute(set_x(1), &mut doc);
        history.execute(increment(), &mut doc);
        assert_eq!(history.undo_label(), Some("Increment"));

        history.undo(&mut doc);
        assert_eq!(history.undo_label(), Some("Set x"));
        assert_eq!(history.redo_label(), Some("Increment"));
    }

    //=====================================================================
    // Failure Policy
    //=====================================================================

    #[test]
    fn command_without_execute_is_rejected() {
        let (tx, rx) = notification_channel();
        let mut doc = Doc::default();
        let mut history = CommandHistory::new().with_notifications(tx);

        let hollow = FnCommand::new("Hollow").on_undo(|_: &mut Doc| Ok(()));
        assert!(!history.execute(hollow, &mut doc));
        assert_eq!(history.undo_count(), 0);

        let reports = rx.drain();
        assert_eq!(reports[0].kind, ErrorKind::ContractViolation);
        assert!(reports[0].message.contains("Hollow"));
    }

    #[test]
    fn failed_execute_is_not_recorded_and_keeps_redo() {
        let (tx, rx) = notification_channel();
        let mut doc = Doc::default();
        let mut history = CommandHistory::new().with_notifications(tx);

        history.execute(increment(), &mut doc);
        history.undo(&mut doc);

        let broken = FnCommand::new("Broken").on_execute(|_: &mut Doc| bail!("nope"));
        assert!(!history.execute(broken, &mut doc));

        let panicky = FnCommand::new("Panicky").on_execute(|_: &mut Doc| panic!("oops"));
        assert!(!history.execute(panicky, &mut doc));

        assert_eq!(history.undo_count(), 0);
        assert_eq!(history.redo_count(), 1, "Failed executes leave redo intact");

        let kinds: Vec<_> = rx.drain().into_iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::HookFailure, ErrorKind::HookFailure]);
    }

    #[test]
    fn irreversible_entry_is_dropped_with_warning() {
        let (tx, rx) = notification_channel();
        let mut doc = Doc::default();
        let mut history = CommandHistory::new().with_notifications(tx);

        history.execute(increment(), &mut doc);
        let one_way = FnCommand::new("Publish").on_execute(|doc: &mut Doc| {
            doc.x = 99;
            Ok(())
        });
        history.execute(one_way, &mut doc);

        assert!(!history.undo(&mut doc));
        assert_eq!(doc.x, 99);
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 0);

        let reports = rx.drain();
        assert_eq!(reports[0].kind, ErrorKind::IrreversibleAction);
        assert_eq!(reports[0].severity, Severity::Warning);

        // The remaining history is still usable.
        assert!(history.undo(&mut doc));
        assert_eq!(doc.x, 98);
    }

    /// A command without `undo` is irreversible, not a failed undo.
    #[test]
    fn command_without_undo_is_irreversible() {
        struct Stamp;

        impl Command<Doc> for Stamp {
            fn name(&self) -> &str {
                "Stamp"
            }

            fn execute(&mut self, doc: &mut Doc) -> HookResult {
                doc.x = 7;
                Ok(())
            }
        }

        let (tx, rx) = notification_channel();
        let mut doc = Doc::default();
        let mut history = CommandHistory::new().with_notifications(tx);

        assert!(history.execute(Stamp, &mut doc));
        assert!(!history.undo(&mut doc));
        assert_eq!(doc.x, 7);
        assert_eq!(history.undo_count(), 0);

        let reports = rx.drain();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, ErrorKind::IrreversibleAction);
    }

    #[test]
    fn failed_undo_drops_entry() {
        let mut doc = Doc::default();
        let mut history = CommandHistory::new();

        let stubborn = FnCommand::new("Stubborn")
            .on_execute(|_: &mut Doc| Ok(()))
            .on_undo(|_: &mut Doc| bail!("locked"));
        history.execute(stubborn, &mut doc);

        assert!(!history.undo(&mut doc));
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn failed_redo_drops_entry() {
        let (tx, rx) = notification_channel();
        let mut doc = Doc::default();
        let mut history = CommandHistory::new().with_notifications(tx);

        let mut runs = 0;
        let flaky = FnCommand::new("Flaky")
            .on_execute(move |_: &mut Doc| {
                runs += 1;
                if runs > 1 {
                    bail!("second run fails");
                }
                Ok(())
            })
            .on_undo(|_: &mut Doc| Ok(()));

        history.execute(flaky, &mut doc);
        history.undo(&mut doc);

        assert!(!history.redo(&mut doc));
        assert!(!history.can_redo());
        assert!(!history.can_undo());
        assert!(rx.drain()[0].message.contains("second run fails"));
    }

    #[test]
    fn clear_empties_both_stacks() {
        let mut doc = Doc::default();
        let mut history = CommandHistory::new();

        history.execute(increment(), &mut doc);
        history.execute(increment(), &mut doc);
        history.undo(&mut doc);
        history.clear();

        assert_eq!((history.undo_count(), history.redo_count()), (0, 0));
    }

    #[test]
    #[should_panic(expected = "History depth must be positive")]
    fn zero_depth_panics() {
        let _ = CommandHistory::<Doc>::with_max_depth(0);
    }
}
