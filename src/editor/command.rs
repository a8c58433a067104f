//=========================================================================
// Commands
//=========================================================================
//
// Reversible edit operations.
//
// A command mutates its target directly and must be able to reverse
// exactly what it did. The history never snapshots state, so an `undo`
// that is not the precise inverse of `execute` corrupts the timeline.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use anyhow::anyhow;

//=== Internal Dependencies ===============================================

use crate::core::extension::HookResult;

//=== Command =============================================================

/// An undoable operation on a `T`.
///
/// Commands are irreversible unless they opt in: implementors that provide
/// [`undo`](Self::undo) also override [`has_undo`](Self::has_undo) to
/// return `true`. Undoing an irreversible command is reported and drops
/// the entry.
pub trait Command<T> {
    /// Human-readable label, shown in menus and reports.
    fn name(&self) -> &str;

    /// Whether the command provides an `execute` operation.
    fn has_execute(&self) -> bool {
        true
    }

    /// Whether the command provides an `undo` operation.
    fn has_undo(&self) -> bool {
        false
    }

    fn execute(&mut self, target: &mut T) -> HookResult;

    fn undo(&mut self, _target: &mut T) -> HookResult {
        Err(anyhow!("'{}' cannot be undone", self.name()))
    }
}

//=== FnCommand ===========================================================

type Step<T> = Box<dyn FnMut(&mut T) -> HookResult>;

/// Command assembled from closures.
///
/// Either operation may be left out; the history checks for presence
/// before calling.
///
/// # Examples
///
/// ```
/// use tessera_engine::editor::{CommandHistory, FnCommand};
///
/// let mut total = 0;
/// let mut history = CommandHistory::new();
///
/// history.execute(
///     FnCommand::new("Add 5")
///         .on_execute(|n: &mut i32| { *n += 5; Ok(()) })
///         .on_undo(|n: &mut i32| { *n -= 5; Ok(()) }),
///     &mut total,
/// );
/// assert_eq!(total, 5);
///
/// history.undo(&mut total);
/// assert_eq!(total, 0);
/// ```
pub struct FnCommand<T> {
    name: String,
    execute: Option<Step<T>>,
    undo: Option<Step<T>>,
}

impl<T> FnCommand<T> {
    /// Creates a command with neither operation set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            execute: None,
            undo: None,
        }
    }

    pub fn on_execute<F>(mut self, step: F) -> Self
    where
        F: FnMut(&mut T) -> HookResult + 'static,
    {
        self.execute = Some(Box::new(step));
        self
    }

    pub fn on_undo<F>(mut self, step: F) -> Self
    where
        F: FnMut(&mut T) -> HookResult + 'static,
    {
        self.undo = Some(Box::new(step));
        self
    }
}

impl<T> Command<T> for FnCommand<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_execute(&self) -> bool {
        self.execute.is_some()
    }

    fn has_undo(&self) -> bool {
        self.undo.is_some()
    }

    fn execute(&mut self, target: &mut T) -> HookResult {
        match self.execute.as_mut() {
            Some(step) => step(target),
            None => Err(anyhow!("'{}' has no execute operation", self.name)),
        }
    }

    fn undo(&mut self, target: &mut T) -> HookResult {
        match self.undo.as_mut() {
            Some(step) => step(target),
            None => Err(anyhow!("'{}' cannot be undone", self.name)),
        }
    }
}

impl<T> fmt::Debug for FnCommand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand")
            .field("name", &self.name)
            .field("execute", &self.execute.is_some())
            .field("undo", &self.undo.is_some())
            .finish()
    }
}
