//=========================================================================
// Extension Instances
//=========================================================================
//
// Per-object attachment of an extension and its lifecycle phase.
//
// Lifecycle:
//   Pending ──on_created──> Live ──on_destroyed──> Destroyed
//
// `on_created` fires exactly once before any `on_update`. After
// `on_destroyed` the instance is inert.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use serde::{Deserialize, Serialize};

//=== ExtensionId =========================================================

/// String identifier an extension is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionId(String);

impl ExtensionId {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ExtensionId {
    fn from(identifier: &str) -> Self {
        Self(identifier.to_string())
    }
}

impl From<String> for ExtensionId {
    fn from(identifier: String) -> Self {
        Self(identifier)
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//=== LifecyclePhase ======================================================

/// Where an instance is in its runtime lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecyclePhase {
    /// Attached, `on_created` not yet fired.
    #[default]
    Pending,

    /// `on_created` has fired; receives updates and contacts.
    Live,

    /// `on_destroyed` has fired; never invoked again.
    Destroyed,
}

//=== ExtensionInstance ===================================================

/// One extension attached to one object.
///
/// The instance's private state is not stored here; it lives in the
/// scheduler's `InternalStore`, keyed by `(ObjectId, ExtensionId)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionInstance {
    extension: ExtensionId,
    pub(crate) phase: LifecyclePhase,

    /// Tick during which a hook of this instance last failed.
    ///
    /// The instance is skipped for the remainder of that tick only.
    pub(crate) faulted_tick: Option<u64>,
}

impl ExtensionInstance {
    /// Creates a pending instance.
    pub fn new(extension: ExtensionId) -> Self {
        Self {
            extension,
            phase: LifecyclePhase::Pending,
            faulted_tick: None,
        }
    }

    pub fn extension(&self) -> &ExtensionId {
        &self.extension
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Live and not faulted during `tick`.
    pub(crate) fn is_active(&self, tick: u64) -> bool {
        self.phase == LifecyclePhase::Live && self.faulted_tick != Some(tick)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_instances_are_pending() {
        let inst = ExtensionInstance::new(ExtensionId::from("spin"));
        assert_eq!(inst.phase(), LifecyclePhase::Pending);
        assert!(!inst.is_active(1));
    }

    #[test]
    fn faults_only_silence_their_tick() {
        let mut inst = ExtensionInstance::new(ExtensionId::from("spin"));
        inst.phase = LifecyclePhase::Live;
        inst.faulted_tick = Some(4);

        assert!(!inst.is_active(4));
        assert!(inst.is_active(5));
    }
}
