//=========================================================================
// Engine Errors
//=========================================================================
//
// Failure taxonomy shared by the runtime and the editor.
//
// Nothing here is fatal to the process. Every variant describes a single
// action that failed; callers report it and carry on.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::object::ObjectId;

//=== EngineError =========================================================

/// Errors raised by the engine core.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An extension or command lacks a required operation.
    ///
    /// Detected before any side effect takes place.
    #[error("contract violation: '{subject}' does not provide `{missing}`")]
    ContractViolation {
        subject: String,
        missing: &'static str,
    },

    /// A lifecycle hook or command body returned an error or panicked.
    #[error("hook failure: `{hook}` of '{subject}' failed: {reason}")]
    HookFailure {
        subject: String,
        hook: &'static str,
        reason: String,
    },

    /// Undo was requested for a command that cannot be reversed.
    #[error("irreversible action: '{command}' cannot be undone")]
    IrreversibleAction { command: String },

    /// No definition is registered under the identifier.
    #[error("unknown extension '{0}'")]
    UnknownExtension(String),

    /// An extension definition failed validation at registration.
    #[error("invalid extension definition: {0}")]
    InvalidDefinition(String),

    /// The extension is already attached to the object.
    #[error("extension '{extension}' is already attached to object {object}")]
    AlreadyAttached { object: ObjectId, extension: String },

    /// An object with the same id already lives in the scene.
    #[error("object {0} already exists in the scene")]
    DuplicateObject(ObjectId),

    /// No object with the id lives in the scene.
    #[error("object {0} does not exist in the scene")]
    UnknownObject(ObjectId),
}

impl EngineError {
    /// Short machine-friendly name of the variant, used in notifications.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ContractViolation { .. } => ErrorKind::ContractViolation,
            Self::HookFailure { .. } => ErrorKind::HookFailure,
            Self::IrreversibleAction { .. } => ErrorKind::IrreversibleAction,
            Self::UnknownExtension(_)
            | Self::InvalidDefinition(_)
            | Self::AlreadyAttached { .. }
            | Self::DuplicateObject(_)
            | Self::UnknownObject(_) => ErrorKind::Model,
        }
    }

    pub(crate) fn contract(subject: impl Into<String>, missing: &'static str) -> Self {
        Self::ContractViolation {
            subject: subject.into(),
            missing,
        }
    }

    pub(crate) fn hook(
        subject: impl Into<String>,
        hook: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::HookFailure {
            subject: subject.into(),
            hook,
            reason: reason.into(),
        }
    }
}

//=== ErrorKind ===========================================================

/// Coarse classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ContractViolation,
    HookFailure,
    IrreversibleAction,
    Model,
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_subject_and_operation() {
        let err = EngineError::contract("rotator", "execute");
        assert_eq!(
            err.to_string(),
            "contract violation: 'rotator' does not provide `execute`"
        );
        assert_eq!(err.kind(), ErrorKind::ContractViolation);
    }

    #[test]
    fn model_errors_share_a_kind() {
        assert_eq!(EngineError::UnknownObject(ObjectId(3)).kind(), ErrorKind::Model);
        assert_eq!(
            EngineError::UnknownExtension("x".into()).kind(),
            ErrorKind::Model
        );
    }
}
