//=========================================================================
// Guarded Invocation
//=========================================================================
//
// Runs user-supplied hook and command bodies so that neither an `Err`
// nor a panic escapes into the engine.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

//=== Internal Dependencies ===============================================

use super::HookResult;

//=== guarded() ===========================================================

/// Runs `body`, turning an error or a panic into a failure reason.
///
/// Mutable state touched by a panicking body may be left half-written;
/// callers isolate the failing instance instead of rolling back.
pub fn guarded<F>(body: F) -> Result<(), String>
where
    F: FnOnce() -> HookResult,
{
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(format!("{:#}", err)),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

/// Extracts the message of a panic payload, when it carries one.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "<non-string panic payload>"
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
