//=========================================================================
// Input Event Types
//
// Defines the engine-side representation of low-level keyboard events.
//
// This module abstracts away platform-specific input (e.g. Winit, a DOM
// bridge) into a unified format consumed by `InputState`.
//
// Responsibilities:
// - Name physical keys with stable, layout-independent codes
// - Carry the logical key name alongside the physical code
// - Represent focus loss so held keys can be released in bulk
//
// Event Flow:
// ```text
// Platform Layer (Winit)
//         ↓
//    InputEvent (this module)
//         ↓
//    InputSender ──inbox──> InputState (flushed once per tick)
//         ↓
//    Extensions (is_key_just_pressed, axis, ...)
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fmt;
use std::str::FromStr;

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
/// `KeyA` is always the same physical key regardless of keyboard layout
/// (QWERTY vs AZERTY). Names follow the DOM `KeyboardEvent.code` values,
/// which is how scripts refer to them (`"KeyD"`, `"ArrowUp"`, `"Space"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    /// Number row: 0-9
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    /// Letter keys: A-Z (physical location, not character)
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,

    /// Fallback for keys not explicitly mapped by the input layer.
    ///
    /// Never tracked by `InputState`.
    Unidentified,
}

impl KeyCode {
    /// Every tracked code, in declaration order.
    pub const ALL: [KeyCode; 52] = {
        use KeyCode::*;
        [
            Digit0, Digit1, Digit2, Digit3, Digit4,
            Digit5, Digit6, Digit7, Digit8, Digit9,
            KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
            KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
            KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
            ArrowDown, ArrowLeft, ArrowRight, ArrowUp,
            Space, Enter, Escape, Tab, Backspace, Delete,
            ShiftLeft, ShiftRight, ControlLeft, ControlRight, AltLeft, AltRight,
        ]
    };

    /// DOM-style code name, or `None` for [`KeyCode::Unidentified`].
    pub fn as_str(self) -> Option<&'static str> {
        use KeyCode::*;
        let name = match self {
            Digit0 => "Digit0", Digit1 => "Digit1", Digit2 => "Digit2",
            Digit3 => "Digit3", Digit4 => "Digit4", Digit5 => "Digit5",
            Digit6 => "Digit6", Digit7 => "Digit7", Digit8 => "Digit8",
            Digit9 => "Digit9",

            KeyA => "KeyA", KeyB => "KeyB", KeyC => "KeyC", KeyD => "KeyD",
            KeyE => "KeyE", KeyF => "KeyF", KeyG => "KeyG", KeyH => "KeyH",
            KeyI => "KeyI", KeyJ => "KeyJ", KeyK => "KeyK", KeyL => "KeyL",
            KeyM => "KeyM", KeyN => "KeyN", KeyO => "KeyO", KeyP => "KeyP",
            KeyQ => "KeyQ", KeyR => "KeyR", KeyS => "KeyS", KeyT => "KeyT",
            KeyU => "KeyU", KeyV => "KeyV", KeyW => "KeyW", KeyX => "KeyX",
            KeyY => "KeyY", KeyZ => "KeyZ",

            ArrowDown => "ArrowDown", ArrowLeft => "ArrowLeft",
            ArrowRight => "ArrowRight", ArrowUp => "ArrowUp",

            Space => "Space", Enter => "Enter", Escape => "Escape",
            Tab => "Tab", Backspace => "Backspace", Delete => "Delete",
            ShiftLeft => "ShiftLeft", ShiftRight => "ShiftRight",
            ControlLeft => "ControlLeft", ControlRight => "ControlRight",
            AltLeft => "AltLeft", AltRight => "AltRight",

            Unidentified => return None,
        };
        Some(name)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("Unidentified"))
    }
}

/// Error returned when a string does not name a known [`KeyCode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKeyCode(pub String);

impl fmt::Display for UnknownKeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key code '{}'", self.0)
    }
}

impl std::error::Error for UnknownKeyCode {}

impl FromStr for KeyCode {
    type Err = UnknownKeyCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == Some(s))
            .ok_or_else(|| UnknownKeyCode(s.to_string()))
    }
}

//=== KeyInput ============================================================

/// Identity of a key event: logical name and/or physical code.
///
/// Both identities are tracked independently by `InputState`, so a script
/// may ask for `"ArrowUp"`, `"a"` or `"KeyA"` and get an answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyInput {
    /// Logical key name (`KeyboardEvent.key` style: `"a"`, `"ArrowUp"`).
    pub logical: Option<String>,

    /// Physical key code.
    pub code: Option<KeyCode>,
}

impl KeyInput {
    /// Event identified only by its physical code.
    pub fn code(code: KeyCode) -> Self {
        Self {
            logical: None,
            code: Some(code),
        }
    }

    /// Event identified only by its logical name.
    pub fn logical(name: impl Into<String>) -> Self {
        Self {
            logical: Some(name.into()),
            code: None,
        }
    }

    /// Event carrying both identities.
    pub fn both(name: impl Into<String>, code: KeyCode) -> Self {
        Self {
            logical: Some(name.into()),
            code: Some(code),
        }
    }

    /// Iterates every name this event should be tracked under.
    ///
    /// Empty logical names and unidentified codes are skipped.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        let logical = self.logical.as_deref().filter(|name| !name.is_empty());
        let code: Option<&str> = self.code.and_then(KeyCode::as_str);
        logical.into_iter().chain(code)
    }

    /// Returns `true` if the event carries no trackable identity.
    pub fn is_unidentified(&self) -> bool {
        self.names().next().is_none()
    }
}

//=== InputEvent ==========================================================

/// Low-level input event from the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Key pressed down.
    KeyDown(KeyInput),

    /// Key released.
    KeyUp(KeyInput),

    /// The window lost focus; every held key is considered released.
    FocusLost,

    /// Unrecognized or unsupported event, ignored by the input system.
    Unidentified,
}

impl InputEvent {
    /// Convenience constructor for a press carrying only a physical code.
    pub fn key_down(code: KeyCode) -> Self {
        Self::KeyDown(KeyInput::code(code))
    }

    /// Convenience constructor for a release carrying only a physical code.
    pub fn key_up(code: KeyCode) -> Self {
        Self::KeyUp(KeyInput::code(code))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    //=====================================================================
    // KeyCode Tests
    //=====================================================================

    #[test]
    fn code_names_follow_dom_convention() {
        assert_eq!(KeyCode::KeyD.as_str(), Some("KeyD"));
        assert_eq!(KeyCode::ArrowUp.as_str(), Some("ArrowUp"));
        assert_eq!(KeyCode::Digit7.as_str(), Some("Digit7"));
        assert_eq!(KeyCode::Unidentified.as_str(), None);
    }

    #[test]
    fn every_listed_code_parses_back() {
        for code in KeyCode::ALL {
            let name = code.as_str().expect("listed codes are named");
            assert_eq!(name.parse::<KeyCode>(), Ok(code));
        }
    }

    #[test]
    fn unknown_code_fails_to_parse() {
        let err = "F13".parse::<KeyCode>().unwrap_err();
        assert_eq!(err, UnknownKeyCode("F13".into()));
    }

    //=====================================================================
    // KeyInput Tests
    //=====================================================================

    #[test]
    fn names_yield_logical_then_code() {
        let input = KeyInput::both("d", KeyCode::KeyD);
        let names: Vec<_> = input.names().collect();
        assert_eq!(names, vec!["d", "KeyD"]);
    }

    #[test]
    fn unidentified_inputs_have_no_names() {
        assert!(KeyInput::code(KeyCode::Unidentified).is_unidentified());
        assert!(KeyInput::logical("").is_unidentified());
        assert!(KeyInput::default().is_unidentified());
        assert!(!KeyInput::logical("Enter").is_unidentified());
    }
}
