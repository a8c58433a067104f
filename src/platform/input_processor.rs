//=========================================================================
// Input Processor
//=========================================================================
//
// Converts Winit window events into engine InputEvents and forwards them
// to the input inbox.
//
// Architecture:
//   Winit WindowEvent → InputProcessor → InputEvent → InputSender → inbox
//
// Each key event carries both identities: the physical code (`"KeyA"`)
// and the logical key (`"a"`, `"ArrowUp"`). Auto-repeat events are dropped
// since `InputState` only tracks transitions.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, trace};
use winit::{
    event::{ElementState, WindowEvent},
    keyboard::{Key, KeyCode as WinitKeyCode, NamedKey, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, InputSender, KeyCode, KeyInput};

//=== InputProcessor ======================================================

/// Feeds Winit keyboard and focus events into an engine input inbox.
#[derive(Debug, Clone)]
pub struct InputProcessor {
    sender: InputSender,
}

impl InputProcessor {
    pub fn new(sender: InputSender) -> Self {
        Self { sender }
    }

    //--- Event Processing -------------------------------------------------

    /// Translates and forwards `event`.
    ///
    /// Returns `true` if an input event was queued.
    pub fn process_window_event(&self, event: &WindowEvent) -> bool {
        let Some(input) = translate_window_event(event) else {
            return false;
        };

        trace!(target: "platform", "Forwarding {:?}", input);
        self.sender.send(input)
    }
}

//=========================================================================
// Winit Conversions
//=========================================================================

/// Engine event for a window event, if it is input the engine tracks.
pub fn translate_window_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::KeyboardInput { event, .. } => translate_key(
            event.physical_key,
            &event.logical_key,
            event.state,
            event.repeat,
        ),
        WindowEvent::Focused(false) => {
            debug!(target: "platform", "Focus lost, releasing held keys");
            Some(InputEvent::FocusLost)
        }
        _ => None,
    }
}

/// Builds a key event from the parts of a Winit `KeyEvent`.
///
/// Returns `None` for repeats and for keys with neither a mapped physical
/// code nor a logical name.
pub fn translate_key(
    physical: PhysicalKey,
    logical: &Key,
    state: ElementState,
    repeat: bool,
) -> Option<InputEvent> {
    if repeat {
        return None;
    }

    let input = KeyInput {
        logical: logical_name(logical),
        code: match physical {
            PhysicalKey::Code(code) => Some(KeyCode::from(code)),
            PhysicalKey::Unidentified(_) => None,
        },
    };

    if input.is_unidentified() {
        return None;
    }

    Some(match state {
        ElementState::Pressed => InputEvent::KeyDown(input),
        ElementState::Released => InputEvent::KeyUp(input),
    })
}

/// DOM `KeyboardEvent.key` style name for a logical key.
fn logical_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(text) => Some(text.to_string()),
        Key::Named(NamedKey::Space) => Some(" ".to_string()),
        // Winit's named keys follow the DOM key names
        Key::Named(named) => Some(format!("{:?}", named)),
        Key::Unidentified(_) | Key::Dead(_) => None,
    }
}

/// Converts Winit physical key codes to engine key codes.
///
/// Maps A-Z, 0-9, arrows, modifiers and common special keys. Everything
/// else becomes `KeyCode::Unidentified`.
impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode::*;
        match code {
            //--- Digits -------------------------------------------------------

            Digit0 => KeyCode::Digit0,
            Digit1 => KeyCode::Digit1,
            Digit2 => KeyCode::Digit2,
            Digit3 => KeyCode::Digit3,
            Digit4 => KeyCode::Digit4,
            Digit5 => KeyCode::Digit5,
            Digit6 => KeyCode::Digit6,
            Digit7 => KeyCode::Digit7,
            Digit8 => KeyCode::Digit8,
            Digit9 => KeyCode::Digit9,

            //--- Letters ------------------------------------------------------

            KeyA => KeyCode::KeyA,
            KeyB => KeyCode::KeyB,
            KeyC => KeyCode::KeyC,
            KeyD => KeyCode::KeyD,
            KeyE => KeyCode::KeyE,
            KeyF => KeyCode::KeyF,
            KeyG => KeyCode::KeyG,
            KeyH => KeyCode::KeyH,
            KeyI => KeyCode::KeyI,
            KeyJ => KeyCode::KeyJ,
            KeyK => KeyCode::KeyK,
            KeyL => KeyCode::KeyL,
            KeyM => KeyCode::KeyM,
            KeyN => KeyCode::KeyN,
            KeyO => KeyCode::KeyO,
            KeyP => KeyCode::KeyP,
            KeyQ => KeyCode::KeyQ,
            KeyR => KeyCode::KeyR,
            KeyS => KeyCode::KeyS,
            KeyT => KeyCode::KeyT,
            KeyU => KeyCode::KeyU,
            KeyV => KeyCode::KeyV,
            KeyW => KeyCode::KeyW,
            KeyX => KeyCode::KeyX,
            KeyY => KeyCode::KeyY,
            KeyZ => KeyCode::KeyZ,

            //--- Arrows -------------------------------------------------------

            ArrowUp => KeyCode::ArrowUp,
            ArrowDown => KeyCode::ArrowDown,
            ArrowLeft => KeyCode::ArrowLeft,
            ArrowRight => KeyCode::ArrowRight,

            //--- Modifiers ----------------------------------------------------

            ShiftLeft => KeyCode::ShiftLeft,
            ShiftRight => KeyCode::ShiftRight,
            ControlLeft => KeyCode::ControlLeft,
            ControlRight => KeyCode::ControlRight,
            AltLeft => KeyCode::AltLeft,
            AltRight => KeyCode::AltRight,

            //--- Special ------------------------------------------------------

            Space => KeyCode::Space,
            Enter => KeyCode::Enter,
            Escape => KeyCode::Escape,
            Tab => KeyCode::Tab,
            Backspace => KeyCode::Backspace,
            Delete => KeyCode::Delete,

            //--- Unmapped -----------------------------------------------------

            _ => KeyCode::Unidentified,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::InputState;
    use winit::keyboard::NativeKeyCode;

    fn press(code: WinitKeyCode, key: Key) -> Option<InputEvent> {
        translate_key(PhysicalKey::Code(code), &key, ElementState::Pressed, false)
    }

    #[test]
    fn key_carries_both_identities() {
        let event = press(WinitKeyCode::KeyA, Key::Character("a".into()));
        assert_eq!(event, Some(InputEvent::KeyDown(KeyInput::both("a", KeyCode::KeyA))));
    }

    #[test]
    fn named_keys_use_dom_names() {
        let arrow = press(WinitKeyCode::ArrowUp, Key::Named(NamedKey::ArrowUp));
        assert_eq!(
            arrow,
            Some(InputEvent::KeyDown(KeyInput::both("ArrowUp", KeyCode::ArrowUp)))
        );

        let space = press(WinitKeyCode::Space, Key::Named(NamedKey::Space));
        assert_eq!(space, Some(InputEvent::KeyDown(KeyInput::both(" ", KeyCode::Space))));
    }

    #[test]
    fn release_maps_to_key_up() {
        let event = translate_key(
            PhysicalKey::Code(WinitKeyCode::KeyD),
            &Key::Character("d".into()),
            ElementState::Released,
            false,
        );
        assert_eq!(event, Some(InputEvent::KeyUp(KeyInput::both("d", KeyCode::KeyD))));
    }

    #[test]
    fn repeats_are_dropped() {
        let event = translate_key(
            PhysicalKey::Code(WinitKeyCode::KeyW),
            &Key::Character("w".into()),
            ElementState::Pressed,
            true,
        );
        assert_eq!(event, None);
    }

    #[test]
    fn unmapped_code_keeps_logical_name() {
        let event = press(WinitKeyCode::F5, Key::Named(NamedKey::F5));
        assert_eq!(
            event,
            Some(InputEvent::KeyDown(KeyInput {
                logical: Some("F5".into()),
                code: Some(KeyCode::Unidentified),
            }))
        );
    }

    #[test]
    fn fully_unidentified_keys_are_dropped() {
        let event = translate_key(
            PhysicalKey::Unidentified(NativeKeyCode::Unidentified),
            &Key::Dead(None),
            ElementState::Pressed,
            false,
        );
        assert_eq!(event, None);
    }

    #[test]
    fn focus_loss_releases_keys() {
        assert_eq!(
            translate_window_event(&WindowEvent::Focused(false)),
            Some(InputEvent::FocusLost)
        );
        assert_eq!(translate_window_event(&WindowEvent::Focused(true)), None);
    }

    #[test]
    fn processor_forwards_into_inbox() {
        let mut state = InputState::new();
        let processor = InputProcessor::new(state.sender());

        assert!(processor.process_window_event(&WindowEvent::Focused(false)));
        assert!(!processor.process_window_event(&WindowEvent::Focused(true)));
        assert_eq!(state.flush(), 1);
    }

    #[test]
    fn keycode_conversion() {
        assert_eq!(KeyCode::from(WinitKeyCode::KeyZ), KeyCode::KeyZ);
        assert_eq!(KeyCode::from(WinitKeyCode::ShiftLeft), KeyCode::ShiftLeft);
        assert_eq!(KeyCode::from(WinitKeyCode::F13), KeyCode::Unidentified);
    }
}
