//=========================================================================
// Input State
//=========================================================================
//
// Level + edge keyboard tracking with a per-tick flush.
//
// Architecture:
//   hardware callback ──send()──> inbox (crossbeam, bounded)
//                                   ↓  drained by flush()
//   handle(event) ──────────────> held (level set, updated on apply)
//                                   ↓
//                          pending_pressed / pending_released
//                                   ↓  published by flush()
//                          frame_pressed / frame_released → queries
//
// Frame lifecycle: events → flush() (start of advance) → queries
//
// Edges accumulate between ticks and are observed on exactly one tick,
// the one following the transition. Several press/release pairs in one
// gap collapse to at most one observed edge of each kind.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{HashMap, HashSet};
use std::fmt;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, trace, warn};

//=== Internal Dependencies ===============================================

use super::event::{InputEvent, KeyCode, KeyInput};

//=== Constants ===========================================================

/// Default capacity of the input inbox.
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

//=== MovementAxis ========================================================

/// Digital movement direction derived from arrows and WASD.
///
/// `x` grows to the right, `y` grows downward (screen space). Each
/// component is one of `-1`, `0` or `1`; diagonals are not normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovementAxis {
    pub x: i8,
    pub y: i8,
}

//=== InputSender =========================================================

/// Cloneable handle used by hardware callbacks to queue input events.
///
/// Events sent here are applied at the next [`InputState::flush`].
#[derive(Debug, Clone)]
pub struct InputSender {
    sender: Sender<InputEvent>,
}

impl InputSender {
    /// Queues an event for the next tick.
    ///
    /// Returns `false` if the event was dropped because the inbox is full
    /// or the input state no longer exists.
    pub fn send(&self, event: InputEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(target: "input", "Input inbox full, dropping {:?}", event);
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!(target: "input", "Input state dropped, event discarded");
                false
            }
        }
    }
}

//=== InputState ==========================================================

/// Keyboard state shared by every extension during a tick.
pub struct InputState {
    //--- Persistent State (survives frame boundary) ----------------------
    held: HashSet<String>,
    /// Held physical codes and the logical name each one went down with.
    codes: HashMap<KeyCode, Option<String>>,
    /// Logical names held by events that carried no physical code.
    loose: HashSet<String>,
    /// Number of holders (codes or loose presses) per logical name.
    logical_refs: HashMap<String, usize>,

    //--- Accumulated Edges (between ticks) -------------------------------
    pending_pressed: HashSet<String>,
    pending_released: HashSet<String>,

    //--- Published Edges (reset each flush) ------------------------------
    frame_pressed: HashSet<String>,
    frame_released: HashSet<String>,

    //--- Inbox ------------------------------------------------------------
    inbox: Receiver<InputEvent>,
    sender: Sender<InputEvent>,
}

impl InputState {
    /// Creates an empty state with the default inbox capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INBOX_CAPACITY)
    }

    /// Creates an empty state whose inbox holds at most `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "Input inbox capacity must be positive");
        let (sender, inbox) = bounded(capacity);
        Self {
            held: HashSet::new(),
            codes: HashMap::new(),
            loose: HashSet::new(),
            logical_refs: HashMap::new(),
            pending_pressed: HashSet::new(),
            pending_released: HashSet::new(),
            frame_pressed: HashSet::new(),
            frame_released: HashSet::new(),
            inbox,
            sender,
        }
    }

    /// Returns a handle that queues events into this state's inbox.
    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
        }
    }

    //--- Event Processing -------------------------------------------------

    /// Applies an event immediately.
    ///
    /// The level set changes right away; the edge it produces becomes
    /// visible at the next [`flush`](Self::flush).
    pub fn handle(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(input) => self.press(input),
            InputEvent::KeyUp(input) => self.release(input),
            InputEvent::FocusLost => self.release_all(),
            InputEvent::Unidentified => {
                // Ignore unrecognized events
            }
        }
    }

    /// Drains the inbox and publishes the edges accumulated since the
    /// previous flush.
    ///
    /// Called exactly once at the start of every tick by the scheduler.
    /// Returns the number of inbox events applied.
    pub fn flush(&mut self) -> usize {
        let queued: Vec<InputEvent> = self.inbox.try_iter().collect();
        for event in &queued {
            self.handle(event);
        }

        self.frame_pressed = std::mem::take(&mut self.pending_pressed);
        self.frame_released = std::mem::take(&mut self.pending_released);

        if !self.frame_pressed.is_empty() || !self.frame_released.is_empty() {
            trace!(target: "input", "Flushed edges: {:?}", self);
        }

        queued.len()
    }

    /// Forgets every held key and edge, including queued inbox events.
    pub fn reset(&mut self) {
        let dropped = self.inbox.try_iter().count();
        if dropped > 0 {
            debug!(target: "input", "Reset discarded {} queued events", dropped);
        }
        self.held.clear();
        self.codes.clear();
        self.loose.clear();
        self.logical_refs.clear();
        self.pending_pressed.clear();
        self.pending_released.clear();
        self.frame_pressed.clear();
        self.frame_released.clear();
    }

    //--- Internal Helpers -------------------------------------------------

    fn press(&mut self, input: &KeyInput) {
        let logical = logical_name(input);

        let Some((code, code_name)) = tracked_code(input) else {
            if let Some(name) = logical {
                if self.loose.insert(name.to_string()) {
                    self.acquire(name);
                }
            }
            return;
        };

        // Only an up → down transition produces an edge
        if self.codes.contains_key(&code) {
            return;
        }
        self.codes.insert(code, logical.map(str::to_string));
        self.held.insert(code_name.to_string());
        self.pending_pressed.insert(code_name.to_string());

        if let Some(name) = logical {
            self.acquire(name);
        }
    }

    fn release(&mut self, input: &KeyInput) {
        let Some((code, code_name)) = tracked_code(input) else {
            if let Some(name) = logical_name(input) {
                if self.loose.remove(name) {
                    self.relinquish(name);
                }
            }
            return;
        };

        // Spurious releases of keys never pressed are ignored
        let Some(recorded) = self.codes.remove(&code) else {
            return;
        };
        self.held.remove(code_name);
        self.pending_released.insert(code_name.to_string());

        // The name recorded at press is released, whatever the event says now
        if let Some(name) = recorded {
            self.relinquish(&name);
        }
    }

    fn release_all(&mut self) {
        self.codes.clear();
        self.loose.clear();
        self.logical_refs.clear();
        for name in self.held.drain() {
            self.pending_released.insert(name);
        }
    }

    /// Adds a holder of a logical name; the first one makes it held.
    fn acquire(&mut self, name: &str) {
        let count = self.logical_refs.entry(name.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 && self.held.insert(name.to_string()) {
            self.pending_pressed.insert(name.to_string());
        }
    }

    /// Drops a holder of a logical name; the last one releases it.
    fn relinquish(&mut self, name: &str) {
        let Some(count) = self.logical_refs.get_mut(name) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.logical_refs.remove(name);
            if self.held.remove(name) {
                self.pending_released.insert(name.to_string());
            }
        }
    }

    //=====================================================================
    // Query API - Keys
    //=====================================================================

    /// Returns `true` while the key is held.
    ///
    /// `key` may be a logical name (`"ArrowUp"`, `"a"`) or a physical code
    /// (`"KeyD"`).
    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.held.contains(key)
    }

    /// Returns `true` on the single tick following an up → down transition.
    pub fn is_key_just_pressed(&self, key: &str) -> bool {
        self.frame_pressed.contains(key)
    }

    /// Returns `true` on the single tick following a down → up transition.
    pub fn is_key_just_released(&self, key: &str) -> bool {
        self.frame_released.contains(key)
    }

    /// Like [`is_key_pressed`](Self::is_key_pressed) for a physical code.
    pub fn is_code_pressed(&self, code: KeyCode) -> bool {
        code.as_str().is_some_and(|name| self.is_key_pressed(name))
    }

    /// Returns every held key name, sorted.
    pub fn pressed_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.held.iter().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    //=====================================================================
    // Query API - Axes
    //=====================================================================

    /// Digital axis from two keys: `held(positive) - held(negative)`.
    ///
    /// Yields `0` when both or neither are held.
    pub fn axis(&self, negative: &str, positive: &str) -> i8 {
        i8::from(self.is_key_pressed(positive)) - i8::from(self.is_key_pressed(negative))
    }

    /// Movement direction from the arrow keys and WASD codes.
    pub fn movement_axis(&self) -> MovementAxis {
        let any = |names: [&str; 2]| names.iter().any(|name| self.is_key_pressed(name));

        let left = any(["ArrowLeft", "KeyA"]);
        let right = any(["ArrowRight", "KeyD"]);
        let up = any(["ArrowUp", "KeyW"]);
        let down = any(["ArrowDown", "KeyS"]);

        MovementAxis {
            x: i8::from(right) - i8::from(left),
            y: i8::from(down) - i8::from(up),
        }
    }
}

//--- Key Identity Helpers ------------------------------------------------

fn logical_name(input: &KeyInput) -> Option<&str> {
    input.logical.as_deref().filter(|name| !name.is_empty())
}

/// Physical code of an event, when it maps to a known code name.
fn tracked_code(input: &KeyInput) -> Option<(KeyCode, &'static str)> {
    let code = input.code?;
    code.as_str().map(|name| (code, name))
}

//--- Trait Implementations -----------------------------------------------

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pressed: Vec<_> = self.frame_pressed.iter().collect();
        let mut released: Vec<_> = self.frame_released.iter().collect();
        pressed.sort();
        released.sort();

        f.debug_struct("InputState")
            .field("held", &self.pressed_keys())
            .field("just_pressed", &pressed)
            .field("just_released", &released)
            .field("queued", &self.inbox.len())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
