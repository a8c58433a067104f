//=========================================================================
// Collision Events
//=========================================================================
//
// Contact event contract between a collision detector and the scheduler.
//
// Detection math is supplied from outside through `CollisionDetector`.
// The core only guarantees delivery order:
//   - each (pair, kind, phase) is dispatched at most once per tick
//   - for one pair, enter before stay before exit
//   - pairs are visited in the order the detector first reported them
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{BTreeSet, HashSet};

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::object::{ObjectId, Scene};

//=== Contact Types =======================================================

/// Solid collision or overlap-only trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContactKind {
    Collision,
    Trigger,
}

/// Transition of a contact between two ticks.
///
/// Ordering follows dispatch order: `Enter < Stay < Exit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContactPhase {
    Enter,
    Stay,
    Exit,
}

/// One contact transition between two objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactEvent {
    pub a: ObjectId,
    pub b: ObjectId,
    pub kind: ContactKind,
    pub phase: ContactPhase,
}

impl ContactEvent {
    pub fn new(a: ObjectId, b: ObjectId, kind: ContactKind, phase: ContactPhase) -> Self {
        Self { a, b, kind, phase }
    }

    /// The pair with the smaller id first.
    pub fn pair(&self) -> (ObjectId, ObjectId) {
        canonical(self.a, self.b)
    }

    /// Name of the runtime hook this event triggers.
    pub fn hook_name(&self) -> &'static str {
        match (self.kind, self.phase) {
            (ContactKind::Collision, ContactPhase::Enter) => "on_collision_enter",
            (ContactKind::Collision, ContactPhase::Stay) => "on_collision_stay",
            (ContactKind::Collision, ContactPhase::Exit) => "on_collision_exit",
            (ContactKind::Trigger, ContactPhase::Enter) => "on_trigger_enter",
            (ContactKind::Trigger, ContactPhase::Stay) => "on_trigger_stay",
            (ContactKind::Trigger, ContactPhase::Exit) => "on_trigger_exit",
        }
    }
}

fn canonical(a: ObjectId, b: ObjectId) -> (ObjectId, ObjectId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

//=== CollisionDetector ===================================================

/// Source of contact transitions, queried once per tick after updates.
pub trait CollisionDetector {
    fn detect(&mut self, scene: &Scene) -> Vec<ContactEvent>;
}

impl<F> CollisionDetector for F
where
    F: FnMut(&Scene) -> Vec<ContactEvent>,
{
    fn detect(&mut self, scene: &Scene) -> Vec<ContactEvent> {
        self(scene)
    }
}

//=== Normalization =======================================================

/// Puts raw detector output into dispatch order.
///
/// Duplicates and self-contacts are dropped. Events are grouped by pair
/// in first-appearance order, and phases within a pair are sorted.
pub(crate) fn normalize(events: Vec<ContactEvent>) -> Vec<ContactEvent> {
    let mut seen = HashSet::new();
    let mut pairs: Vec<(ObjectId, ObjectId)> = Vec::new();
    let mut groups: Vec<Vec<ContactEvent>> = Vec::new();

    for event in events {
        if event.a == event.b {
            debug!(target: "scheduler", "Ignoring self-contact on {}", event.a);
            continue;
        }

        let pair = event.pair();
        if !seen.insert((pair, event.kind, event.phase)) {
            continue;
        }

        let canonical_event = ContactEvent::new(pair.0, pair.1, event.kind, event.phase);
        match pairs.iter().position(|p| *p == pair) {
            Some(index) => groups[index].push(canonical_event),
            None => {
                pairs.push(pair);
                groups.push(vec![canonical_event]);
            }
        }
    }

    groups
        .into_iter()
        .flat_map(|mut group| {
            group.sort_by_key(|event| event.phase);
            group
        })
        .collect()
}

//=== ContactTracker ======================================================

/// Turns per-tick overlap sets into enter/stay/exit transitions.
///
/// Detectors that only know "what overlaps right now" feed their overlaps
/// here each tick and return the resulting events.
#[derive(Debug, Default, Clone)]
pub struct ContactTracker {
    previous: BTreeSet<(ObjectId, ObjectId, ContactKind)>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records this tick's overlaps and returns the transitions.
    pub fn update<I>(&mut self, overlaps: I) -> Vec<ContactEvent>
    where
        I: IntoIterator<Item = (ObjectId, ObjectId, ContactKind)>,
    {
        let current: BTreeSet<_> = overlaps
            .into_iter()
            .filter(|(a, b, _)| a != b)
            .map(|(a, b, kind)| {
                let (a, b) = canonical(a, b);
                (a, b, kind)
            })
            .collect();

        let mut events = Vec::new();
        for &(a, b, kind) in &current {
            let phase = if self.previous.contains(&(a, b, kind)) {
                ContactPhase::Stay
            } else {
                ContactPhase::Enter
            };
            events.push(ContactEvent::new(a, b, kind, phase));
        }
        for &(a, b, kind) in self.previous.difference(&current) {
            events.push(ContactEvent::new(a, b, kind, ContactPhase::Exit));
        }

        self.previous = current;
        events
    }

    /// Number of contacts active after the last update.
    pub fn active(&self) -> usize {
        self.previous.len()
    }

    pub fn clear(&mut self) {
        self.previous.clear();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
