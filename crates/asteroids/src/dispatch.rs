//! Collision callbacks keyed by entity-kind pairs
//!
//! Handlers are stored per unordered pair of collision types and phase, but
//! remember the order they were registered in: a handler registered for
//! (Ship, Asteroid) always sees the ship first, whichever shape the physics
//! space happened to report first.

use crate::controller::ControllerId;
use crate::entity::Entity;
use crate::error::WorldResult;
use crate::world::World;
use arena_engine::physics::{Arbiter, CollisionPhase, CollisionType, ShapeHandle};
use std::collections::HashMap;
use std::rc::Rc;

/// An entity resolved from a shape in a collision event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    /// The live entity
    pub entity: Entity,
    /// Its owning controller
    pub controller: ControllerId,
}

/// What a collision handler is told
#[derive(Debug, Clone)]
pub struct CollisionEvent {
    /// Phase being dispatched
    pub phase: CollisionPhase,
    /// Both shapes in the handler's registration order
    pub shapes: [ShapeHandle; 2],
    /// The shapes that still belong to live entities, in the same order
    pub resolved: Vec<Resolved>,
    /// Contact data; absent for separation
    pub arbiter: Option<Arbiter>,
}

/// Collision handler
///
/// The return value matters for Begin and PreSolve only: false rejects the
/// contact (Begin: until the pair separates, PreSolve: for this step).
pub type CollisionCallback = Rc<dyn Fn(&mut World, &CollisionEvent) -> WorldResult<bool>>;

#[derive(Clone)]
struct Handler {
    registered_first: CollisionType,
    callback: CollisionCallback,
}

type HandlerKey = (CollisionType, CollisionType, CollisionPhase);

fn key(a: CollisionType, b: CollisionType, phase: CollisionPhase) -> HandlerKey {
    if a <= b {
        (a, b, phase)
    } else {
        (b, a, phase)
    }
}

/// Handler table for every (type, type, phase) slot
#[derive(Default, Clone)]
pub struct CollisionDispatcher {
    handlers: HashMap<HandlerKey, Handler>,
}

impl std::fmt::Debug for CollisionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl CollisionDispatcher {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a handler; returns true if it replaced an existing one
    pub fn insert(
        &mut self,
        first: CollisionType,
        second: CollisionType,
        phase: CollisionPhase,
        callback: CollisionCallback,
    ) -> bool {
        let handler = Handler {
            registered_first: first,
            callback,
        };
        self.handlers.insert(key(first, second, phase), handler).is_some()
    }

    /// Handler for a reported pair, plus whether the pair must be swapped to
    /// match the registration order
    pub fn lookup(
        &self,
        collision_types: [CollisionType; 2],
        phase: CollisionPhase,
    ) -> Option<(CollisionCallback, bool)> {
        let [first, second] = collision_types;
        self.handlers.get(&key(first, second, phase)).map(|handler| {
            let swap = first != second && handler.registered_first != first;
            (Rc::clone(&handler.callback), swap)
        })
    }

    /// Whether any handler is registered for the pair and phase
    pub fn contains(&self, a: CollisionType, b: CollisionType, phase: CollisionPhase) -> bool {
        self.handlers.contains_key(&key(a, b, phase))
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> CollisionCallback {
        Rc::new(|_: &mut World, _: &CollisionEvent| -> WorldResult<bool> { Ok(true) })
    }

    #[test]
    fn test_lookup_reports_swap_against_registration_order() {
        let mut dispatcher = CollisionDispatcher::new();
        dispatcher.insert(CollisionType(3), CollisionType(1), CollisionPhase::PostSolve, noop());

        let (_, swap) = dispatcher
            .lookup([CollisionType(1), CollisionType(3)], CollisionPhase::PostSolve)
            .unwrap();
        assert!(swap);

        let (_, swap) = dispatcher
            .lookup([CollisionType(3), CollisionType(1)], CollisionPhase::PostSolve)
            .unwrap();
        assert!(!swap);
    }

    #[test]
    fn test_phases_are_separate_slots() {
        let mut dispatcher = CollisionDispatcher::new();
        dispatcher.insert(CollisionType(1), CollisionType(2), CollisionPhase::Begin, noop());

        assert!(dispatcher
            .lookup([CollisionType(1), CollisionType(2)], CollisionPhase::Separate)
            .is_none());
    }

    #[test]
    fn test_reverse_registration_replaces_same_slot() {
        let mut dispatcher = CollisionDispatcher::new();
        assert!(!dispatcher.insert(CollisionType(1), CollisionType(2), CollisionPhase::Begin, noop()));
        assert!(dispatcher.insert(CollisionType(2), CollisionType(1), CollisionPhase::Begin, noop()));
        assert_eq!(dispatcher.len(), 1);
    }
}
