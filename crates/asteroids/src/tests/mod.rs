//! Whole-game scenarios
//!
//! Each scenario wires real controllers into a world (or a full [`Game`])
//! and checks behavior that spans several modules.
//!
//! [`Game`]: crate::game::Game

mod scenarios;

use crate::controller::{Controller, ControllerId, SharedRenderer};
use crate::entity::{Entity, EntityKind};
use crate::error::WorldResult;
use crate::world::{Bounds, World};
use arena_engine::render::HeadlessRenderer;
use std::cell::RefCell;
use std::rc::Rc;

/// Owns hand-placed entities and deletes them on request
pub(crate) struct Owner {
    pub id: ControllerId,
    pub owned: Vec<Entity>,
}

impl Controller for Owner {
    fn step(&mut self, _world: &mut World, _dt: f32) -> WorldResult<()> {
        Ok(())
    }

    fn delete(&mut self, world: &mut World, entity: &Entity) -> WorldResult<()> {
        let Some(index) = self.owned.iter().position(|owned| owned == entity) else {
            return Ok(());
        };
        self.owned.remove(index);
        world.remove(entity, self.id)
    }
}

/// World with every kind registered in game order
pub(crate) fn registered_world(bounds: Bounds) -> World {
    let mut world = World::new(bounds);
    world.register_kind(EntityKind::Asteroid);
    world.register_kind(EntityKind::Bullet);
    world.register_kind(EntityKind::Ship);
    world
}

pub(crate) fn add_owner(world: &mut World) -> Rc<RefCell<Owner>> {
    world
        .add_controller(|_, id| {
            Ok(Owner {
                id,
                owned: Vec::new(),
            })
        })
        .unwrap()
}

pub(crate) fn recorder() -> (Rc<RefCell<HeadlessRenderer>>, SharedRenderer) {
    let recorder = Rc::new(RefCell::new(HeadlessRenderer::new()));
    let shared: SharedRenderer = recorder.clone();
    (recorder, shared)
}
