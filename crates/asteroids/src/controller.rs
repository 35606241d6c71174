//! Behavioural controllers
//!
//! A controller owns a set of entities, steps their behaviour once per tick
//! and is the only party allowed to delete them.

use crate::entity::Entity;
use crate::error::WorldResult;
use crate::world::World;
use arena_engine::render::Renderer;
use std::cell::RefCell;
use std::rc::Rc;

/// Renderer shared between controllers and the host
pub type SharedRenderer = Rc<RefCell<dyn Renderer>>;

/// Stable identifier of a controller registered with a [`World`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(pub(crate) usize);

impl ControllerId {
    /// Registration index
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Owner of a set of entities
pub trait Controller {
    /// Advances the controller's behaviour by `dt` seconds
    fn step(&mut self, world: &mut World, dt: f32) -> WorldResult<()>;

    /// Deletes `entity` if this controller owns it; a no-op otherwise
    fn delete(&mut self, world: &mut World, entity: &Entity) -> WorldResult<()>;
}
