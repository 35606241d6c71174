//! The world: physics space, entity registry and collision dispatch
//!
//! Every live entity is registered twice, in creation order and by shape
//! handle, together with the controller that owns it. Only [`World::add`] and
//! [`World::remove`] touch those indices.
//!
//! [`World::step`] steps the physics space and then dispatches what it
//! reported, so collision handlers run with full access to the world and may
//! remove entities while the dispatch is in progress. A handler may therefore
//! see a shape that was removed earlier in the same step; such shapes are
//! dropped from the event instead of failing.

use crate::collision_types::CollisionTypeRegistry;
use crate::controller::{Controller, ControllerId};
use crate::dispatch::{CollisionCallback, CollisionDispatcher, CollisionEvent, Resolved};
use crate::entity::{Entity, EntityKind};
use crate::error::{TolerateStale, WorldError, WorldResult};
use crate::termination::TerminationState;
use arena_engine::foundation::math::Vec2;
use arena_engine::physics::{
    Arbiter, Body, BodyHandle, BodyMut, CollisionPhase, CollisionType, PhysicsError, RigidBody,
    Shape, ShapeHandle, Space,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

type SharedController = Rc<RefCell<dyn Controller>>;
type DoneCallback = Box<dyn FnOnce(&TerminationState)>;

/// Where entities may exist before being culled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    /// Fixed axis-aligned region (static camera)
    Region {
        /// Lower-left corner
        min: Vec2,
        /// Upper-right corner
        max: Vec2,
    },
    /// Circle around the anchor entity (follow camera)
    AroundAnchor {
        /// Distance from the anchor
        radius: f32,
    },
}

impl Bounds {
    /// Bounds that never cull anything
    pub fn unbounded() -> Self {
        Self::Region {
            min: Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
            max: Vec2::new(f32::INFINITY, f32::INFINITY),
        }
    }

    /// Whether `position` is inside; without an anchor nothing is outside a
    /// follow-camera bound
    pub fn contains(&self, position: Vec2, anchor: Option<Vec2>) -> bool {
        match *self {
            Self::Region { min, max } => {
                position.x >= min.x && position.x <= max.x && position.y >= min.y && position.y <= max.y
            }
            Self::AroundAnchor { radius } => {
                anchor.map_or(true, |anchor| (position - anchor).magnitude() <= radius)
            }
        }
    }
}

/// Simulation world
pub struct World {
    space: Space,
    registry: CollisionTypeRegistry<EntityKind>,
    dispatcher: CollisionDispatcher,
    entities: Vec<(Entity, ControllerId)>,
    by_shape: HashMap<ShapeHandle, (Entity, ControllerId)>,
    controllers: Vec<Option<SharedController>>,
    bounds: Bounds,
    anchor: Option<Entity>,
    termination: TerminationState,
    on_done: Option<DoneCallback>,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("controllers", &self.controllers.len())
            .field("bounds", &self.bounds)
            .field("termination", &self.termination)
            .finish_non_exhaustive()
    }
}

impl World {
    /// Empty world with the given culling bounds
    pub fn new(bounds: Bounds) -> Self {
        Self {
            space: Space::new(),
            registry: CollisionTypeRegistry::new(),
            dispatcher: CollisionDispatcher::new(),
            entities: Vec::new(),
            by_shape: HashMap::new(),
            controllers: Vec::new(),
            bounds,
            anchor: None,
            termination: TerminationState::new(),
            on_done: None,
        }
    }

    /// Registers an entity kind; must happen before any entity of that kind is created
    pub fn register_kind(&mut self, kind: EntityKind) -> CollisionType {
        self.registry.register(kind)
    }

    /// Collision type of a registered kind
    pub fn collision_type(&self, kind: EntityKind) -> WorldResult<CollisionType> {
        Ok(self.registry.type_of(kind)?)
    }

    /// Installs the handler for a kind pair and phase
    ///
    /// Registering again for the same pair (in either order) and phase
    /// replaces the previous handler.
    pub fn add_collision_handler<F>(
        &mut self,
        first: EntityKind,
        second: EntityKind,
        phase: CollisionPhase,
        callback: F,
    ) -> WorldResult<()>
    where
        F: Fn(&mut World, &CollisionEvent) -> WorldResult<bool> + 'static,
    {
        let first_type = self.registry.type_of(first)?;
        let second_type = self.registry.type_of(second)?;
        let callback: CollisionCallback = Rc::new(callback);

        if self.dispatcher.insert(first_type, second_type, phase, callback) {
            log::debug!("Replaced {:?} handler for {:?}/{:?}", phase, first, second);
        } else {
            log::debug!("Added {:?} handler for {:?}/{:?}", phase, first, second);
        }
        Ok(())
    }

    /// Creates the detached body and shape of a new entity
    ///
    /// The entity takes part in the simulation once passed to [`World::add`].
    pub fn create_entity(
        &mut self,
        kind: EntityKind,
        body: RigidBody,
        radius: f32,
    ) -> WorldResult<(BodyHandle, ShapeHandle)> {
        let collision_type = self
            .registry
            .type_of(kind)
            .map_err(|_| WorldError::EntityNotRegistered(kind))?;

        let body = self.space.create_body(body)?;
        match self
            .space
            .create_shape(Shape::circle(body, radius, collision_type))
        {
            Ok(shape) => Ok((body, shape)),
            Err(e) => {
                self.space.discard_body(body);
                Err(e.into())
            }
        }
    }

    /// Registers a controller built by `build`, which receives the id it will own entities under
    pub fn add_controller<C, F>(&mut self, build: F) -> WorldResult<Rc<RefCell<C>>>
    where
        C: Controller + 'static,
        F: FnOnce(&mut World, ControllerId) -> WorldResult<C>,
    {
        let id = ControllerId(self.controllers.len());
        self.controllers.push(None);

        let controller = Rc::new(RefCell::new(build(self, id)?));
        let shared: SharedController = controller.clone();
        self.controllers[id.0] = Some(shared);
        log::debug!("Registered controller {:?}", id);
        Ok(controller)
    }

    /// Looks up a registered controller
    pub fn controller(&self, id: ControllerId) -> WorldResult<Rc<RefCell<dyn Controller>>> {
        self.controllers
            .get(id.0)
            .and_then(Option::as_ref)
            .cloned()
            .ok_or(WorldError::UnknownController(id))
    }

    /// Steps every controller once, in registration order
    pub fn step_controllers(&mut self, dt: f32) -> WorldResult<()> {
        for index in 0..self.controllers.len() {
            let id = ControllerId(index);
            // slot of a controller whose builder failed
            let Some(controller) = self.controllers[index].clone() else {
                continue;
            };
            let mut controller = controller
                .try_borrow_mut()
                .map_err(|_| WorldError::ControllerBusy(id))?;
            controller.step(self, dt)?;
        }
        Ok(())
    }

    /// Asks the owning controller to delete `entity`
    pub fn delete_entity(&mut self, id: ControllerId, entity: &Entity) -> WorldResult<()> {
        let controller = self.controller(id)?;
        let mut controller = controller
            .try_borrow_mut()
            .map_err(|_| WorldError::ControllerBusy(id))?;
        controller.delete(self, entity)
    }

    /// Adds an entity to the space and both indices
    ///
    /// A freshly created entity that cannot be added is destroyed, so its
    /// detached body and shape do not linger in the space.
    pub fn add(&mut self, entity: Entity, controller: ControllerId) -> WorldResult<()> {
        let shape = entity.shape();
        if self.by_shape.contains_key(&shape) {
            return Err(WorldError::DuplicateEntity(shape));
        }
        if controller.0 >= self.controllers.len() {
            self.discard_detached(&entity);
            return Err(WorldError::UnknownController(controller));
        }

        if let Err(e) = self.space.add(entity.body(), shape) {
            return Err(match e {
                PhysicsError::AlreadyAdded(shape) => WorldError::DuplicateEntity(shape),
                other => {
                    self.discard_detached(&entity);
                    WorldError::Physics(other)
                }
            });
        }
        self.entities.push((entity, controller));
        self.by_shape.insert(shape, (entity, controller));
        log::trace!("Added {:?} {:?} for {:?}", entity.kind(), shape, controller);
        Ok(())
    }

    /// Removes an entity from the space and both indices
    ///
    /// Fails with [`WorldError::NotFound`] if the entity is not registered
    /// under `controller`.
    pub fn remove(&mut self, entity: &Entity, controller: ControllerId) -> WorldResult<()> {
        let shape = entity.shape();
        match self.by_shape.get(&shape) {
            Some((_, owner)) if *owner == controller => {}
            _ => return Err(WorldError::NotFound(shape)),
        }

        self.space.remove(entity.body(), shape)?;
        self.by_shape.remove(&shape);
        self.entities.retain(|(registered, _)| registered.shape() != shape);
        if self.anchor.map_or(false, |anchor| anchor.shape() == shape) {
            self.anchor = None;
        }
        log::trace!("Removed {:?} {:?}", entity.kind(), shape);
        Ok(())
    }

    fn discard_detached(&mut self, entity: &Entity) {
        if self.space.contains_shape(entity.shape()) {
            return;
        }
        match self.space.remove(entity.body(), entity.shape()) {
            Ok(()) => log::debug!("Discarded detached {:?} {:?}", entity.kind(), entity.shape()),
            Err(e) => log::debug!("Nothing to discard for {:?}: {}", entity.kind(), e),
        }
    }

    /// Entity and owning controller for a shape
    pub fn lookup_by_shape(&self, shape: ShapeHandle) -> WorldResult<(Entity, ControllerId)> {
        self.by_shape
            .get(&shape)
            .copied()
            .ok_or(WorldError::NotFound(shape))
    }

    /// Whether the entity is live
    pub fn contains(&self, entity: &Entity) -> bool {
        self.by_shape.contains_key(&entity.shape())
    }

    /// Live entities in creation order
    pub fn entities(&self) -> impl Iterator<Item = &(Entity, ControllerId)> {
        self.entities.iter()
    }

    /// Number of live entities of `kind`
    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.entities
            .iter()
            .filter(|(entity, _)| entity.kind() == kind)
            .count()
    }

    /// Rigid body of an entity
    pub fn body(&self, entity: &Entity) -> WorldResult<Body<'_>> {
        self.space
            .body(entity.body())
            .ok_or(WorldError::NotFound(entity.shape()))
    }

    /// Mutable rigid body of an entity, for applying impulses and forces
    pub fn body_mut(&mut self, entity: &Entity) -> WorldResult<BodyMut<'_>> {
        self.space
            .body_mut(entity.body())
            .ok_or(WorldError::NotFound(entity.shape()))
    }

    /// The physics space, read-only
    pub fn space(&self) -> &Space {
        &self.space
    }

    /// Culling bounds
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Designates the entity whose exit ends the game
    pub fn set_anchor(&mut self, entity: &Entity) -> WorldResult<()> {
        let (entity, _) = self.lookup_by_shape(entity.shape())?;
        self.anchor = Some(entity);
        Ok(())
    }

    /// The anchor entity, if any
    pub fn anchor(&self) -> Option<Entity> {
        self.anchor
    }

    /// Current position of the anchor entity
    pub fn anchor_position(&self) -> Option<Vec2> {
        let anchor = self.anchor?;
        self.space.body(anchor.body()).map(|body| body.position())
    }

    /// Installs the callback run once when the game ends
    pub fn on_done<F>(&mut self, callback: F)
    where
        F: FnOnce(&TerminationState) + 'static,
    {
        self.on_done = Some(Box::new(callback));
    }

    /// Ends the game; later calls do nothing
    pub fn set_done(&mut self) {
        if !self.termination.set_done() {
            return;
        }
        log::info!("Game over after {:.2}s", self.termination.elapsed());
        if let Some(callback) = self.on_done.take() {
            callback(&self.termination);
        }
    }

    /// Whether the game has ended
    pub fn is_done(&self) -> bool {
        self.termination.is_done()
    }

    /// Simulated time survived
    pub fn elapsed(&self) -> f32 {
        self.termination.elapsed()
    }

    /// Clock and game-over state
    pub fn termination(&self) -> &TerminationState {
        &self.termination
    }

    /// Advances the simulation by exactly `dt`; does nothing once done
    ///
    /// Steps the space, then dispatches PostSolve for the pairs it solved,
    /// Separate for the pairs it lost, and Begin and PreSolve for the pairs
    /// still touching. Those last two decide what the next step may solve: a
    /// rejected Begin ignores the pair until it separates, a rejected
    /// PreSolve skips one resolution. Bounds culling runs last.
    pub fn step(&mut self, dt: f32) -> WorldResult<()> {
        if self.is_done() {
            return Ok(());
        }
        self.termination.advance(dt);
        let contacts = self.space.step(dt);

        for arbiter in &contacts.solved {
            self.dispatch(CollisionPhase::PostSolve, arbiter.shapes, arbiter.collision_types, Some(arbiter))?;
        }

        for separation in &contacts.separated {
            self.dispatch(
                CollisionPhase::Separate,
                separation.shapes(),
                separation.collision_types,
                None,
            )?;
        }

        for arbiter in &contacts.arbiters {
            if arbiter.first_contact
                && !self.dispatch(CollisionPhase::Begin, arbiter.shapes, arbiter.collision_types, Some(arbiter))?
            {
                self.space.reject(arbiter.pair());
                continue;
            }
            if self.dispatch(CollisionPhase::PreSolve, arbiter.shapes, arbiter.collision_types, Some(arbiter))? {
                self.space.allow(arbiter.pair());
            }
        }

        self.cull_out_of_bounds()
    }

    fn dispatch(
        &mut self,
        phase: CollisionPhase,
        shapes: [ShapeHandle; 2],
        collision_types: [CollisionType; 2],
        arbiter: Option<&Arbiter>,
    ) -> WorldResult<bool> {
        let Some((callback, swap)) = self.dispatcher.lookup(collision_types, phase) else {
            return Ok(true);
        };

        let (shapes, arbiter) = if swap {
            ([shapes[1], shapes[0]], arbiter.map(Arbiter::swapped))
        } else {
            (shapes, arbiter.cloned())
        };

        let mut resolved = Vec::with_capacity(2);
        for shape in shapes {
            if let Some((entity, controller)) = self.lookup_by_shape(shape).tolerate_stale()? {
                resolved.push(Resolved { entity, controller });
            }
        }

        let event = CollisionEvent {
            phase,
            shapes,
            resolved,
            arbiter,
        };
        log::trace!("Dispatching {:?} for {:?}", phase, event.shapes);
        callback(self, &event)
    }

    fn cull_out_of_bounds(&mut self) -> WorldResult<()> {
        let anchor_position = self.anchor_position();
        let snapshot = self.entities.clone();

        for (entity, controller) in snapshot {
            // an earlier delete in this pass may have taken it
            if !self.contains(&entity) {
                continue;
            }
            let Some(position) = self.space.body(entity.body()).map(|body| body.position()) else {
                continue;
            };
            if self.bounds.contains(position, anchor_position) {
                continue;
            }

            if self.anchor == Some(entity) {
                log::info!("Anchor left the arena");
                self.set_done();
            } else {
                log::debug!("Culling {:?} at {:?}", entity.kind(), position);
                self.delete_entity(controller, &entity)?;
            }
        }
        Ok(())
    }
}
