//! The simulation space
//!
//! Owns the rapier pipeline and its body and collider sets. Bodies and shapes
//! are created disabled and only take part in integration and detection once
//! [`Space::add`] enables them.

use super::body::{from_vector, Inertia};
use super::collision_system::{Arbiter, ContactCache, Contacts, ShapePair};
use super::{Body, BodyHandle, BodyMut, CollisionType, PhysicsError, RigidBody, Shape, ShapeHandle};
use crate::foundation::math::Vec2;
use rapier2d::crossbeam::channel::unbounded;
use rapier2d::prelude::{
    ActiveEvents, ActiveHooks, CCDSolver, ChannelEventCollector, CoefficientCombineRule, Collider,
    ColliderBuilder, ColliderSet, CollisionEvent, ContactForceEvent, ContactModificationContext,
    ContactPair, DefaultBroadPhase, ImpulseJointSet, IntegrationParameters, IslandManager,
    MultibodyJointSet, NarrowPhase, PhysicsHooks, PhysicsPipeline, Real, RigidBodySet, Vector,
};
use std::collections::{HashMap, HashSet};

/// Solver gate consulted by rapier while it builds solver contacts
///
/// Pairs missing from `allowed` keep their contact (and their events) but get
/// no response.
#[derive(Debug, Default)]
struct ContactGate {
    allowed: HashSet<ShapePair>,
}

impl PhysicsHooks for ContactGate {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        if !self
            .allowed
            .contains(&ShapePair::new(context.collider1, context.collider2))
        {
            context.solver_contacts.clear();
        }
    }
}

fn collision_type_of(collider: &Collider) -> CollisionType {
    CollisionType(u32::try_from(collider.user_data).unwrap_or_default())
}

/// Builds an arbiter from a touching rapier pair; `None` if either collider is gone
fn arbiter_for(colliders: &ColliderSet, pair: &ContactPair) -> Option<Arbiter> {
    let first = colliders.get(pair.collider1)?;
    let second = colliders.get(pair.collider2)?;
    let (manifold, contact) = pair.find_deepest_contact()?;
    let point = first.position() * contact.local_p1;

    Some(Arbiter {
        shapes: [pair.collider1, pair.collider2],
        bodies: [first.parent()?, second.parent()?],
        collision_types: [collision_type_of(first), collision_type_of(second)],
        normal: from_vector(&manifold.data.normal),
        depth: -contact.dist,
        point: Vec2::new(point.x, point.y),
        first_contact: false,
        total_impulse: Vec2::zeros(),
    })
}

/// A 2D rigid-body world with circle shapes
pub struct Space {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    inertia: HashMap<BodyHandle, Inertia>,
    gate: ContactGate,
    contacts: ContactCache,
}

impl std::fmt::Debug for Space {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Space")
            .field("bodies", &self.bodies.len())
            .field("colliders", &self.colliders.len())
            .field("contacts", &self.contacts)
            .finish_non_exhaustive()
    }
}

impl Default for Space {
    fn default() -> Self {
        Self::new()
    }
}

impl Space {
    /// Creates an empty zero-gravity space
    pub fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: Vector::zeros(),
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            inertia: HashMap::new(),
            gate: ContactGate::default(),
            contacts: ContactCache::new(),
        }
    }

    /// Global acceleration applied to every attached body
    pub fn gravity(&self) -> Vec2 {
        from_vector(&self.gravity)
    }

    /// Sets the global acceleration
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = Vector::new(gravity.x, gravity.y);
    }

    /// Stores a detached body
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidMass`] for non-positive or non-finite mass.
    pub fn create_body(&mut self, body: RigidBody) -> Result<BodyHandle, PhysicsError> {
        if !(body.mass().is_finite() && body.mass() > 0.0) {
            return Err(PhysicsError::InvalidMass(body.mass()));
        }
        let handle = self.bodies.insert(body.build());
        self.inertia.insert(handle, body.inertia());
        Ok(handle)
    }

    /// Stores a detached shape on an existing body
    ///
    /// # Errors
    ///
    /// Fails if the owning body is unknown or the radius is not positive.
    pub fn create_shape(&mut self, shape: Shape) -> Result<ShapeHandle, PhysicsError> {
        if !self.bodies.contains(shape.body()) {
            return Err(PhysicsError::UnknownBody(shape.body()));
        }
        if !(shape.radius().is_finite() && shape.radius() > 0.0) {
            return Err(PhysicsError::InvalidRadius(shape.radius()));
        }

        // mass comes from the body; the collider only adds geometry
        let collider = ColliderBuilder::ball(shape.radius())
            .density(0.0)
            .friction(0.0)
            .restitution(shape.elasticity())
            .restitution_combine_rule(CoefficientCombineRule::Multiply)
            .user_data(u128::from(shape.collision_type().0))
            .active_events(ActiveEvents::COLLISION_EVENTS | ActiveEvents::CONTACT_FORCE_EVENTS)
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS)
            .contact_force_event_threshold(0.0)
            .enabled(false)
            .build();
        Ok(self
            .colliders
            .insert_with_parent(collider, shape.body(), &mut self.bodies))
    }

    /// Attaches a body and its shape to the simulation
    ///
    /// # Errors
    ///
    /// Fails for unknown handles, a shape owned by another body, or a shape
    /// that is already attached.
    pub fn add(&mut self, body: BodyHandle, shape: ShapeHandle) -> Result<(), PhysicsError> {
        let collider = self
            .colliders
            .get_mut(shape)
            .ok_or(PhysicsError::UnknownShape(shape))?;
        if collider.parent() != Some(body) {
            return Err(PhysicsError::ShapeBodyMismatch { shape, body });
        }
        if collider.is_enabled() {
            return Err(PhysicsError::AlreadyAdded(shape));
        }
        let rigid_body = self
            .bodies
            .get_mut(body)
            .ok_or(PhysicsError::UnknownBody(body))?;

        rigid_body.set_enabled(true);
        collider.set_enabled(true);
        log::trace!("Attached shape {:?} on body {:?}", shape, body);
        Ok(())
    }

    /// Destroys a body and its shape, attached or not
    ///
    /// Touching pairs involving the shape are reported as separated by the
    /// next step.
    ///
    /// # Errors
    ///
    /// Fails if either handle is unknown or they do not belong together.
    pub fn remove(&mut self, body: BodyHandle, shape: ShapeHandle) -> Result<(), PhysicsError> {
        let owner = self
            .colliders
            .get(shape)
            .ok_or(PhysicsError::UnknownShape(shape))?
            .parent();
        if owner != Some(body) {
            return Err(PhysicsError::ShapeBodyMismatch { shape, body });
        }
        let shape_count = self
            .bodies
            .get(body)
            .ok_or(PhysicsError::UnknownBody(body))?
            .colliders()
            .len();

        // a body may carry more than one shape
        if shape_count > 1 {
            self.colliders
                .remove(shape, &mut self.island_manager, &mut self.bodies, true);
        } else {
            self.bodies.remove(
                body,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
            self.inertia.remove(&body);
        }
        log::trace!("Removed shape {:?} from body {:?}", shape, body);
        Ok(())
    }

    /// Destroys a body that never got a shape, along with any detached shapes
    ///
    /// Does nothing for an unknown or attached body.
    pub fn discard_body(&mut self, body: BodyHandle) {
        match self.bodies.get(body) {
            Some(state) if !state.is_enabled() => {}
            _ => return,
        }
        self.bodies.remove(
            body,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.inertia.remove(&body);
        log::trace!("Discarded detached body {:?}", body);
    }

    /// Whether the shape exists and is attached
    pub fn contains_shape(&self, shape: ShapeHandle) -> bool {
        self.colliders.get(shape).map_or(false, Collider::is_enabled)
    }

    /// Number of bodies, attached or not
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of attached shapes
    pub fn shape_count(&self) -> usize {
        self.colliders.iter().filter(|(_, collider)| collider.is_enabled()).count()
    }

    /// Collision type of a shape, attached or not
    pub fn collision_type(&self, shape: ShapeHandle) -> Option<CollisionType> {
        self.colliders.get(shape).map(collision_type_of)
    }

    /// Looks up a body, attached or not
    pub fn body(&self, handle: BodyHandle) -> Option<Body<'_>> {
        let inertia = *self.inertia.get(&handle)?;
        self.bodies.get(handle).map(|state| Body::new(state, inertia))
    }

    /// Mutable access to a body, attached or not
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<BodyMut<'_>> {
        let inertia = *self.inertia.get(&handle)?;
        self.bodies
            .get_mut(handle)
            .map(|state| BodyMut::new(state, inertia))
    }

    /// Attached bodies
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, Body<'_>)> {
        self.bodies
            .iter()
            .filter(|(_, state)| state.is_enabled())
            .filter_map(|(handle, state)| {
                let inertia = *self.inertia.get(&handle)?;
                Some((handle, Body::new(state, inertia)))
            })
    }

    /// Lets the next step solve a touching pair
    pub fn allow(&mut self, pair: ShapePair) {
        self.gate.allowed.insert(pair);
    }

    /// Ignores a pair until it separates
    pub fn reject(&mut self, pair: ShapePair) {
        self.gate.allowed.remove(&pair);
        self.contacts.reject(pair);
    }

    /// Whether a pair is currently ignored
    pub fn is_rejected(&self, pair: &ShapePair) -> bool {
        self.contacts.is_rejected(pair)
    }

    /// Advances the simulation by `dt` and reports the step's contacts
    ///
    /// Only pairs passed to [`Space::allow`] since the previous step are
    /// solved; the allowances are consumed.
    pub fn step(&mut self, dt: f32) -> Contacts {
        self.integration_parameters.dt = dt;

        let (collision_send, collision_recv) = unbounded::<CollisionEvent>();
        let (force_send, force_recv) = unbounded::<ContactForceEvent>();
        let events = ChannelEventCollector::new(collision_send, force_send);

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &self.gate,
            &events,
        );
        for (_, state) in self.bodies.iter_mut() {
            state.reset_forces(false);
            state.reset_torques(false);
        }
        let allowed = std::mem::take(&mut self.gate.allowed);

        let mut started = HashSet::new();
        let mut separated = Vec::new();
        while let Ok(event) = collision_recv.try_recv() {
            match event {
                CollisionEvent::Started(a, b, _) => {
                    started.insert(ShapePair::new(a, b));
                }
                CollisionEvent::Stopped(a, b, _) => {
                    let pair = ShapePair::new(a, b);
                    started.remove(&pair);
                    if let Some(separation) = self.contacts.separate(pair) {
                        separated.push(separation);
                    }
                }
            }
        }

        let mut touching: Vec<Arbiter> = self
            .narrow_phase
            .contact_pairs()
            .filter(|pair| pair.has_any_active_contact)
            .filter_map(|pair| arbiter_for(&self.colliders, pair))
            .collect();
        touching.sort_unstable_by_key(|arbiter| arbiter.pair().sort_key());

        let mut arbiters = Vec::with_capacity(touching.len());
        for mut arbiter in touching {
            let pair = arbiter.pair();
            arbiter.first_contact = started.contains(&pair);
            self.contacts.touch(pair, arbiter.pair_types());
            if !self.contacts.is_rejected(&pair) {
                arbiters.push(arbiter);
            }
        }

        let mut solved = Vec::new();
        while let Ok(event) = force_recv.try_recv() {
            let pair = ShapePair::new(event.collider1, event.collider2);
            if !allowed.contains(&pair) {
                continue;
            }
            let Some(arbiter) = arbiters.iter().find(|arbiter| arbiter.pair() == pair) else {
                continue;
            };
            let mut impulse = from_vector(&event.total_force) * dt;
            if arbiter.shapes[0] != event.collider1 {
                impulse = -impulse;
            }
            solved.push(Arbiter {
                total_impulse: impulse,
                ..arbiter.clone()
            });
        }
        solved.sort_unstable_by_key(|arbiter| arbiter.pair().sort_key());
        separated.sort_unstable_by_key(|separation| separation.pair.sort_key());

        Contacts {
            arbiters,
            solved,
            separated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::moment_for_circle;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 30.0;

    fn spawn(space: &mut Space, position: Vec2, radius: f32) -> (BodyHandle, ShapeHandle) {
        let body = space
            .create_body(RigidBody::new(10.0, moment_for_circle(10.0, 0.0, radius), position))
            .unwrap();
        let shape = space
            .create_shape(Shape::circle(body, radius, CollisionType(1)))
            .unwrap();
        space.add(body, shape).unwrap();
        (body, shape)
    }

    fn allow_all(space: &mut Space, contacts: &Contacts) {
        for arbiter in &contacts.arbiters {
            space.allow(arbiter.pair());
        }
    }

    fn gap(space: &Space, a: BodyHandle, b: BodyHandle) -> f32 {
        (space.body(b).unwrap().position() - space.body(a).unwrap().position()).magnitude()
    }

    #[test]
    fn test_create_body_rejects_bad_mass() {
        let mut space = Space::new();
        let result = space.create_body(RigidBody::new(0.0, 1.0, Vec2::zeros()));
        assert_eq!(result, Err(PhysicsError::InvalidMass(0.0)));
    }

    #[test]
    fn test_create_shape_needs_a_body_and_a_radius() {
        let mut space = Space::new();
        let body = space.create_body(RigidBody::new(1.0, 1.0, Vec2::zeros())).unwrap();
        assert_eq!(
            space.create_shape(Shape::circle(body, 0.0, CollisionType(1))),
            Err(PhysicsError::InvalidRadius(0.0))
        );

        let mut empty = Space::new();
        assert_eq!(
            empty.create_shape(Shape::circle(body, 1.0, CollisionType(1))),
            Err(PhysicsError::UnknownBody(body))
        );
    }

    #[test]
    fn test_add_twice_fails() {
        let mut space = Space::new();
        let (body, shape) = spawn(&mut space, Vec2::zeros(), 1.0);
        assert_eq!(space.add(body, shape), Err(PhysicsError::AlreadyAdded(shape)));
        assert_eq!(space.collision_type(shape), Some(CollisionType(1)));
    }

    #[test]
    fn test_detached_bodies_do_not_move() {
        let mut space = Space::new();
        let body = space.create_body(RigidBody::new(1.0, 1.0, Vec2::zeros())).unwrap();
        space.body_mut(body).unwrap().set_velocity(Vec2::new(1.0, 0.0));
        space.step(1.0);

        assert!(!space.body(body).unwrap().is_attached());
        assert_relative_eq!(space.body(body).unwrap().position(), Vec2::zeros());
        assert_eq!(space.bodies().count(), 0);
    }

    #[test]
    fn test_remove_destroys_detached_pieces() {
        let mut space = Space::new();
        let body = space.create_body(RigidBody::new(1.0, 1.0, Vec2::zeros())).unwrap();
        let shape = space
            .create_shape(Shape::circle(body, 1.0, CollisionType(1)))
            .unwrap();

        space.remove(body, shape).unwrap();
        assert!(space.body(body).is_none());
        assert_eq!(space.collision_type(shape), None);
        assert_eq!(space.remove(body, shape), Err(PhysicsError::UnknownShape(shape)));
    }

    #[test]
    fn test_discard_body_only_touches_detached_bodies() {
        let mut space = Space::new();
        let detached = space.create_body(RigidBody::new(1.0, 1.0, Vec2::zeros())).unwrap();
        let (attached, _) = spawn(&mut space, Vec2::zeros(), 1.0);

        space.discard_body(detached);
        space.discard_body(attached);

        assert!(space.body(detached).is_none());
        assert!(space.body(attached).is_some());
        assert_eq!(space.body_count(), 1);
        assert_eq!(space.shape_count(), 1);
    }

    #[test]
    fn test_overlap_reports_begin_then_ongoing() {
        let mut space = Space::new();
        spawn(&mut space, Vec2::zeros(), 30.0);
        spawn(&mut space, Vec2::new(10.0, 0.0), 40.0);

        let first = space.step(DT);
        assert_eq!(first.arbiters.len(), 1);
        assert!(first.arbiters[0].first_contact);
        assert!(first.arbiters[0].depth > 0.0);

        let second = space.step(DT);
        assert_eq!(second.arbiters.len(), 1);
        assert!(!second.arbiters[0].first_contact);
    }

    #[test]
    fn test_pairs_are_not_solved_without_allowance() {
        let mut space = Space::new();
        let (a, _) = spawn(&mut space, Vec2::zeros(), 30.0);
        let (b, _) = spawn(&mut space, Vec2::new(10.0, 0.0), 40.0);

        for _ in 0..3 {
            assert!(space.step(DT).solved.is_empty());
        }
        assert_relative_eq!(gap(&space, a, b), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_allowed_pair_is_solved_and_pushed_apart() {
        let mut space = Space::new();
        let (a, _) = spawn(&mut space, Vec2::zeros(), 30.0);
        let (b, _) = spawn(&mut space, Vec2::new(10.0, 0.0), 40.0);

        let contacts = space.step(DT);
        allow_all(&mut space, &contacts);
        let contacts = space.step(DT);

        assert_eq!(contacts.solved.len(), 1);
        assert_eq!(contacts.solved[0].pair(), contacts.arbiters[0].pair());
        assert!(gap(&space, a, b) > 10.0);
        // allowances only last one step
        assert!(space.step(DT).solved.is_empty());
    }

    #[test]
    fn test_removed_shape_is_reported_separated() {
        let mut space = Space::new();
        let (body, shape) = spawn(&mut space, Vec2::zeros(), 30.0);
        let (_, other) = spawn(&mut space, Vec2::new(10.0, 0.0), 40.0);
        space.step(DT);

        space.remove(body, shape).unwrap();
        assert!(!space.contains_shape(shape));
        assert!(space.body(body).is_none());

        let contacts = space.step(DT);
        assert!(contacts.arbiters.is_empty());
        assert_eq!(contacts.separated.len(), 1);
        assert_eq!(contacts.separated[0].pair, ShapePair::new(shape, other));
        assert_eq!(contacts.separated[0].collision_types, [CollisionType(1); 2]);
    }

    #[test]
    fn test_rejected_pair_is_silent_until_separation() {
        let mut space = Space::new();
        let (_, a) = spawn(&mut space, Vec2::zeros(), 30.0);
        let (body_b, b) = spawn(&mut space, Vec2::new(10.0, 0.0), 40.0);

        let contacts = space.step(DT);
        space.reject(contacts.arbiters[0].pair());
        assert!(space.step(DT).arbiters.is_empty());

        space.body_mut(body_b).unwrap().set_position(Vec2::new(500.0, 0.0));
        let contacts = space.step(DT);
        assert_eq!(contacts.separated[0].pair, ShapePair::new(a, b));
        assert!(!space.is_rejected(&ShapePair::new(a, b)));
    }

    #[test]
    fn test_step_integrates_free_bodies() {
        let mut space = Space::new();
        let (body, _) = spawn(&mut space, Vec2::zeros(), 1.0);
        space
            .body_mut(body)
            .unwrap()
            .apply_impulse_at_local_point(Vec2::new(0.0, 10.0), Vec2::zeros());
        space.step(0.5);

        assert_relative_eq!(space.body(body).unwrap().position(), Vec2::new(0.0, 0.5), epsilon = 1e-4);
    }

    #[test]
    fn test_forces_last_one_step() {
        let mut space = Space::new();
        let (body, _) = spawn(&mut space, Vec2::zeros(), 1.0);
        let center = space.body(body).unwrap().position();
        space
            .body_mut(body)
            .unwrap()
            .apply_force_at_world_point(Vec2::new(10.0, 0.0), center);

        space.step(0.5);
        let pushed = space.body(body).unwrap().velocity().x;
        space.step(0.5);

        assert!(pushed > 0.0);
        assert_relative_eq!(space.body(body).unwrap().velocity().x, pushed);
    }
}
