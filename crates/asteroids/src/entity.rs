//! Simulated entities
//!
//! An entity is a body plus one circle shape living in the world's physics
//! space. Its identity is the shape handle: two entities are equal exactly
//! when they refer to the same shape.

use crate::config::{AsteroidConfig, BulletConfig, ShipConfig};
use crate::error::WorldResult;
use crate::world::World;
use arena_engine::foundation::math::Vec2;
use arena_engine::physics::{moment_for_circle, BodyHandle, BodyMut, RigidBody, ShapeHandle};
use std::hash::{Hash, Hasher};

/// The kinds of entity in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// The player's ship
    Ship,
    /// A bullet fired by the ship
    Bullet,
    /// A tumbling asteroid
    Asteroid,
}

/// Player ship
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ship {
    body: BodyHandle,
    shape: ShapeHandle,
    thrust: f32,
    rotation_thrust: f32,
    lever: f32,
}

impl Ship {
    /// Creates a ship at rest, not yet added to the world
    pub fn new(world: &mut World, position: Vec2, config: &ShipConfig) -> WorldResult<Self> {
        let body = RigidBody::new(
            config.mass,
            moment_for_circle(config.mass, 0.0, config.radius),
            position,
        );
        let (body, shape) = world.create_entity(EntityKind::Ship, body, config.radius)?;

        Ok(Self {
            body,
            shape,
            thrust: config.thrust,
            rotation_thrust: config.rotation_thrust,
            lever: config.lever,
        })
    }

    /// Body handle
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Shape handle
    pub fn shape(&self) -> ShapeHandle {
        self.shape
    }

    /// Pushes the ship along its nose (local +y)
    pub fn accelerate(&self, body: &mut BodyMut<'_>, dt: f32) {
        body.apply_impulse_at_local_point(Vec2::new(0.0, dt * self.thrust), Vec2::zeros());
    }

    /// Spins counter-clockwise
    pub fn rotate_left(&self, body: &mut BodyMut<'_>, dt: f32) {
        body.apply_impulse_at_local_point(
            Vec2::new(0.0, dt * self.rotation_thrust),
            Vec2::new(self.lever, 0.0),
        );
    }

    /// Spins clockwise
    pub fn rotate_right(&self, body: &mut BodyMut<'_>, dt: f32) {
        body.apply_impulse_at_local_point(
            Vec2::new(0.0, dt * self.rotation_thrust),
            Vec2::new(-self.lever, 0.0),
        );
    }
}

/// Bullet projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    body: BodyHandle,
    shape: ShapeHandle,
}

impl Bullet {
    /// Creates a bullet already launched along `angle`'s nose direction
    pub fn new(world: &mut World, position: Vec2, angle: f32, config: &BulletConfig) -> WorldResult<Self> {
        let mut body = RigidBody::new(
            config.mass,
            moment_for_circle(config.mass, 0.0, config.radius),
            position,
        )
        .with_angle(angle);
        body.apply_impulse_at_local_point(Vec2::new(0.0, config.launch_impulse), Vec2::zeros());

        let (body, shape) = world.create_entity(EntityKind::Bullet, body, config.radius)?;
        Ok(Self { body, shape })
    }

    /// Body handle
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Shape handle
    pub fn shape(&self) -> ShapeHandle {
        self.shape
    }
}

/// Asteroid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Asteroid {
    body: BodyHandle,
    shape: ShapeHandle,
}

impl Asteroid {
    /// Creates an asteroid with `impulse` applied at the world point `lever_point`
    pub fn new(
        world: &mut World,
        position: Vec2,
        impulse: Vec2,
        lever_point: Vec2,
        config: &AsteroidConfig,
    ) -> WorldResult<Self> {
        let mut body = RigidBody::new(
            config.mass,
            moment_for_circle(config.mass, 0.0, config.radius),
            position,
        );
        body.apply_impulse_at_world_point(impulse, lever_point);

        let (body, shape) = world.create_entity(EntityKind::Asteroid, body, config.radius)?;
        Ok(Self { body, shape })
    }

    #[cfg(test)]
    pub(crate) fn with_body(self, body: BodyHandle) -> Self {
        Self { body, ..self }
    }

    /// Body handle
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Shape handle
    pub fn shape(&self) -> ShapeHandle {
        self.shape
    }
}

/// Any entity in the world
#[derive(Debug, Clone, Copy)]
pub enum Entity {
    /// Player ship
    Ship(Ship),
    /// Bullet
    Bullet(Bullet),
    /// Asteroid
    Asteroid(Asteroid),
}

impl Entity {
    /// Which kind of entity this is
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Ship(_) => EntityKind::Ship,
            Self::Bullet(_) => EntityKind::Bullet,
            Self::Asteroid(_) => EntityKind::Asteroid,
        }
    }

    /// Body handle
    pub fn body(&self) -> BodyHandle {
        match self {
            Self::Ship(ship) => ship.body(),
            Self::Bullet(bullet) => bullet.body(),
            Self::Asteroid(asteroid) => asteroid.body(),
        }
    }

    /// Shape handle, the entity's identity
    pub fn shape(&self) -> ShapeHandle {
        match self {
            Self::Ship(ship) => ship.shape(),
            Self::Bullet(bullet) => bullet.shape(),
            Self::Asteroid(asteroid) => asteroid.shape(),
        }
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.shape().hash(state);
    }
}

impl From<Ship> for Entity {
    fn from(ship: Ship) -> Self {
        Self::Ship(ship)
    }
}

impl From<Bullet> for Entity {
    fn from(bullet: Bullet) -> Self {
        Self::Bullet(bullet)
    }
}

impl From<Asteroid> for Entity {
    fn from(asteroid: Asteroid) -> Self {
        Self::Asteroid(asteroid)
    }
}
