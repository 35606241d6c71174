//! Asteroid spawner
//!
//! Asteroids appear on a circle just outside the visible area, centred on the
//! anchor, and are launched roughly inwards with a random off-centre impulse
//! that sets them tumbling.

use crate::config::{AsteroidConfig, GameConfig};
use crate::controller::{Controller, ControllerId, SharedRenderer};
use crate::entity::{Asteroid, Entity};
use crate::error::WorldResult;
use crate::world::World;
use arena_engine::foundation::math::{heading, perpendicular, Vec2};
use arena_engine::physics::ShapeHandle;
use arena_engine::render::Sprite;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Controller that periodically launches asteroids
pub struct SpawnerController {
    id: ControllerId,
    rng: StdRng,
    accumulator: f32,
    interval: f32,
    spawn_radius: f32,
    outer_radius: f32,
    center: Vec2,
    asteroid: AsteroidConfig,
    sprite: Sprite,
    asteroids: HashSet<ShapeHandle>,
    renderer: SharedRenderer,
}

impl std::fmt::Debug for SpawnerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnerController")
            .field("id", &self.id)
            .field("spawn_radius", &self.spawn_radius)
            .field("asteroids", &self.asteroids.len())
            .finish_non_exhaustive()
    }
}

impl SpawnerController {
    /// Creates a spawner; seeded from `config.simulation.seed` when present
    pub fn new(id: ControllerId, config: &GameConfig, renderer: SharedRenderer) -> Self {
        let rng = match config.simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (center_x, center_y) = config.window.center();
        let spawn_radius = config.window.half_diagonal() + config.asteroid.screen_offset;

        Self {
            id,
            rng,
            accumulator: 0.0,
            interval: 1.0 / config.asteroid.per_second,
            spawn_radius,
            outer_radius: spawn_radius + config.asteroid.screen_offset,
            center: Vec2::new(center_x, center_y),
            asteroid: config.asteroid.clone(),
            sprite: config.sprites.asteroid.clone(),
            asteroids: HashSet::new(),
            renderer,
        }
    }

    /// The controller's id
    pub fn id(&self) -> ControllerId {
        self.id
    }

    /// Distance from the anchor at which asteroids appear
    pub fn spawn_radius(&self) -> f32 {
        self.spawn_radius
    }

    /// Distance from the anchor within which spawned asteroids are expected to live
    pub fn outer_radius(&self) -> f32 {
        self.outer_radius
    }

    /// Number of live asteroids
    pub fn asteroid_count(&self) -> usize {
        self.asteroids.len()
    }

    fn spawn(&mut self, world: &mut World) -> WorldResult<()> {
        let origin = world.anchor_position().unwrap_or(self.center);
        let theta = self.rng.gen_range(0.0..TAU);
        let position = origin + heading(theta) * self.spawn_radius;

        // inward, give or take a quarter turn
        let direction = heading(theta + PI + self.rng.gen_range(-FRAC_PI_2..=FRAC_PI_2));
        let magnitude = self.rng.gen_range(0.0..=self.asteroid.max_accel);
        let half_rot = self.asteroid.max_rot / 2.0;
        let offset = self.rng.gen_range(-half_rot..=half_rot);

        let asteroid = Asteroid::new(
            world,
            position,
            direction * magnitude,
            position + perpendicular(direction) * offset,
            &self.asteroid,
        )?;
        world.add(Entity::Asteroid(asteroid), self.id)?;
        self.asteroids.insert(asteroid.shape());
        self.renderer
            .borrow_mut()
            .register(asteroid.body(), self.sprite.clone());
        log::debug!("Spawned asteroid at {:?}", position);
        Ok(())
    }
}

impl Controller for SpawnerController {
    fn step(&mut self, world: &mut World, dt: f32) -> WorldResult<()> {
        self.accumulator += dt;
        if self.accumulator < self.interval {
            return Ok(());
        }
        self.accumulator = 0.0;
        self.spawn(world)
    }

    fn delete(&mut self, world: &mut World, entity: &Entity) -> WorldResult<()> {
        let Entity::Asteroid(asteroid) = entity else {
            return Ok(());
        };
        if !self.asteroids.contains(&asteroid.shape()) {
            return Ok(());
        }

        world.remove(entity, self.id)?;
        self.asteroids.remove(&asteroid.shape());
        if let Err(e) = self.renderer.borrow_mut().unregister(asteroid.body()) {
            log::debug!("Asteroid already hidden: {}", e);
        }
        Ok(())
    }
}
