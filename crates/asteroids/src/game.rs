//! Game assembly
//!
//! Wires the world, the two controllers and the collision rules together and
//! runs one tick at a time: physics and collisions, then controllers, then
//! drawing.

use crate::config::GameConfig;
use crate::controller::SharedRenderer;
use crate::dispatch::CollisionEvent;
use crate::entity::{Entity, EntityKind};
use crate::error::{GameError, TolerateStale, WorldError, WorldResult};
use crate::player::PlayerController;
use crate::spawner::SpawnerController;
use crate::world::{Bounds, World};
use arena_engine::foundation::math::Vec2;
use arena_engine::input::InputEvent;
use arena_engine::physics::CollisionPhase;
use arena_engine::render::TextAnchor;
use std::cell::RefCell;
use std::rc::Rc;

/// Bullets and asteroids destroy each other without bouncing
fn destroy_both(world: &mut World, event: &CollisionEvent) -> WorldResult<bool> {
    for resolved in &event.resolved {
        world
            .delete_entity(resolved.controller, &resolved.entity)
            .tolerate_stale()?;
    }
    Ok(false)
}

/// An asteroid hitting the ship ends the game
fn end_game(world: &mut World, event: &CollisionEvent) -> WorldResult<bool> {
    if !event.resolved.is_empty() {
        log::info!("Ship hit by an asteroid");
        world.set_done();
    }
    Ok(true)
}

/// Culling bounds for a config
pub fn bounds_for(config: &GameConfig) -> Bounds {
    let margin = config.window.half_diagonal() + config.simulation.bounds_margin;
    if config.simulation.follow_camera {
        Bounds::AroundAnchor { radius: margin }
    } else {
        let (width, height) = config.window.size();
        Bounds::Region {
            min: Vec2::new(-margin, -margin),
            max: Vec2::new(width + margin, height + margin),
        }
    }
}

/// A running game
pub struct Game {
    world: World,
    player: Rc<RefCell<PlayerController>>,
    spawner: Rc<RefCell<SpawnerController>>,
    renderer: SharedRenderer,
    ticks: u64,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("world", &self.world)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Builds the world with the player at the window centre and the spawner around it
    pub fn new(config: &GameConfig, renderer: SharedRenderer) -> Result<Self, GameError> {
        config.validate()?;

        let mut world = World::new(bounds_for(config));
        world.register_kind(EntityKind::Asteroid);
        world.register_kind(EntityKind::Bullet);
        world.register_kind(EntityKind::Ship);

        let (center_x, center_y) = config.window.center();
        let center = Vec2::new(center_x, center_y);

        let player_renderer = Rc::clone(&renderer);
        let player = world.add_controller(|world, id| {
            PlayerController::new(world, id, center, config, player_renderer)
        })?;
        let ship = Entity::Ship(player.borrow().ship());
        world.set_anchor(&ship)?;

        let spawner_renderer = Rc::clone(&renderer);
        let spawner =
            world.add_controller(|_, id| Ok(SpawnerController::new(id, config, spawner_renderer)))?;

        world.add_collision_handler(
            EntityKind::Asteroid,
            EntityKind::Bullet,
            CollisionPhase::Begin,
            destroy_both,
        )?;
        world.add_collision_handler(
            EntityKind::Ship,
            EntityKind::Asteroid,
            CollisionPhase::PostSolve,
            end_game,
        )?;

        let label_renderer = Rc::clone(&renderer);
        world.on_done(move |state| {
            let text = format!("You stayed alive for {} seconds", state.whole_seconds());
            label_renderer
                .borrow_mut()
                .show_text(&text, center, TextAnchor::Center);
        });

        log::info!("Game ready: {:?}", world.bounds());
        Ok(Self {
            world,
            player,
            spawner,
            renderer,
            ticks: 0,
        })
    }

    /// Forwards an input event to the player
    pub fn handle_input(&mut self, event: InputEvent) {
        self.player.borrow_mut().handle_input(event);
    }

    /// Runs one tick: world step, controller steps, draw
    pub fn tick(&mut self, dt: f32) -> Result<(), GameError> {
        self.world.step(dt)?;
        self.world.step_controllers(dt)?;
        self.renderer
            .borrow_mut()
            .draw_all(self.world.space())
            .map_err(WorldError::from)?;
        self.ticks += 1;
        Ok(())
    }

    /// The world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The player controller
    pub fn player(&self) -> &Rc<RefCell<PlayerController>> {
        &self.player
    }

    /// The asteroid spawner
    pub fn spawner(&self) -> &Rc<RefCell<SpawnerController>> {
        &self.spawner
    }

    /// Whether the game has ended
    pub fn is_done(&self) -> bool {
        self.world.is_done()
    }

    /// Ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
