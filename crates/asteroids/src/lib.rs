//! # Asteroids
//!
//! Simulation core for a single-player asteroid arena.
//!
//! A [`world::World`] owns the physics space and the registry of live
//! entities. Two controllers populate it: the [`player::PlayerController`]
//! turns input into thrust, rotation and bullets, and the
//! [`spawner::SpawnerController`] launches asteroids from just outside the
//! screen. Collision handlers keyed by entity-kind pairs destroy bullets and
//! asteroids that meet and end the game when an asteroid strikes the ship.
//!
//! ```rust
//! use asteroids::prelude::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let renderer: SharedRenderer = Rc::new(RefCell::new(HeadlessRenderer::new()));
//! let config = GameConfig::default();
//! let mut game = Game::new(&config, renderer).unwrap();
//! game.handle_input(InputEvent::Pressed(Action::Fire));
//! game.tick(config.simulation.tick).unwrap();
//! assert!(!game.is_done());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod collision_types;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod entity;
pub mod error;
pub mod game;
pub mod player;
pub mod spawner;
pub mod termination;
pub mod world;

#[cfg(test)]
mod tests;

/// Common imports for hosts
pub mod prelude {
    pub use crate::{
        assets::SpriteSet,
        config::GameConfig,
        controller::{Controller, ControllerId, SharedRenderer},
        dispatch::{CollisionEvent, Resolved},
        entity::{Asteroid, Bullet, Entity, EntityKind, Ship},
        error::{GameError, TolerateStale, WorldError, WorldResult},
        game::Game,
        player::{Intents, PlayerController},
        spawner::SpawnerController,
        termination::TerminationState,
        world::{Bounds, World},
    };
    pub use arena_engine::prelude::*;
}
