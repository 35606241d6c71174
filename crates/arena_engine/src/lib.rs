//! # Arena Engine
//!
//! The collaborator layer underneath a small 2D arena game.
//!
//! ## Features
//!
//! - **Rigid-Body Space**: circle bodies and impulses on a rapier2d pipeline
//! - **Collision Phases**: begin / pre-solve / post-solve / separate events keyed
//!   by small integer collision types
//! - **Renderer Contract**: sprite registration and batched drawing, with a
//!   headless recording backend
//! - **Input Contract**: discrete press/release events for logical actions
//! - **Configuration**: TOML and RON loading for any serde config type
//!
//! ## Quick Start
//!
//! ```rust
//! use arena_engine::prelude::*;
//!
//! let mut space = Space::new();
//! let body = space
//!     .create_body(RigidBody::new(1.0, moment_for_circle(1.0, 0.0, 5.0), Vec2::zeros()))
//!     .unwrap();
//! let shape = space.create_shape(Shape::circle(body, 5.0, CollisionType(1))).unwrap();
//! space.add(body, shape).unwrap();
//! let contacts = space.step(1.0 / 30.0);
//! assert!(contacts.arbiters.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        foundation::{
            math::{heading, rotate, Vec2},
            time::{FixedTimestep, Timer},
        },
        input::{Action, InputEvent, InputMap, InputSource, KeyCode, ScriptedInput},
        physics::{
            moment_for_circle, Arbiter, Body, BodyHandle, BodyMut, CollisionPhase, CollisionType,
            Contacts, PhysicsError, RigidBody, Shape, ShapeHandle, ShapePair, Space,
        },
        render::{HeadlessRenderer, RenderError, Renderer, Sprite, TextAnchor},
    };
}
