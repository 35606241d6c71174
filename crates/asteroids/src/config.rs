//! Game configuration
//!
//! Every section falls back to its defaults field by field, so a config file
//! only needs to list the values it changes.

use crate::assets::SpriteSet;
use arena_engine::config::{Config, ConfigError};
use serde::{Deserialize, Serialize};

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameConfig {
    /// Window settings
    pub window: WindowConfig,

    /// Simulation settings
    pub simulation: SimulationConfig,

    /// Player ship tuning
    pub ship: ShipConfig,

    /// Bullet tuning
    pub bullet: BulletConfig,

    /// Asteroid spawner tuning
    pub asteroid: AsteroidConfig,

    /// Sprites for every entity kind
    pub sprites: SpriteSet,
}

/// Window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width
    pub width: u32,

    /// Window height
    pub height: u32,
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Physics time step in seconds
    pub tick: f32,

    /// How far past the window edge entities may travel before culling
    pub bounds_margin: f32,

    /// Cull around the ship instead of around the window
    pub follow_camera: bool,

    /// Seed for the asteroid spawner (random when absent)
    pub seed: Option<u64>,

    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

/// Ship configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    /// Mass
    pub mass: f32,
    /// Collision radius
    pub radius: f32,
    /// Forward impulse per second of thrust
    pub thrust: f32,
    /// Turning impulse per second
    pub rotation_thrust: f32,
    /// Distance from the centre at which turning impulses are applied
    pub lever: f32,
}

/// Bullet configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    /// Mass
    pub mass: f32,
    /// Collision radius
    pub radius: f32,
    /// Forward impulse applied at launch
    pub launch_impulse: f32,
    /// Spawn distance in front of the ship
    pub standoff: f32,
    /// Maximum fire rate
    pub per_second: f32,
}

/// Asteroid configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidConfig {
    /// Mass
    pub mass: f32,
    /// Collision radius
    pub radius: f32,
    /// Spawn rate
    pub per_second: f32,
    /// Distance outside the window diagonal at which asteroids appear
    pub screen_offset: f32,
    /// Upper bound of the launch impulse
    pub max_accel: f32,
    /// Range of the off-centre lever used to set asteroids tumbling
    pub max_rot: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick: 1.0 / 30.0,
            bounds_margin: 300.0,
            follow_camera: false,
            seed: None,
            log_level: "info".to_string(),
        }
    }
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            mass: 10.0,
            radius: 30.0,
            thrust: 1000.0,
            rotation_thrust: 125.0,
            lever: 150.0,
        }
    }
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            mass: 0.1,
            radius: 1.0,
            launch_impulse: 100.0,
            standoff: 80.0,
            per_second: 6.0,
        }
    }
}

impl Default for AsteroidConfig {
    fn default() -> Self {
        Self {
            mass: 10.0,
            radius: 40.0,
            per_second: 3.0,
            screen_offset: 150.0,
            max_accel: 2500.0,
            max_rot: 150.0,
        }
    }
}

impl Config for GameConfig {}

impl WindowConfig {
    /// Window size as floats
    pub fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    /// Centre of the window
    pub fn center(&self) -> (f32, f32) {
        let (width, height) = self.size();
        (width / 2.0, height / 2.0)
    }

    /// Half the window diagonal
    pub fn half_diagonal(&self) -> f32 {
        let (width, height) = self.size();
        width.hypot(height) / 2.0
    }
}

impl GameConfig {
    /// Rejects values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field: field.to_string(),
                    reason: format!("must be positive, got {}", value),
                })
            }
        }
        fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field: field.to_string(),
                    reason: format!("must not be negative, got {}", value),
                })
            }
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid {
                field: "window".to_string(),
                reason: "window must have a non-zero size".to_string(),
            });
        }

        positive("simulation.tick", self.simulation.tick)?;
        non_negative("simulation.bounds_margin", self.simulation.bounds_margin)?;

        positive("ship.mass", self.ship.mass)?;
        positive("ship.radius", self.ship.radius)?;
        non_negative("ship.thrust", self.ship.thrust)?;
        non_negative("ship.rotation_thrust", self.ship.rotation_thrust)?;

        positive("bullet.mass", self.bullet.mass)?;
        positive("bullet.radius", self.bullet.radius)?;
        positive("bullet.per_second", self.bullet.per_second)?;
        non_negative("bullet.standoff", self.bullet.standoff)?;

        positive("asteroid.mass", self.asteroid.mass)?;
        positive("asteroid.radius", self.asteroid.radius)?;
        positive("asteroid.per_second", self.asteroid.per_second)?;
        non_negative("asteroid.screen_offset", self.asteroid.screen_offset)?;
        non_negative("asteroid.max_accel", self.asteroid.max_accel)?;
        non_negative("asteroid.max_rot", self.asteroid.max_rot)?;

        Ok(())
    }
}
