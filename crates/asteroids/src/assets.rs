//! Game asset definitions
//!
//! Sprite images for every entity kind. Paths are relative to the directory
//! the game is started from.

use arena_engine::render::Sprite;
use serde::{Deserialize, Serialize};

/// Ship image without thrust
pub const SHIP_IMAGE: &str = "images/spaceship.png";
/// Ship image while thrusting
pub const SHIP_THRUST_IMAGE: &str = "images/spaceship_thrust.png";
/// Bullet image
pub const BULLET_IMAGE: &str = "images/bullet.png";
/// Asteroid image
pub const ASTEROID_IMAGE: &str = "images/asteroid.png";

/// Sprites for every entity kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteSet {
    /// Ship at rest
    pub ship: Sprite,
    /// Ship while thrusting (same scale and z as `ship`)
    pub ship_thrust: Sprite,
    /// Bullets
    pub bullet: Sprite,
    /// Asteroids
    pub asteroid: Sprite,
}

impl Default for SpriteSet {
    fn default() -> Self {
        Self {
            ship: Sprite::new(SHIP_IMAGE, 0.5, 3),
            ship_thrust: Sprite::new(SHIP_THRUST_IMAGE, 0.5, 3),
            bullet: Sprite::new(BULLET_IMAGE, 1.0, 1),
            asteroid: Sprite::new(ASTEROID_IMAGE, 0.6, 2),
        }
    }
}

impl SpriteSet {
    /// Ship sprite for the given thrust state
    pub fn ship_for(&self, thrusting: bool) -> &Sprite {
        if thrusting {
            &self.ship_thrust
        } else {
            &self.ship
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_order() {
        let sprites = SpriteSet::default();
        assert!(sprites.bullet.z_index < sprites.asteroid.z_index);
        assert!(sprites.asteroid.z_index < sprites.ship.z_index);
        assert_eq!(sprites.ship_for(true).image, SHIP_THRUST_IMAGE);
    }
}
