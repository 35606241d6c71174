//! Circle shape descriptors
//!
//! A [`Shape`] describes the collider a body gets when it is created in a
//! [`Space`](super::Space). The collider itself lives in rapier's collider set.

use crate::physics::{BodyHandle, CollisionType};

/// A circle collision shape centred on its body
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    body: BodyHandle,
    radius: f32,
    collision_type: CollisionType,
    elasticity: f32,
}

impl Shape {
    /// Creates a circle centred on the body's centre of gravity
    pub fn circle(body: BodyHandle, radius: f32, collision_type: CollisionType) -> Self {
        Self {
            body,
            radius,
            collision_type,
            elasticity: 0.0,
        }
    }

    /// Sets the restitution coefficient; pairs combine by multiplication
    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity;
        self
    }

    /// Owning body
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Circle radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Collision type used to key phase callbacks
    pub fn collision_type(&self) -> CollisionType {
        self.collision_type
    }

    /// Restitution coefficient
    pub fn elasticity(&self) -> f32 {
        self.elasticity
    }
}
