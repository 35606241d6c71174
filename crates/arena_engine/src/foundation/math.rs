//! Math utilities and types
//!
//! Provides the 2D math types used by the physics space and the game layer.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Rotate a vector counter-clockwise by `angle` radians
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
}

/// Unit vector pointing along `angle` radians
pub fn heading(angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(cos, sin)
}

/// Scalar 2D cross product (z component of the 3D cross product)
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Cross product of a scalar angular term with a vector: `w × v`
pub fn cross_scalar(w: f32, v: Vec2) -> Vec2 {
    Vec2::new(-w * v.y, w * v.x)
}

/// Left-hand perpendicular of `v` (rotated by +90°)
pub fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Convert radians to degrees
pub fn to_degrees(radians: f32) -> f32 {
    radians.to_degrees()
}
