//! Physics module for rigid-body simulation and collision phases
//!
//! [`Space`] wraps a zero-gravity rapier2d pipeline with circle colliders and
//! reports per-pair collision phases keyed by integer [`CollisionType`]s.
//!
//! # Stepping model
//!
//! Rapier detects and solves contacts inside one pipeline step, so the caller
//! decides ahead of time which pairs may be solved:
//!
//! 1. [`Space::step`] runs the pipeline. Pairs the caller has not allowed
//!    since the previous step keep their contacts but get no response.
//! 2. The returned [`Contacts`] lists the pairs solved during the step
//!    (post-solve), the pairs that stopped touching (separate) and every
//!    touching pair that is not rejected, flagged on first contact (begin).
//! 3. For each touching pair the caller either calls [`Space::reject`], which
//!    ignores it until it separates, or [`Space::allow`], which lets the next
//!    step solve it.
//!
//! A shape may be removed while the caller walks the contacts. Arbiters
//! gathered before the removal still reference the removed shape, and its
//! separation is reported by the following step. Consumers must tolerate that.

pub mod body;
pub mod collision_system;
pub mod shape;
pub mod space;

pub use body::{moment_for_circle, Body, BodyMut, RigidBody};
pub use collision_system::{Arbiter, ContactCache, Contacts, Separation, ShapePair};
pub use shape::Shape;
pub use space::Space;

/// Handle to a rigid body stored in a [`Space`]
pub type BodyHandle = rapier2d::dynamics::RigidBodyHandle;

/// Handle to a collision shape stored in a [`Space`]
pub type ShapeHandle = rapier2d::geometry::ColliderHandle;

/// Small integer tag used to key the pairwise collision matrix
///
/// `CollisionType(0)` is the untyped default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CollisionType(pub u32);

impl std::fmt::Display for CollisionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point in a pair's collision lifecycle at which a callback may run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollisionPhase {
    /// Two shapes touched for the first time; rejecting ignores the pair until it separates
    Begin,
    /// The pair is touching; rejecting keeps the next step from solving it
    PreSolve,
    /// The pair's contact was solved during the step
    PostSolve,
    /// The pair stopped touching (or one of its shapes was removed)
    Separate,
}

impl CollisionPhase {
    /// All phases in lifecycle order
    pub const ALL: [Self; 4] = [Self::Begin, Self::PreSolve, Self::PostSolve, Self::Separate];
}

/// Physics errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Body handle does not refer to a body in this space
    #[error("Unknown body: {0:?}")]
    UnknownBody(BodyHandle),

    /// Shape handle does not refer to a shape in this space
    #[error("Unknown shape: {0:?}")]
    UnknownShape(ShapeHandle),

    /// Mass must be positive and finite
    #[error("Invalid mass: {0}")]
    InvalidMass(f32),

    /// Radius must be positive and finite
    #[error("Invalid radius: {0}")]
    InvalidRadius(f32),

    /// Shape was created for a different body
    #[error("Shape {shape:?} is not attached to body {body:?}")]
    ShapeBodyMismatch {
        /// Offending shape
        shape: ShapeHandle,
        /// Body it was paired with
        body: BodyHandle,
    },

    /// Shape is already part of the simulation
    #[error("Shape already added to the space: {0:?}")]
    AlreadyAdded(ShapeHandle),
}
