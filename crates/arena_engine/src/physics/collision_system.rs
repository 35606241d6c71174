//! Contact bookkeeping between steps
//!
//! Detection itself is rapier's: its broad phase finds candidate pairs and its
//! narrow phase builds contact manifolds. This module turns what a step
//! reported into phase-ready data. The [`ContactCache`] remembers the
//! collision types of every touching pair, so a separation can still be keyed
//! after one of its shapes is gone, and keeps rejected pairs until they
//! separate.

use crate::foundation::math::Vec2;
use crate::physics::{BodyHandle, CollisionType, ShapeHandle};
use std::collections::{HashMap, HashSet};

/// Unordered pair of shapes (always stores the smaller handle first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapePair {
    /// Smaller handle
    pub a: ShapeHandle,
    /// Larger handle
    pub b: ShapeHandle,
}

impl ShapePair {
    /// Create a new pair in canonical order
    pub fn new(a: ShapeHandle, b: ShapeHandle) -> Self {
        if a.into_raw_parts() <= b.into_raw_parts() {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    /// Whether `shape` is one of the two
    pub fn contains(&self, shape: ShapeHandle) -> bool {
        self.a == shape || self.b == shape
    }

    /// Sort key giving pairs a deterministic order
    pub fn sort_key(&self) -> ((u32, u32), (u32, u32)) {
        (self.a.into_raw_parts(), self.b.into_raw_parts())
    }
}

/// One touching pair of shapes during a step
///
/// `shapes[0]` is the shape the normal points away from.
#[derive(Debug, Clone, PartialEq)]
pub struct Arbiter {
    /// The two shapes in contact
    pub shapes: [ShapeHandle; 2],
    /// Their owning bodies, index-aligned with `shapes`
    pub bodies: [BodyHandle; 2],
    /// Their collision types, index-aligned with `shapes`
    pub collision_types: [CollisionType; 2],
    /// Unit contact normal from `shapes[0]` to `shapes[1]`
    pub normal: Vec2,
    /// Overlap depth of the deepest contact point
    pub depth: f32,
    /// World-space contact point on `shapes[0]`
    pub point: Vec2,
    /// True on the step the pair started touching
    pub first_contact: bool,
    pub(crate) total_impulse: Vec2,
}

impl Arbiter {
    /// The canonical pair key
    pub fn pair(&self) -> ShapePair {
        ShapePair::new(self.shapes[0], self.shapes[1])
    }

    /// Impulse applied to `shapes[1]` by the step's solver (zero until solved)
    pub fn total_impulse(&self) -> Vec2 {
        self.total_impulse
    }

    /// Same contact seen from the other shape
    pub fn swapped(&self) -> Self {
        Self {
            shapes: [self.shapes[1], self.shapes[0]],
            bodies: [self.bodies[1], self.bodies[0]],
            collision_types: [self.collision_types[1], self.collision_types[0]],
            normal: -self.normal,
            total_impulse: -self.total_impulse,
            ..self.clone()
        }
    }

    /// Collision types index-aligned with `pair.a` and `pair.b`
    pub(crate) fn pair_types(&self) -> [CollisionType; 2] {
        if self.pair().a == self.shapes[0] {
            self.collision_types
        } else {
            [self.collision_types[1], self.collision_types[0]]
        }
    }
}

/// A pair that stopped touching
///
/// Collision types are remembered from the last contact since either shape
/// may already be gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separation {
    /// The pair in canonical order
    pub pair: ShapePair,
    /// Collision types of `pair.a` and `pair.b`
    pub collision_types: [CollisionType; 2],
}

impl Separation {
    /// Both shapes, index-aligned with `collision_types`
    pub fn shapes(&self) -> [ShapeHandle; 2] {
        [self.pair.a, self.pair.b]
    }
}

/// What one step reported
#[derive(Debug, Clone, Default)]
pub struct Contacts {
    /// Touching pairs that are not rejected, in pair order
    pub arbiters: Vec<Arbiter>,
    /// Pairs the step's solver resolved, carrying their impulse
    pub solved: Vec<Arbiter>,
    /// Pairs that stopped touching, including pairs of removed shapes
    pub separated: Vec<Separation>,
}

/// Tracks touching and rejected pairs across steps
#[derive(Debug, Default)]
pub struct ContactCache {
    touching: HashMap<ShapePair, [CollisionType; 2]>,
    rejected: HashSet<ShapePair>,
}

impl ContactCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a touching pair; `collision_types` are index-aligned with `pair.a` and `pair.b`
    pub fn touch(&mut self, pair: ShapePair, collision_types: [CollisionType; 2]) {
        self.touching.insert(pair, collision_types);
    }

    /// Forget a pair that stopped touching
    ///
    /// Returns `None` for a pair that was never recorded. Rejections are
    /// forgotten once a pair separates.
    pub fn separate(&mut self, pair: ShapePair) -> Option<Separation> {
        self.rejected.remove(&pair);
        self.touching
            .remove(&pair)
            .map(|collision_types| Separation { pair, collision_types })
    }

    /// Ignore this pair until it separates
    pub fn reject(&mut self, pair: ShapePair) {
        self.rejected.insert(pair);
    }

    /// Whether the pair was rejected and has not separated since
    pub fn is_rejected(&self, pair: &ShapePair) -> bool {
        self.rejected.contains(pair)
    }

    /// Whether the pair is touching
    pub fn is_touching(&self, pair: &ShapePair) -> bool {
        self.touching.contains_key(pair)
    }
}
