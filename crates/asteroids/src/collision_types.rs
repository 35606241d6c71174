//! Mapping from entity kinds to physics collision types
//!
//! The physics space keys its pairwise callbacks by small integers, so every
//! kind gets one in first-registration order, starting at 1.

use crate::error::RegistryError;
use arena_engine::physics::CollisionType;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Bijection between kinds and collision types
#[derive(Debug, Clone)]
pub struct CollisionTypeRegistry<K> {
    types: HashMap<K, CollisionType>,
    kinds: Vec<K>,
}

impl<K> Default for CollisionTypeRegistry<K> {
    fn default() -> Self {
        Self {
            types: HashMap::new(),
            kinds: Vec::new(),
        }
    }
}

impl<K: Copy + Eq + Hash + Debug> CollisionTypeRegistry<K> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the kind's collision type, assigning the next one on first call
    pub fn register(&mut self, kind: K) -> CollisionType {
        if let Some(&existing) = self.types.get(&kind) {
            return existing;
        }

        self.kinds.push(kind);
        let assigned = CollisionType(self.kinds.len() as u32);
        self.types.insert(kind, assigned);
        log::debug!("Registered {:?} as collision type {}", kind, assigned);
        assigned
    }

    /// Collision type of a registered kind
    pub fn type_of(&self, kind: K) -> Result<CollisionType, RegistryError> {
        self.types
            .get(&kind)
            .copied()
            .ok_or_else(|| RegistryError::UnregisteredKind(format!("{:?}", kind)))
    }

    /// Reverse lookup
    pub fn kind_of(&self, collision_type: CollisionType) -> Option<K> {
        let index = (collision_type.0 as usize).checked_sub(1)?;
        self.kinds.get(index).copied()
    }

    /// Whether `kind` has been registered
    pub fn contains(&self, kind: K) -> bool {
        self.types.contains_key(&kind)
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
