//! Error types for the simulation core

use crate::controller::ControllerId;
use crate::entity::EntityKind;
use arena_engine::config::ConfigError;
use arena_engine::physics::{PhysicsError, ShapeHandle};
use arena_engine::render::RenderError;
use thiserror::Error;

/// Collision type registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// `type_of` was asked about a kind that was never registered
    #[error("Kind {0} has not been registered")]
    UnregisteredKind(String),
}

/// World errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    /// Collision type lookup failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An entity was constructed before its kind was registered
    #[error("Cannot create {0:?}: kind not registered with the world")]
    EntityNotRegistered(EntityKind),

    /// The entity's shape is already in the registry
    #[error("Entity with shape {0:?} is already in the world")]
    DuplicateEntity(ShapeHandle),

    /// No live entity owns this shape
    #[error("No entity with shape {0:?}")]
    NotFound(ShapeHandle),

    /// Controller id was never handed out by this world
    #[error("Unknown controller {0:?}")]
    UnknownController(ControllerId),

    /// Controller is currently stepping and cannot be re-entered
    #[error("Controller {0:?} is already borrowed")]
    ControllerBusy(ControllerId),

    /// Physics space rejected the operation
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    /// Renderer rejected the operation
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

impl WorldError {
    /// Whether this is the recoverable "shape already removed" case
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Swallows [`WorldError::NotFound`] where a stale shape is expected
///
/// Collision phases can fire for a pair after one of its shapes was removed
/// earlier in the same step.
pub trait TolerateStale<T> {
    /// `Ok(None)` for `NotFound`, everything else passes through
    fn tolerate_stale(self) -> Result<Option<T>, WorldError>;
}

impl<T> TolerateStale<T> for Result<T, WorldError> {
    fn tolerate_stale(self) -> Result<Option<T>, WorldError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(WorldError::NotFound(shape)) => {
                log::trace!("Ignoring stale shape {:?}", shape);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Top-level game errors
#[derive(Error, Debug)]
pub enum GameError {
    /// Simulation failure
    #[error("World error: {0}")]
    World(#[from] WorldError),

    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for world operations
pub type WorldResult<T> = Result<T, WorldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_tolerated() {
        let shape = ShapeHandle::from_raw_parts(7, 0);
        let result: WorldResult<()> = Err(WorldError::NotFound(shape));
        assert_eq!(result.tolerate_stale(), Ok(None));
    }

    #[test]
    fn test_other_errors_pass_through() {
        let result: WorldResult<()> = Err(WorldError::EntityNotRegistered(EntityKind::Ship));
        assert_eq!(
            result.tolerate_stale(),
            Err(WorldError::EntityNotRegistered(EntityKind::Ship))
        );
    }
}
