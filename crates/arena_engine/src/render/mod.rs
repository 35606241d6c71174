//! Rendering contract
//!
//! The simulation never draws anything itself. It registers a sprite per body
//! and asks the renderer to draw every registered body once per tick, reading
//! transforms straight from the [`Space`].

pub mod headless;

pub use headless::{DrawCommand, HeadlessRenderer, Label};

use crate::foundation::math::Vec2;
use crate::physics::{BodyHandle, Space};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Image drawn for a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Image path relative to the asset root
    pub image: String,
    /// Uniform scale applied to the image
    pub scale: f32,
    /// Draw order; higher values are drawn later (on top)
    pub z_index: i32,
}

impl Sprite {
    /// Creates a sprite description
    pub fn new(image: impl Into<String>, scale: f32, z_index: i32) -> Self {
        Self {
            image: image.into(),
            scale,
            z_index,
        }
    }
}

/// Which point of a text label sits on its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAnchor {
    /// Label centred on the position
    #[default]
    Center,
    /// Label starts at the position
    Left,
    /// Label ends at the position
    Right,
}

/// Rendering error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The body has no sprite registered
    #[error("No sprite registered for body {0:?}")]
    NotRegistered(BodyHandle),

    /// Backend-specific failure while drawing
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Display backend used by the simulation
pub trait Renderer {
    /// Registers (or replaces) the sprite drawn for `body`
    fn register(&mut self, body: BodyHandle, sprite: Sprite);

    /// Stops drawing `body`
    ///
    /// # Errors
    ///
    /// [`RenderError::NotRegistered`] if the body has no sprite.
    fn unregister(&mut self, body: BodyHandle) -> RenderResult<()>;

    /// Draws every registered body at its current transform
    ///
    /// # Errors
    ///
    /// Backend failures only; bodies missing from `space` are skipped.
    fn draw_all(&mut self, space: &Space) -> RenderResult<()>;

    /// Shows a text label until the renderer is dropped
    fn show_text(&mut self, text: &str, position: Vec2, anchor: TextAnchor);
}
