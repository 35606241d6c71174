//! Headless renderer
//!
//! Records what a sprite batch would draw instead of drawing it. Used by the
//! headless host and by tests that assert on registrations and labels.

use super::{RenderError, RenderResult, Renderer, Sprite, TextAnchor};
use crate::foundation::math::{to_degrees, Vec2};
use crate::physics::{BodyHandle, Space};
use std::collections::HashMap;

/// One sprite draw of the last frame
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Body the sprite follows
    pub body: BodyHandle,
    /// Image drawn
    pub image: String,
    /// Sprite centre in world space
    pub position: Vec2,
    /// Clockwise rotation in degrees, as y-up sprite batches expect
    pub rotation: f32,
    /// Sprite scale
    pub scale: f32,
    /// Draw order
    pub z_index: i32,
}

/// A text label shown on screen
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// Label text
    pub text: String,
    /// Anchor point in screen space
    pub position: Vec2,
    /// How the text sits on its anchor point
    pub anchor: TextAnchor,
}

/// Renderer that records draw commands instead of presenting them
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    sprites: HashMap<BodyHandle, (u64, Sprite)>,
    next_sequence: u64,
    last_frame: Vec<DrawCommand>,
    frame_count: u64,
    labels: Vec<Label>,
}

impl HeadlessRenderer {
    /// Create a renderer with nothing registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a sprite is registered for `body`
    pub fn is_registered(&self, body: BodyHandle) -> bool {
        self.sprites.contains_key(&body)
    }

    /// Sprite currently registered for `body`
    pub fn sprite(&self, body: BodyHandle) -> Option<&Sprite> {
        self.sprites.get(&body).map(|(_, sprite)| sprite)
    }

    /// Number of registered sprites
    pub fn registered_count(&self) -> usize {
        self.sprites.len()
    }

    /// Draw commands of the most recent frame, back to front
    pub fn last_frame(&self) -> &[DrawCommand] {
        &self.last_frame
    }

    /// Frames drawn so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Labels shown so far
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }
}

impl Renderer for HeadlessRenderer {
    fn register(&mut self, body: BodyHandle, sprite: Sprite) {
        // replacing keeps the original draw sequence
        let sequence = match self.sprites.get(&body) {
            Some((sequence, _)) => *sequence,
            None => {
                self.next_sequence += 1;
                self.next_sequence
            }
        };
        log::trace!("Registered sprite {} for {:?}", sprite.image, body);
        self.sprites.insert(body, (sequence, sprite));
    }

    fn unregister(&mut self, body: BodyHandle) -> RenderResult<()> {
        self.sprites
            .remove(&body)
            .map(|_| ())
            .ok_or(RenderError::NotRegistered(body))
    }

    fn draw_all(&mut self, space: &Space) -> RenderResult<()> {
        let mut ordered: Vec<(&BodyHandle, &(u64, Sprite))> = self.sprites.iter().collect();
        ordered.sort_by_key(|(_, (sequence, sprite))| (sprite.z_index, *sequence));

        let mut frame = Vec::with_capacity(ordered.len());
        for (&body, (_, sprite)) in ordered {
            let Some(rigid_body) = space.body(body) else {
                log::warn!("Skipping sprite {} for missing body {:?}", sprite.image, body);
                continue;
            };
            frame.push(DrawCommand {
                body,
                image: sprite.image.clone(),
                position: rigid_body.position(),
                rotation: -to_degrees(rigid_body.angle()),
                scale: sprite.scale,
                z_index: sprite.z_index,
            });
        }

        self.frame_count += 1;
        log::trace!("Frame {}: {} sprites", self.frame_count, frame.len());
        self.last_frame = frame;
        Ok(())
    }

    fn show_text(&mut self, text: &str, position: Vec2, anchor: TextAnchor) {
        log::info!("{}", text);
        self.labels.push(Label {
            text: text.to_owned(),
            position,
            anchor,
        });
    }
}
