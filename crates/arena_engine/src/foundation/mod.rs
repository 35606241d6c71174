//! Shared building blocks: 2D math aliases, frame pacing and logger setup

pub mod logging;
pub mod math;
pub mod time;
