//! Drawing surface abstraction.
//!
//! The engine never talks to a concrete 2D API. The draw pass issues calls on
//! a `Canvas`; the web bridge uses the recording `CommandBuffer` and replays
//! it onto a Canvas2D context in TypeScript.

use glam::Vec2;

use crate::components::color::Rgba;

/// Minimal immediate-mode 2D surface. Transforms stack with `save`/`restore`.
pub trait Canvas {
    /// Start a new frame: fill everything with `color`.
    fn clear(&mut self, color: Rgba);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn scale(&mut self, factor: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba);
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);
    fn text(&mut self, pos: Vec2, text: &str, size: f32, color: Rgba);
}
