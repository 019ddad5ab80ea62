use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::traits::Canvas;
use crate::components::color::Rgba;

/// One recorded canvas call, read by the host from linear memory.
/// Must match the TypeScript replayer: 8 floats = 32 bytes stride.
///
/// Operand meaning depends on `op`:
/// - `CLEAR`: none
/// - `TRANSLATE`: a, b = offset
/// - `SCALE`: a = factor
/// - `FILL_CIRCLE`: a, b = center, c = radius
/// - `STROKE_CIRCLE`: a, b = center, c = radius, d = line width
/// - `LINE`: a, b = from, c, d = to, e = line width
/// - `TEXT`: a, b = position, c = font size, d = label index
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DrawCommand {
    pub op: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    /// Index into the buffer's color table.
    pub color: f32,
    pub alpha: f32,
}

impl DrawCommand {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub const CLEAR: f32 = 0.0;
    pub const SAVE: f32 = 1.0;
    pub const RESTORE: f32 = 2.0;
    pub const TRANSLATE: f32 = 3.0;
    pub const SCALE: f32 = 4.0;
    pub const FILL_CIRCLE: f32 = 5.0;
    pub const STROKE_CIRCLE: f32 = 6.0;
    pub const LINE: f32 = 7.0;
    pub const TEXT: f32 = 8.0;

    fn op(op: f32) -> Self {
        Self { op, ..Default::default() }
    }
}

/// Recording `Canvas`. Holds the commands of the last drawn frame plus the
/// color and label tables they index into.
pub struct CommandBuffer {
    pub commands: Vec<DrawCommand>,
    /// Opaque RGB of every color referenced this frame (alpha travels per command).
    pub colors: Vec<Rgba>,
    pub labels: Vec<String>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::with_capacity(2048)
    }

    pub fn with_capacity(commands: usize) -> Self {
        Self {
            commands: Vec::with_capacity(commands),
            colors: Vec::with_capacity(32),
            labels: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.commands.clear();
        self.colors.clear();
        self.labels.clear();
    }

    pub fn command_count(&self) -> u32 {
        self.commands.len() as u32
    }

    /// Count of commands with the given opcode.
    pub fn count_op(&self, op: f32) -> usize {
        self.commands.iter().filter(|c| c.op == op).count()
    }

    /// Raw pointer to command data for the host's linear-memory reads.
    pub fn commands_ptr(&self) -> *const f32 {
        self.commands.as_ptr() as *const f32
    }

    /// Color table flattened to `r, g, b` triples.
    pub fn color_floats(&self) -> Vec<f32> {
        self.colors.iter().flat_map(|c| [c.r, c.g, c.b]).collect()
    }

    fn color_index(&mut self, color: Rgba) -> f32 {
        let opaque = color.with_alpha(1.0);
        let idx = match self.colors.iter().position(|c| *c == opaque) {
            Some(i) => i,
            None => {
                self.colors.push(opaque);
                self.colors.len() - 1
            }
        };
        idx as f32
    }

    fn push_colored(&mut self, mut cmd: DrawCommand, color: Rgba) {
        cmd.color = self.color_index(color);
        cmd.alpha = color.a;
        self.commands.push(cmd);
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas for CommandBuffer {
    fn clear(&mut self, color: Rgba) {
        self.reset();
        self.push_colored(DrawCommand::op(DrawCommand::CLEAR), color);
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::op(DrawCommand::SAVE));
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::op(DrawCommand::RESTORE));
    }

    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand {
            a: offset.x,
            b: offset.y,
            ..DrawCommand::op(DrawCommand::TRANSLATE)
        });
    }

    fn scale(&mut self, factor: f32) {
        self.commands.push(DrawCommand {
            a: factor,
            ..DrawCommand::op(DrawCommand::SCALE)
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let cmd = DrawCommand {
            a: center.x,
            b: center.y,
            c: radius,
            ..DrawCommand::op(DrawCommand::FILL_CIRCLE)
        };
        self.push_colored(cmd, color);
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        let cmd = DrawCommand {
            a: center.x,
            b: center.y,
            c: radius,
            d: width,
            ..DrawCommand::op(DrawCommand::STROKE_CIRCLE)
        };
        self.push_colored(cmd, color);
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        let cmd = DrawCommand {
            a: from.x,
            b: from.y,
            c: to.x,
            d: to.y,
            e: width,
            ..DrawCommand::op(DrawCommand::LINE)
        };
        self.push_colored(cmd, color);
    }

    fn text(&mut self, pos: Vec2, text: &str, size: f32, color: Rgba) {
        self.labels.push(text.to_string());
        let cmd = DrawCommand {
            a: pos.x,
            b: pos.y,
            c: size,
            d: (self.labels.len() - 1) as f32,
            ..DrawCommand::op(DrawCommand::TEXT)
        };
        self.push_colored(cmd, color);
    }
}
