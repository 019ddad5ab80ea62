//! Flat frame buffer layout shared with the TypeScript replayer.
//! Must stay in sync with TypeScript `protocol.ts`.
//!
//! Layout (all values in f32 / 4 bytes):
//! ```text
//! [Header: 16 floats]
//! [Commands: command_count × 8 floats]
//! [Colors: color_count × 3 floats]
//! [Events: event_count × 4 floats]
//! ```
//!
//! Counts are written into the header every frame.
//! TypeScript reads them from the header to compute offsets dynamically.

use bytemuck::cast_slice;

use crate::api::types::{EventRecord, FrameTelemetry, Viewport};
use crate::renderer::camera::CameraSnapshot;
use crate::renderer::commands::DrawCommand;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_FPS: usize = 2;
pub const HEADER_TIER: usize = 3;
pub const HEADER_DEGRADED: usize = 4;
pub const HEADER_STAR_COUNT: usize = 5;
pub const HEADER_SCORE: usize = 6;
pub const HEADER_COMMAND_COUNT: usize = 7;
pub const HEADER_COLOR_COUNT: usize = 8;
pub const HEADER_EVENT_COUNT: usize = 9;
pub const HEADER_CAMERA_CX: usize = 10;
pub const HEADER_CAMERA_CY: usize = 11;
pub const HEADER_CAMERA_ZOOM: usize = 12;
pub const HEADER_VIEWPORT_WIDTH: usize = 13;
pub const HEADER_VIEWPORT_HEIGHT: usize = 14;
pub const HEADER_LABEL_COUNT: usize = 15;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per draw command (fixed wire format).
pub const COMMAND_FLOATS: usize = DrawCommand::FLOATS;

/// Floats per color table entry: r, g, b.
pub const COLOR_FLOATS: usize = 3;

/// Floats per event: kind, a, b, c (fixed wire format).
pub const EVENT_FLOATS: usize = EventRecord::FLOATS;

/// Everything that goes into the header besides the section counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameHeader {
    pub frame_counter: u64,
    pub telemetry: FrameTelemetry,
    pub camera: CameraSnapshot,
    pub viewport: Viewport,
    pub label_count: usize,
}

/// Section offsets for one frame's counts.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub command_count: usize,
    pub color_count: usize,
    pub event_count: usize,

    /// Offset (in floats) where command data begins.
    pub command_data_offset: usize,
    /// Offset (in floats) where color data begins.
    pub color_data_offset: usize,
    /// Offset (in floats) where event data begins.
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
}

impl ProtocolLayout {
    pub fn new(command_count: usize, color_count: usize, event_count: usize) -> Self {
        let command_data_offset = HEADER_FLOATS;
        let color_data_offset = command_data_offset + command_count * COMMAND_FLOATS;
        let event_data_offset = color_data_offset + color_count * COLOR_FLOATS;
        let buffer_total_floats = event_data_offset + event_count * EVENT_FLOATS;
        Self {
            command_count,
            color_count,
            event_count,
            command_data_offset,
            color_data_offset,
            event_data_offset,
            buffer_total_floats,
        }
    }

    pub fn buffer_total_bytes(&self) -> usize {
        self.buffer_total_floats * 4
    }
}

/// Write the header floats.
pub fn write_header(out: &mut [f32; HEADER_FLOATS], header: &FrameHeader, layout: &ProtocolLayout) {
    let t = &header.telemetry;
    out[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
    // f32 holds integers exactly up to 2^24; the counter wraps there.
    out[HEADER_FRAME_COUNTER] = (header.frame_counter % (1 << 24)) as f32;
    out[HEADER_FPS] = t.fps;
    out[HEADER_TIER] = t.tier.index() as f32;
    out[HEADER_DEGRADED] = if t.degraded { 1.0 } else { 0.0 };
    out[HEADER_STAR_COUNT] = t.stars as f32;
    out[HEADER_SCORE] = t.score as f32;
    out[HEADER_COMMAND_COUNT] = layout.command_count as f32;
    out[HEADER_COLOR_COUNT] = layout.color_count as f32;
    out[HEADER_EVENT_COUNT] = layout.event_count as f32;
    out[HEADER_CAMERA_CX] = header.camera.cx;
    out[HEADER_CAMERA_CY] = header.camera.cy;
    out[HEADER_CAMERA_ZOOM] = header.camera.zoom;
    out[HEADER_VIEWPORT_WIDTH] = header.viewport.width;
    out[HEADER_VIEWPORT_HEIGHT] = header.viewport.height;
    out[HEADER_LABEL_COUNT] = header.label_count as f32;
}

/// Pack a whole frame into `out`, replacing its contents. Returns the layout used.
pub fn pack_frame(
    out: &mut Vec<f32>,
    header: &FrameHeader,
    commands: &[DrawCommand],
    colors: &[f32],
    events: &[EventRecord],
) -> ProtocolLayout {
    let layout = ProtocolLayout::new(commands.len(), colors.len() / COLOR_FLOATS, events.len());
    let mut head = [0.0; HEADER_FLOATS];
    write_header(&mut head, header, &layout);

    out.clear();
    out.reserve(layout.buffer_total_floats);
    out.extend_from_slice(&head);
    out.extend_from_slice(cast_slice(commands));
    out.extend_from_slice(&colors[..layout.color_count * COLOR_FLOATS]);
    out.extend_from_slice(cast_slice(events));
    layout
}
