pub mod api;
pub mod bridge;
pub mod components;
pub mod core;
pub mod engine;
pub mod error;
pub mod input;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::{ColorScheme, StarfieldConfig};
pub use api::handle::StarfieldHandle;
pub use api::types::{
    BlackHoleId, EventRecord, FocusChange, FrameTelemetry, HoverTarget, PlanetId, StarfieldEvent, SunId, Viewport,
};
pub use bridge::protocol::{pack_frame, FrameHeader, ProtocolLayout};
pub use components::seed::SceneSeed;
pub use core::performance::PerformanceTier;
pub use core::scheduler::{
    AnimationScheduler, FrameHandle, FrameHost, FrameInfo, FrameOutcome, FrameRequest, QueuedFrameHost, SchedulerState,
    Simulation,
};
pub use engine::Starfield;
pub use error::{EngineError, EngineResult};
pub use input::{InputEvent, PointerSubscription, ResizeSubscription};
pub use renderer::camera::CameraSnapshot;
pub use renderer::commands::{CommandBuffer, DrawCommand};
pub use renderer::traits::Canvas;
