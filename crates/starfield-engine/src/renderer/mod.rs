pub mod camera;
pub mod commands;
pub mod draw;
pub mod traits;

pub use camera::{CameraNavigator, CameraSnapshot, CameraTarget};
pub use commands::{CommandBuffer, DrawCommand};
pub use draw::{draw_frame, FrameView};
pub use traits::Canvas;
