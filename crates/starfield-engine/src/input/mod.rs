pub mod hub;
pub mod snapshot;

pub use hub::{InputHub, PointerSubscription, ResizeSubscription};
pub use snapshot::{InputEvent, InputSnapshot};
