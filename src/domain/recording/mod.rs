//! Recording domain module

mod duration;
mod entity;
mod naming;
mod store;

pub use duration::Duration;
pub use entity::Recording;
pub use naming::{ClipNamer, CLIP_BASE_NAME, CLIP_EXTENSION};
pub use store::RecordingStore;
