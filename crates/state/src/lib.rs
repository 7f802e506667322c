pub mod gesture;
pub mod media_item;
pub mod playback;
pub mod project;
pub mod timestamp;
pub mod zoom;

/// Timeline time in milliseconds. Signed so over-scroll positions stay representable.
pub type TimeMs = i64;
