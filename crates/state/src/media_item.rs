use uuid::Uuid;

use crate::TimeMs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaItemId(Uuid);

impl MediaItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MediaItemId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaItemKind {
    VideoClip,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaItemInfo {
    pub id: MediaItemId,
    pub kind: MediaItemKind,
    pub begin_ms: TimeMs,
    pub duration_ms: TimeMs,
}

impl MediaItemInfo {
    pub fn is_video_clip(&self) -> bool {
        self.kind == MediaItemKind::VideoClip
    }

    pub fn end_ms(&self) -> TimeMs {
        self.begin_ms + self.duration_ms
    }
}
