#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    PreviewingFrame,
    Playing,
}

impl PlaybackState {
    pub fn is_playing(self) -> bool {
        self == PlaybackState::Playing
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::PreviewingFrame => write!(f, "previewing_frame"),
            PlaybackState::Playing => write!(f, "playing"),
        }
    }
}

/// Icon shown on the play control. Shows the action a click would take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayIcon {
    #[default]
    Play,
    Pause,
}

impl PlayIcon {
    pub fn for_state(state: PlaybackState) -> Self {
        match state {
            PlaybackState::Playing => PlayIcon::Pause,
            PlaybackState::Idle | PlaybackState::PreviewingFrame => PlayIcon::Play,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            PlayIcon::Play => PlayIcon::Pause,
            PlayIcon::Pause => PlayIcon::Play,
        }
    }
}
