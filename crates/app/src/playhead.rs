use wizard_state::TimeMs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayheadSource {
    UserScroll,
    Seek,
    /// Progress reported by the backend during playback. Never moves the viewport.
    PlaybackTick,
}

impl PlayheadSource {
    pub fn recenters_viewport(self) -> bool {
        !matches!(self, PlayheadSource::PlaybackTick)
    }
}

/// The authoritative playhead. Only the controlling thread writes it.
#[derive(Debug, Default)]
pub struct PlayheadSync {
    current_ms: Option<TimeMs>,
}

impl PlayheadSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> TimeMs {
        self.current_ms.unwrap_or(0)
    }

    /// Accepts `time_ms` when it differs from the current value and lies in
    /// `[0, duration_ms]`. Out-of-range values are normal during over-scroll.
    pub fn try_set(&mut self, time_ms: TimeMs, duration_ms: TimeMs) -> bool {
        if self.current_ms == Some(time_ms) {
            return false;
        }
        if time_ms < 0 || time_ms > duration_ms {
            return false;
        }
        self.current_ms = Some(time_ms);
        true
    }

    /// Forgets the current value so the next valid write always lands.
    pub fn reset(&mut self) {
        self.current_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_value_is_a_no_op() {
        let mut sync = PlayheadSync::new();
        assert!(sync.try_set(1500, 10_000));
        assert!(!sync.try_set(1500, 10_000));
        assert_eq!(sync.current(), 1500);
    }

    #[test]
    fn rejects_out_of_range() {
        let mut sync = PlayheadSync::new();
        assert!(sync.try_set(200, 10_000));
        assert!(!sync.try_set(-1, 10_000));
        assert!(!sync.try_set(10_001, 10_000));
        assert_eq!(sync.current(), 200);
    }

    #[test]
    fn both_bounds_are_inclusive() {
        let mut sync = PlayheadSync::new();
        assert!(sync.try_set(0, 10_000));
        assert!(sync.try_set(10_000, 10_000));
    }

    #[test]
    fn reset_allows_rewriting_same_value() {
        let mut sync = PlayheadSync::new();
        assert!(sync.try_set(300, 1000));
        sync.reset();
        assert!(sync.try_set(300, 1000));
    }

    #[test]
    fn ticks_do_not_recenter() {
        assert!(PlayheadSource::UserScroll.recenters_viewport());
        assert!(PlayheadSource::Seek.recenters_viewport());
        assert!(!PlayheadSource::PlaybackTick.recenters_viewport());
    }
}
