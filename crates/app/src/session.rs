use std::sync::Arc;

use wizard_state::playback::PlaybackState;
use wizard_state::project::ProjectId;
use wizard_state::TimeMs;

use crate::backend::ProjectModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) fn first() -> Self {
        Self(1)
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One continuous playback run. Exists from the accepted start request until
/// the engine stops it. Whether the backend is playing it yet is tracked by
/// the queue's [`PlaybackGate`](crate::request_queue::PlaybackGate).
pub struct PlaybackSession {
    pub id: SessionId,
    pub project: Arc<dyn ProjectModel>,
    pub from_ms: TimeMs,
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("id", &self.id)
            .field("project", &self.project.id())
            .field("from_ms", &self.from_ms)
            .finish()
    }
}

/// Idle / PreviewingFrame / Playing bookkeeping. Owned by the controlling
/// thread; the session's presence alone decides `Playing`.
#[derive(Debug)]
pub struct PlaybackMachine {
    session: Option<PlaybackSession>,
    next_session: SessionId,
    previewing: bool,
    latest_frame_seq: u64,
}

impl Default for PlaybackMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackMachine {
    pub fn new() -> Self {
        Self {
            session: None,
            next_session: SessionId::first(),
            previewing: false,
            latest_frame_seq: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        if self.session.is_some() {
            PlaybackState::Playing
        } else if self.previewing {
            PlaybackState::PreviewingFrame
        } else {
            PlaybackState::Idle
        }
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn playing_project(&self) -> Option<ProjectId> {
        self.session.as_ref().map(|s| s.project.id())
    }

    pub fn is_current(&self, id: SessionId) -> bool {
        self.session.as_ref().is_some_and(|s| s.id == id)
    }

    /// Creates the session. Callers stop any previous session first.
    pub fn start_session(&mut self, project: Arc<dyn ProjectModel>, from_ms: TimeMs) -> SessionId {
        let id = self.next_session;
        self.next_session = id.next();
        self.previewing = false;
        self.session = Some(PlaybackSession {
            id,
            project,
            from_ms,
        });
        id
    }

    pub fn end_session(&mut self) -> Option<PlaybackSession> {
        self.session.take()
    }

    /// Drops the session if it is still the current one.
    pub fn abort_session(&mut self, id: SessionId) -> Option<PlaybackSession> {
        if self.is_current(id) {
            self.session.take()
        } else {
            None
        }
    }

    /// Returns the sequence number to tag the new frame request with.
    pub fn begin_frame_preview(&mut self) -> u64 {
        self.latest_frame_seq += 1;
        if self.session.is_none() {
            self.previewing = true;
        }
        self.latest_frame_seq
    }

    /// Older sequence numbers were superseded and leave the state alone.
    pub fn frame_rendered(&mut self, seq: u64) -> bool {
        if seq == self.latest_frame_seq && self.previewing {
            self.previewing = false;
            return true;
        }
        false
    }

    /// Forces `Idle`, returning the session that was dropped.
    pub fn reset(&mut self) -> Option<PlaybackSession> {
        self.previewing = false;
        self.session.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedProject;

    fn project() -> Arc<dyn ProjectModel> {
        Arc::new(SimulatedProject::new(10_000))
    }

    #[test]
    fn session_presence_decides_playing() {
        let mut machine = PlaybackMachine::new();
        assert_eq!(machine.state(), PlaybackState::Idle);
        let id = machine.start_session(project(), 0);
        assert_eq!(machine.state(), PlaybackState::Playing);
        assert!(machine.is_current(id));
        assert!(machine.end_session().is_some());
        assert_eq!(machine.state(), PlaybackState::Idle);
        assert!(machine.end_session().is_none());
    }

    #[test]
    fn session_ids_are_unique() {
        let mut machine = PlaybackMachine::new();
        let first = machine.start_session(project(), 0);
        machine.end_session();
        let second = machine.start_session(project(), 0);
        assert_ne!(first, second);
        assert!(!machine.is_current(first));
    }

    #[test]
    fn abort_ignores_stale_session() {
        let mut machine = PlaybackMachine::new();
        let first = machine.start_session(project(), 0);
        machine.end_session();
        let second = machine.start_session(project(), 0);
        assert!(machine.abort_session(first).is_none());
        assert!(machine.is_playing());
        assert!(machine.abort_session(second).is_some());
        assert!(!machine.is_playing());
    }

    #[test]
    fn only_latest_frame_returns_to_idle() {
        let mut machine = PlaybackMachine::new();
        let a = machine.begin_frame_preview();
        let b = machine.begin_frame_preview();
        assert_eq!(machine.state(), PlaybackState::PreviewingFrame);
        assert!(!machine.frame_rendered(a));
        assert_eq!(machine.state(), PlaybackState::PreviewingFrame);
        assert!(machine.frame_rendered(b));
        assert_eq!(machine.state(), PlaybackState::Idle);
    }

    #[test]
    fn starting_playback_clears_preview_flag() {
        let mut machine = PlaybackMachine::new();
        machine.begin_frame_preview();
        machine.start_session(project(), 0);
        machine.end_session();
        assert_eq!(machine.state(), PlaybackState::Idle);
    }

    #[test]
    fn session_keeps_its_start_point() {
        let mut machine = PlaybackMachine::new();
        let id = machine.start_session(project(), 250);
        assert!(!machine.is_current(SessionId(999)));
        let session = machine.session().unwrap();
        assert_eq!(session.id, id);
        assert_eq!(session.from_ms, 250);
    }
}
