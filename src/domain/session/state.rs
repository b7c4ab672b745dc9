//! Session state machine

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Identity of one capture or playback session.
/// Backend events carry it so that events from a finished session can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Session kinds without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionKind {
    #[default]
    Idle,
    Capturing,
    Playing,
}

impl SessionKind {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::Playing => "playing",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current session. Capturing and Playing exclude each other by construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Capturing {
        session: SessionId,
    },
    Playing {
        session: SessionId,
        target: PathBuf,
    },
}

impl SessionState {
    /// Kind of the current state
    pub fn kind(&self) -> SessionKind {
        match self {
            Self::Idle => SessionKind::Idle,
            Self::Capturing { .. } => SessionKind::Capturing,
            Self::Playing { .. } => SessionKind::Playing,
        }
    }

    /// Active session, if any
    pub fn session(&self) -> Option<SessionId> {
        match self {
            Self::Idle => None,
            Self::Capturing { session } | Self::Playing { session, .. } => Some(*session),
        }
    }

    /// Location being played, if any
    pub fn playing_target(&self) -> Option<&Path> {
        match self {
            Self::Playing { target, .. } => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Capturing { session } => write!(f, "capturing ({})", session),
            Self::Playing { session, target } => {
                let name = target
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_else(|| target.to_string_lossy());
                write!(f, "playing {} ({})", name, session)
            }
        }
    }
}

/// Which user controls may currently be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordances {
    /// Record button (start or stop a capture)
    pub capture_enabled: bool,
    /// Play buttons on the list rows
    pub playback_enabled: bool,
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: SessionKind,
    pub action: String,
}

/// Session state machine.
///
/// State machine:
///   IDLE -> CAPTURING (begin_capture)
///   CAPTURING -> IDLE (end_capture)
///   IDLE -> PLAYING (begin_playback)
///   PLAYING -> IDLE (end_playback)
#[derive(Debug, Default)]
pub struct SessionMachine {
    state: SessionState,
    next_session: u64,
}

impl SessionMachine {
    /// Create a new machine in idle state
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            next_session: 0,
        }
    }

    /// Get the current state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Check if currently idle
    pub fn is_idle(&self) -> bool {
        self.state == SessionState::Idle
    }

    /// Check if currently capturing
    pub fn is_capturing(&self) -> bool {
        matches!(self.state, SessionState::Capturing { .. })
    }

    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        matches!(self.state, SessionState::Playing { .. })
    }

    /// Check whether `session` is the active one
    pub fn is_current(&self, session: SessionId) -> bool {
        self.state.session() == Some(session)
    }

    /// Controls the UI may offer in the current state.
    /// The record button stays usable while capturing so the capture can be stopped.
    pub fn affordances(&self) -> Affordances {
        Affordances {
            capture_enabled: !self.is_playing(),
            playback_enabled: !self.is_capturing(),
        }
    }

    /// Whether the recording at `location` may be deleted right now
    pub fn delete_allowed(&self, location: &Path) -> bool {
        self.state.playing_target() != Some(location)
    }

    /// Transition from IDLE to CAPTURING
    pub fn begin_capture(&mut self) -> Result<SessionId, InvalidStateTransition> {
        self.require_idle("start capture")?;
        let session = self.allocate();
        self.state = SessionState::Capturing { session };
        Ok(session)
    }

    /// Transition from CAPTURING to IDLE
    pub fn end_capture(&mut self, session: SessionId) -> Result<(), InvalidStateTransition> {
        match self.state {
            SessionState::Capturing { session: active } if active == session => {
                self.state = SessionState::Idle;
                Ok(())
            }
            _ => Err(self.invalid("stop capture")),
        }
    }

    /// Transition from IDLE to PLAYING
    pub fn begin_playback(
        &mut self,
        target: impl Into<PathBuf>,
    ) -> Result<SessionId, InvalidStateTransition> {
        self.require_idle("start playback")?;
        let session = self.allocate();
        self.state = SessionState::Playing {
            session,
            target: target.into(),
        };
        Ok(session)
    }

    /// Transition from PLAYING to IDLE, returning the played location
    pub fn end_playback(&mut self, session: SessionId) -> Result<PathBuf, InvalidStateTransition> {
        match std::mem::take(&mut self.state) {
            SessionState::Playing {
                session: active,
                target,
            } if active == session => Ok(target),
            other => {
                self.state = other;
                Err(self.invalid("stop playback"))
            }
        }
    }

    fn require_idle(&self, action: &str) -> Result<(), InvalidStateTransition> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.state.kind(),
            action: action.to_string(),
        }
    }

    fn allocate(&mut self) -> SessionId {
        let id = SessionId(self.next_session);
        self.next_session += 1;
        id
    }
}
