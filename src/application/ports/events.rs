//! Asynchronous backend events
//!
//! Audio backends run their streams on their own threads. Everything they
//! need to tell the coordinator after a call has returned goes through a
//! [`SessionSink`], which forwards onto the coordinator's event channel.

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::session::SessionId;

/// What happened to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEventKind {
    /// The encoder failed while capturing
    CaptureFailed(String),
    /// Playback reached the end of the clip
    PlaybackFinished,
    /// The clip could not be decoded during playback
    PlaybackFailed(String),
}

/// Event reported by a backend for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEvent {
    pub session: SessionId,
    pub kind: BackendEventKind,
}

/// One-shot reporter handed to a backend when a session is opened.
///
/// Every reporting method consumes the sink, so a session can report at
/// most once. A sink dropped without reporting means the session was
/// stopped on request.
#[derive(Debug)]
pub struct SessionSink {
    session: SessionId,
    tx: mpsc::UnboundedSender<BackendEvent>,
}

impl SessionSink {
    /// Create a sink for `session`
    pub fn new(session: SessionId, tx: mpsc::UnboundedSender<BackendEvent>) -> Self {
        Self { session, tx }
    }

    /// Session this sink reports for
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Report an asynchronous encoder failure
    pub fn capture_failed(self, reason: impl Into<String>) {
        self.send(BackendEventKind::CaptureFailed(reason.into()));
    }

    /// Report that playback reached the end of the clip
    pub fn playback_finished(self) {
        self.send(BackendEventKind::PlaybackFinished);
    }

    /// Report a decode failure during playback
    pub fn playback_failed(self, reason: impl Into<String>) {
        self.send(BackendEventKind::PlaybackFailed(reason.into()));
    }

    fn send(self, kind: BackendEventKind) {
        let event = BackendEvent {
            session: self.session,
            kind,
        };
        if self.tx.send(event).is_err() {
            debug!(session = %self.session, "Event receiver gone, dropping backend event");
        }
    }
}
