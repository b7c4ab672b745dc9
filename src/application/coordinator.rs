//! Session coordinator use case
//!
//! Owns the recording store and the single active capture or playback
//! session, and routes backend events back into state changes.

use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::error::StoreError;
use crate::domain::recording::{ClipNamer, Duration, Recording, RecordingStore};
use crate::domain::session::{Affordances, InvalidStateTransition, SessionId, SessionMachine, SessionState};

use super::ports::{
    BackendEvent, BackendEventKind, CaptureBackend, CaptureError, ClipStorage, PlaybackBackend,
    PlaybackError, SessionSink, StorageError,
};

/// Errors from the coordinator
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Playback failed: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),
}

/// Outcome of a request that may not apply in the current state
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The request changed the session state
    Applied,
    /// The request is not valid in the current state and was dropped
    Ignored,
}

/// Notifications for the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A capture ended. `success` is true when a recording was added.
    CaptureFinished {
        success: bool,
        reason: Option<String>,
    },
    /// Playback of `target` reached its end
    PlaybackFinished { target: PathBuf },
    /// Playback of `target` failed while playing
    PlaybackError { target: PathBuf, reason: String },
}

/// Live value for the running timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Capturing(Duration),
    Playing { target: PathBuf, position: Duration },
}

/// Receiving ends handed to the UI loop
#[derive(Debug)]
pub struct CoordinatorChannels {
    /// Backend events; feed each one to [`SessionCoordinator::handle_event`]
    pub events: mpsc::UnboundedReceiver<BackendEvent>,
    /// Notifications for the UI
    pub notifications: mpsc::UnboundedReceiver<Notification>,
}

struct ActiveCapture<H> {
    session: SessionId,
    file_name: String,
    destination: PathBuf,
    handle: H,
}

struct ActivePlayback<H> {
    session: SessionId,
    handle: H,
}

/// Session coordinator
pub struct SessionCoordinator<C, P, S>
where
    C: CaptureBackend,
    P: PlaybackBackend,
    S: ClipStorage,
{
    capture: C,
    playback: P,
    storage: S,
    store: RecordingStore,
    namer: ClipNamer,
    machine: SessionMachine,
    permission: Option<bool>,
    active_capture: Option<ActiveCapture<C::Handle>>,
    active_playback: Option<ActivePlayback<P::Handle>>,
    events_tx: mpsc::UnboundedSender<BackendEvent>,
    notify_tx: mpsc::UnboundedSender<Notification>,
}

impl<C, P, S> SessionCoordinator<C, P, S>
where
    C: CaptureBackend,
    P: PlaybackBackend,
    S: ClipStorage,
{
    /// Create a coordinator with an empty store.
    ///
    /// Returns the coordinator and the channels the UI loop must drain.
    pub fn new(capture: C, playback: P, storage: S) -> (Self, CoordinatorChannels) {
        let (events_tx, events) = mpsc::unbounded_channel();
        let (notify_tx, notifications) = mpsc::unbounded_channel();

        let coordinator = Self {
            capture,
            playback,
            storage,
            store: RecordingStore::new(),
            namer: ClipNamer::new(),
            machine: SessionMachine::new(),
            permission: None,
            active_capture: None,
            active_playback: None,
            events_tx,
            notify_tx,
        };

        (
            coordinator,
            CoordinatorChannels {
                events,
                notifications,
            },
        )
    }

    /// Ask the capture backend for microphone access and remember the answer
    pub async fn request_permission(&mut self) -> bool {
        let granted = self.capture.request_permission().await;
        if granted {
            info!("Microphone access granted");
        } else {
            warn!("Microphone access denied");
        }
        self.permission = Some(granted);
        granted
    }

    /// Recordings, newest first
    pub fn recordings(&self) -> &[Recording] {
        self.store.recordings()
    }

    /// Current session state
    pub fn state(&self) -> &SessionState {
        self.machine.state()
    }

    /// Controls the UI may offer right now
    pub fn affordances(&self) -> Affordances {
        let mut affordances = self.machine.affordances();
        if self.permission == Some(false) {
            affordances.capture_enabled = false;
        }
        affordances
    }

    /// Whether the recording at `location` may be deleted right now
    pub fn delete_enabled(&self, location: &Path) -> bool {
        self.store.contains(location) && self.machine.delete_allowed(location)
    }

    /// Whether the frame ticker should run
    pub fn needs_frames(&self) -> bool {
        !self.machine.is_idle()
    }

    /// Elapsed capture time or playback position of the active session
    pub fn progress(&self) -> Option<Progress> {
        if let Some(active) = &self.active_capture {
            return Some(Progress::Capturing(self.capture.elapsed(&active.handle)));
        }
        let active = self.active_playback.as_ref()?;
        let target = self.machine.state().playing_target()?.to_path_buf();
        Some(Progress::Playing {
            target,
            position: self.playback.position(&active.handle),
        })
    }

    /// Start capturing into a freshly named clip file.
    ///
    /// Ignored unless idle. On failure the coordinator is back in idle and
    /// any partial file has been removed.
    #[instrument(skip(self))]
    pub async fn start_capture(&mut self) -> Result<Transition, CoordinatorError> {
        if !self.machine.is_idle() {
            warn!(state = %self.machine.state(), "Ignoring capture request");
            return Ok(Transition::Ignored);
        }

        let granted = match self.permission {
            Some(granted) => granted,
            None => self.request_permission().await,
        };
        if !granted {
            return Err(CaptureError::PermissionDenied.into());
        }

        self.storage.prepare().await?;

        let file_name = self.namer.next_name();
        let destination = self.storage.destination(&file_name);
        let session = self.machine.begin_capture()?;
        let sink = SessionSink::new(session, self.events_tx.clone());

        let mut handle = match self.capture.prepare(&destination, sink).await {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, "Failed to prepare capture");
                self.rollback_capture(session, &destination).await;
                return Err(e.into());
            }
        };

        if let Err(e) = self.capture.start(&mut handle).await {
            error!(error = %e, "Failed to start capture");
            if let Err(stop_err) = self.capture.stop(handle).await {
                debug!(error = %stop_err, "Stopping unstarted capture failed");
            }
            self.rollback_capture(session, &destination).await;
            return Err(e.into());
        }

        info!(%session, file = %file_name, "Capture started");
        self.active_capture = Some(ActiveCapture {
            session,
            file_name,
            destination,
            handle,
        });
        Ok(Transition::Applied)
    }

    /// Stop the active capture.
    ///
    /// With `keep` the clip becomes a new recording, otherwise it is
    /// discarded. Always ends in idle.
    #[instrument(skip(self))]
    pub async fn stop_capture(&mut self, keep: bool) -> Result<Transition, CoordinatorError> {
        let Some(active) = self.active_capture.take() else {
            warn!(state = %self.machine.state(), "Ignoring stop capture request");
            return Ok(Transition::Ignored);
        };
        self.finish_capture(active, keep, None).await?;
        Ok(Transition::Applied)
    }

    /// Play the recording at `location`.
    ///
    /// Playing the current target again stops it. Playing another target
    /// stops the current one first. Ignored while capturing.
    #[instrument(skip(self), fields(location = %location.display()))]
    pub async fn play(&mut self, location: &Path) -> Result<Transition, CoordinatorError> {
        if !self.store.contains(location) {
            return Err(StoreError::NotFound(location.display().to_string()).into());
        }
        if self.machine.is_capturing() {
            warn!("Ignoring playback request while capturing");
            return Ok(Transition::Ignored);
        }

        let current = self.machine.state().playing_target().map(Path::to_path_buf);
        if let Some(current) = current {
            let _ = self.stop_playback().await;
            if current == location {
                return Ok(Transition::Applied);
            }
        }

        let session = self.machine.begin_playback(location)?;
        let sink = SessionSink::new(session, self.events_tx.clone());

        let mut handle = match self.playback.load(location, sink).await {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, "Failed to load clip");
                self.rollback_playback(session);
                return Err(e.into());
            }
        };

        if let Err(e) = self.playback.play(&mut handle).await {
            error!(error = %e, "Failed to start playback");
            self.playback.stop(handle).await;
            self.rollback_playback(session);
            return Err(e.into());
        }

        info!(%session, "Playback started");
        self.active_playback = Some(ActivePlayback { session, handle });
        Ok(Transition::Applied)
    }

    /// Stop the active playback without notifying
    #[instrument(skip(self))]
    pub async fn stop_playback(&mut self) -> Transition {
        let Some(active) = self.active_playback.take() else {
            debug!("No playback to stop");
            return Transition::Ignored;
        };
        match self.machine.end_playback(active.session) {
            Ok(target) => info!(session = %active.session, clip = %target.display(), "Playback stopped"),
            Err(e) => warn!(error = %e, "Playback handle outlived its session"),
        }
        self.playback.stop(active.handle).await;
        Transition::Applied
    }

    /// Apply an event reported by a backend.
    ///
    /// Events for sessions that are no longer active are dropped.
    #[instrument(skip(self), fields(session = %event.session))]
    pub async fn handle_event(&mut self, event: BackendEvent) -> Transition {
        if !self.machine.is_current(event.session) {
            warn!(kind = ?event.kind, "Ignoring stale backend event");
            return Transition::Ignored;
        }

        match event.kind {
            BackendEventKind::CaptureFailed(reason) => {
                let Some(active) = self.active_capture.take() else {
                    warn!("Capture failure without an active capture");
                    return Transition::Ignored;
                };
                error!(%reason, "Capture failed while recording");
                if let Err(e) = self.finish_capture(active, false, Some(reason)).await {
                    warn!(error = %e, "Stopping failed capture reported an error");
                }
                Transition::Applied
            }
            BackendEventKind::PlaybackFinished => self.finish_playback(event.session, None).await,
            BackendEventKind::PlaybackFailed(reason) => {
                error!(%reason, "Playback failed while playing");
                self.finish_playback(event.session, Some(reason)).await
            }
        }
    }

    /// Rename the recording at `index`
    #[instrument(skip(self))]
    pub fn rename(&mut self, index: usize, title: &str) -> Result<(), CoordinatorError> {
        self.store.rename(index, title)?;
        info!("Recording renamed");
        Ok(())
    }

    /// Delete the recording at `location` together with its file.
    ///
    /// A file that is already gone still lets the entry go. Any other
    /// storage failure leaves the store untouched.
    #[instrument(skip(self), fields(location = %location.display()))]
    pub async fn delete(&mut self, location: &Path) -> Result<Recording, CoordinatorError> {
        if !self.store.contains(location) {
            return Err(StoreError::NotFound(location.display().to_string()).into());
        }
        if !self.machine.delete_allowed(location) {
            return Err(StoreError::InPlayback.into());
        }

        match self.storage.remove(location).await {
            Ok(()) => {}
            Err(StorageError::NotFound(path)) => {
                warn!(%path, "Clip file already gone, dropping recording");
            }
            Err(e) => return Err(e.into()),
        }
        let recording = self.store.remove(location)?;
        info!("Recording deleted");
        Ok(recording)
    }

    /// Stop whatever is running. An in-flight capture is kept.
    pub async fn shutdown(&mut self) {
        if self.active_capture.is_some() {
            if let Err(e) = self.stop_capture(true).await {
                warn!(error = %e, "Failed to finish capture on shutdown");
            }
        }
        let _ = self.stop_playback().await;
        debug!(recordings = self.store.len(), "Coordinator shut down");
    }

    async fn finish_capture(
        &mut self,
        active: ActiveCapture<C::Handle>,
        keep: bool,
        failure: Option<String>,
    ) -> Result<(), CoordinatorError> {
        if let Err(e) = self.machine.end_capture(active.session) {
            warn!(error = %e, "Capture handle outlived its session");
        }

        let duration = match self.capture.stop(active.handle).await {
            Ok(duration) => duration,
            Err(e) => {
                self.discard_clip(&active.destination).await;
                self.notify(Notification::CaptureFinished {
                    success: false,
                    reason: Some(failure.unwrap_or_else(|| e.to_string())),
                });
                return Err(e.into());
            }
        };

        if !keep {
            info!(session = %active.session, "Capture discarded");
            self.discard_clip(&active.destination).await;
            self.notify(Notification::CaptureFinished {
                success: false,
                reason: failure,
            });
            return Ok(());
        }

        let recording = Recording::new(
            active.file_name,
            Local::now(),
            duration,
            active.destination.clone(),
        );
        if let Err(e) = self.store.append(recording) {
            self.discard_clip(&active.destination).await;
            self.notify(Notification::CaptureFinished {
                success: false,
                reason: Some(e.to_string()),
            });
            return Err(e.into());
        }

        info!(session = %active.session, %duration, "Capture saved");
        self.notify(Notification::CaptureFinished {
            success: true,
            reason: None,
        });
        Ok(())
    }

    async fn finish_playback(&mut self, session: SessionId, failure: Option<String>) -> Transition {
        let active = match self.active_playback.take() {
            Some(active) if active.session == session => active,
            other => {
                self.active_playback = other;
                warn!("Playback event without a matching playback");
                return Transition::Ignored;
            }
        };

        let target = match self.machine.end_playback(session) {
            Ok(target) => target,
            Err(e) => {
                warn!(error = %e, "Playback handle outlived its session");
                self.playback.stop(active.handle).await;
                return Transition::Ignored;
            }
        };
        self.playback.stop(active.handle).await;

        let notification = match failure {
            None => {
                info!(clip = %target.display(), "Playback finished");
                Notification::PlaybackFinished { target }
            }
            Some(reason) => Notification::PlaybackError { target, reason },
        };
        self.notify(notification);
        Transition::Applied
    }

    async fn rollback_capture(&mut self, session: SessionId, destination: &Path) {
        if let Err(e) = self.machine.end_capture(session) {
            warn!(error = %e, "Failed to roll back capture state");
        }
        self.discard_clip(destination).await;
    }

    fn rollback_playback(&mut self, session: SessionId) {
        if let Err(e) = self.machine.end_playback(session) {
            warn!(error = %e, "Failed to roll back playback state");
        }
    }

    async fn discard_clip(&self, location: &Path) {
        if !self.storage.exists(location) {
            return;
        }
        if let Err(e) = self.storage.remove(location).await {
            warn!(error = %e, "Failed to remove discarded clip");
        }
    }

    fn notify(&self, notification: Notification) {
        if self.notify_tx.send(notification).is_err() {
            debug!("Notification receiver gone");
        }
    }
}
