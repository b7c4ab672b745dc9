//! Clip playback using rodio

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::application::ports::{PlaybackBackend, PlaybackError, SessionSink};
use crate::domain::recording::Duration;

/// How often the playback thread refreshes the position
const POSITION_POLL: std::time::Duration = std::time::Duration::from_millis(15);

enum Command {
    Play,
    Stop,
}

/// Loaded clip on its playback thread
pub struct RodioPlaybackHandle {
    commands: std_mpsc::Sender<Command>,
    position_ms: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl Drop for RodioPlaybackHandle {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Stop);
    }
}

/// Playback backend on the default output device.
///
/// Each clip gets its own thread since `rodio::OutputStream` is not `Send`.
pub struct RodioPlayback;

impl RodioPlayback {
    /// Create a new rodio-based playback backend
    pub fn new() -> Self {
        Self
    }

    fn open(location: &Path) -> Result<(OutputStream, Sink), PlaybackError> {
        let file = File::open(location)
            .map_err(|e| PlaybackError::OpenFailed(format!("{}: {}", location.display(), e)))?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| PlaybackError::DecodeFailed(e.to_string()))?;

        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| PlaybackError::OpenFailed(e.to_string()))?;
        let sink =
            Sink::try_new(&stream_handle).map_err(|e| PlaybackError::OpenFailed(e.to_string()))?;

        sink.pause();
        sink.append(source);
        Ok((stream, sink))
    }

    /// Play until the clip ends or a stop arrives.
    /// Only a natural end is reported through the session sink.
    fn run(
        location: PathBuf,
        session: SessionSink,
        commands: std_mpsc::Receiver<Command>,
        position_ms: Arc<AtomicU64>,
        ready: oneshot::Sender<Result<(), PlaybackError>>,
    ) {
        let (_stream, sink) = match Self::open(&location) {
            Ok(opened) => {
                let _ = ready.send(Ok(()));
                opened
            }
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };

        let mut started = false;
        loop {
            match commands.recv_timeout(POSITION_POLL) {
                Ok(Command::Play) => {
                    sink.play();
                    started = true;
                }
                Ok(Command::Stop) | Err(RecvTimeoutError::Disconnected) => {
                    sink.stop();
                    debug!(clip = %location.display(), "Playback stopped");
                    return;
                }
                Err(RecvTimeoutError::Timeout) => {}
            }

            position_ms.store(sink.get_pos().as_millis() as u64, Ordering::SeqCst);

            if started && sink.empty() {
                debug!(clip = %location.display(), "Playback reached end of clip");
                session.playback_finished();
                return;
            }
        }
    }
}

impl Default for RodioPlayback {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaybackBackend for RodioPlayback {
    type Handle = RodioPlaybackHandle;

    async fn load(
        &self,
        location: &Path,
        sink: SessionSink,
    ) -> Result<Self::Handle, PlaybackError> {
        let (commands_tx, commands_rx) = std_mpsc::channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let position_ms = Arc::new(AtomicU64::new(0));

        let worker = {
            let location = location.to_path_buf();
            let position_ms = Arc::clone(&position_ms);
            std::thread::Builder::new()
                .name("playback".into())
                .spawn(move || RodioPlayback::run(location, sink, commands_rx, position_ms, ready_tx))
                .map_err(|e| PlaybackError::OpenFailed(e.to_string()))?
        };

        match ready_rx.await {
            Ok(Ok(())) => {
                info!(clip = %location.display(), "Clip loaded");
                Ok(RodioPlaybackHandle {
                    commands: commands_tx,
                    position_ms,
                    worker: Some(worker),
                })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PlaybackError::OpenFailed(
                "Playback thread exited early".into(),
            )),
        }
    }

    async fn play(&self, handle: &mut Self::Handle) -> Result<(), PlaybackError> {
        handle
            .commands
            .send(Command::Play)
            .map_err(|_| PlaybackError::OpenFailed("Playback thread is gone".into()))
    }

    async fn stop(&self, mut handle: Self::Handle) {
        let _ = handle.commands.send(Command::Stop);
        if let Some(worker) = handle.worker.take() {
            match tokio::task::spawn_blocking(move || worker.join()).await {
                Ok(Ok(())) => {}
                _ => warn!("Playback thread did not shut down cleanly"),
            }
        }
        handle.position_ms.store(0, Ordering::SeqCst);
    }

    fn position(&self, handle: &Self::Handle) -> Duration {
        Duration::from_millis(handle.position_ms.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SessionMachine;
    use tokio::sync::mpsc;

    fn sink() -> SessionSink {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = SessionMachine::new().begin_playback("/tmp/x.wav").unwrap();
        SessionSink::new(session, tx)
    }

    #[tokio::test]
    async fn missing_file_fails_to_open() {
        let playback = RodioPlayback::new();
        let result = playback
            .load(Path::new("/nonexistent/recording_0.wav"), sink())
            .await;
        assert!(matches!(result, Err(PlaybackError::OpenFailed(_))));
    }

    #[tokio::test]
    async fn garbage_file_fails_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recording_0.wav");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let playback = RodioPlayback::new();
        let result = playback.load(&path, sink()).await;
        assert!(matches!(result, Err(PlaybackError::DecodeFailed(_))));
    }

    #[tokio::test]
    #[ignore = "Requires audio hardware"]
    async fn plays_to_the_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recording_0.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..4410 * 2 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = SessionMachine::new().begin_playback(&path).unwrap();
        let playback = RodioPlayback::new();
        let mut handle = playback
            .load(&path, SessionSink::new(session, tx))
            .await
            .unwrap();
        playback.play(&mut handle).await.unwrap();

        let event = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.session, session);
        playback.stop(handle).await;
    }
}
