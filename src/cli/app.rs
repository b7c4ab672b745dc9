//! Interactive shell runner

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::application::ports::{
    AudioCue, AudioCueType, CaptureBackend, ClipStorage, ConfigStore, PlaybackBackend,
};
use crate::application::{
    CoordinatorChannels, CoordinatorError, FrameTicker, Notification, SessionCoordinator,
    Transition,
};
use crate::domain::config::AppConfig;
use crate::domain::error::{ConfigError, StoreError};
use crate::domain::SessionKind;
use crate::infrastructure::{create_audio_cue, CpalCapture, RodioPlayback, TempDirStorage};

use super::presenter::Presenter;
use super::shell::ShellCommand;
use super::signals::ShutdownSignals;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;

/// Load the config file and merge: defaults < file < cli
pub async fn load_merged_config<S: ConfigStore>(
    store: &S,
    cli_config: AppConfig,
) -> Result<AppConfig, ConfigError> {
    let file_config = store.load().await?;
    Ok(AppConfig::defaults().merge(file_config).merge(cli_config))
}

/// Run the interactive shell until `quit`, end of input or a signal
pub async fn run_shell(config: AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();

    let mut signals = match ShutdownSignals::new() {
        Ok(signals) => signals,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let storage_dir = config.storage_dir_or_default();
    let storage = TempDirStorage::new(&storage_dir);
    let (coordinator, channels) =
        SessionCoordinator::new(CpalCapture::new(), RodioPlayback::new(), storage);
    let cue: Arc<dyn AudioCue> = Arc::from(create_audio_cue(config.cues_or_default()));

    let mut shell = Shell { coordinator, cue };

    info!(
        storage = %storage_dir.display(),
        frame_rate = config.frame_rate_or_default(),
        "Shell starting"
    );
    if !shell.coordinator.request_permission().await {
        presenter.warn("Microphone or speaker not available; recording is disabled");
    }
    presenter.info(&format!(
        "Clips are stored in {}. Type 'help' for commands.",
        storage_dir.display()
    ));

    let mut ticker = FrameTicker::new(config.frame_rate_or_default());
    let CoordinatorChannels {
        mut events,
        mut notifications,
    } = channels;
    let mut lines = spawn_line_reader();
    let mut exit = ExitCode::from(EXIT_SUCCESS);

    presenter.prompt();
    loop {
        tokio::select! {
            line = lines.recv() => match line {
                Some(Ok(line)) => {
                    match ShellCommand::parse(&line) {
                        Ok(ShellCommand::Quit) => break,
                        Ok(command) => shell.execute(command, &presenter).await,
                        Err(e) => presenter.error(&e.to_string()),
                    }
                    sync_frames(&shell, &mut ticker, &mut presenter);
                    presenter.prompt();
                }
                None => {
                    debug!("End of input");
                    break;
                }
                Some(Err(e)) => {
                    presenter.error(&format!("Failed to read input: {}", e));
                    exit = ExitCode::from(EXIT_ERROR);
                    break;
                }
            },
            Some(event) = events.recv() => {
                let _ = shell.coordinator.handle_event(event).await;
                sync_frames(&shell, &mut ticker, &mut presenter);
            }
            Some(notification) = notifications.recv() => {
                sync_frames(&shell, &mut ticker, &mut presenter);
                shell.present(notification, &presenter);
            }
            _ = ticker.tick() => {
                if let Some(progress) = shell.coordinator.progress() {
                    presenter.update_spinner(&presenter.format_progress(&progress));
                }
            }
            Some(reason) = signals.recv() => {
                info!(reason = reason.as_str(), "Shutting down");
                break;
            }
        }
    }

    shell.coordinator.shutdown().await;
    presenter.stop_spinner();
    exit
}

/// Forward stdin lines from a detached thread. The channel closes at end of input.
fn spawn_line_reader() -> mpsc::UnboundedReceiver<io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let failed = line.is_err();
            if tx.send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}

/// Keep the ticker and the timer line in step with the session
fn sync_frames<C, P, S>(
    shell: &Shell<C, P, S>,
    ticker: &mut FrameTicker,
    presenter: &mut Presenter,
) where
    C: CaptureBackend,
    P: PlaybackBackend,
    S: ClipStorage,
{
    let active = shell.coordinator.needs_frames();
    ticker.set_active(active);
    if active && !presenter.has_spinner() {
        presenter.start_spinner(&shell.coordinator.state().to_string());
    } else if !active && presenter.has_spinner() {
        presenter.stop_spinner();
    }
}

/// Coordinator plus UI feedback
struct Shell<C, P, S>
where
    C: CaptureBackend,
    P: PlaybackBackend,
    S: ClipStorage,
{
    coordinator: SessionCoordinator<C, P, S>,
    cue: Arc<dyn AudioCue>,
}

impl<C, P, S> Shell<C, P, S>
where
    C: CaptureBackend,
    P: PlaybackBackend,
    S: ClipStorage,
{
    async fn execute(&mut self, command: ShellCommand, presenter: &Presenter) {
        if let Err(e) = self.dispatch(command, presenter).await {
            presenter.error(&e.to_string());
        }
    }

    async fn dispatch(
        &mut self,
        command: ShellCommand,
        presenter: &Presenter,
    ) -> Result<(), CoordinatorError> {
        match command {
            ShellCommand::Record => {
                if self.coordinator.state().kind() == SessionKind::Capturing {
                    let _ = self.coordinator.stop_capture(true).await?;
                } else {
                    match self.coordinator.start_capture().await? {
                        Transition::Applied => {
                            presenter.info("Recording. Type 'record' or 'stop' to finish.")
                        }
                        Transition::Ignored => presenter.warn("Stop playback before recording"),
                    }
                }
            }
            ShellCommand::Stop => {
                if self.coordinator.state().kind() == SessionKind::Capturing {
                    let _ = self.coordinator.stop_capture(true).await?;
                } else if self.coordinator.stop_playback().await == Transition::Applied {
                    self.play_cue(AudioCueType::PlaybackStop);
                } else {
                    presenter.info("Nothing is running");
                }
            }
            ShellCommand::Discard => {
                if self.coordinator.stop_capture(false).await? == Transition::Ignored {
                    presenter.info("Not recording");
                }
            }
            ShellCommand::Play(index) => {
                let location = self.location_at(index)?;
                match self.coordinator.play(&location).await? {
                    Transition::Applied if self.coordinator.state().playing_target().is_some() => {
                        self.play_cue(AudioCueType::PlaybackStart);
                    }
                    Transition::Applied => self.play_cue(AudioCueType::PlaybackStop),
                    Transition::Ignored => presenter.warn("Stop recording before playing"),
                }
            }
            ShellCommand::List => {
                presenter.recordings(
                    self.coordinator.recordings(),
                    self.coordinator.state().playing_target(),
                );
            }
            ShellCommand::Rename { index, title } => {
                self.coordinator.rename(index, &title)?;
                presenter.success(&format!(
                    "Renamed recording {} to '{}'",
                    index + 1,
                    title.trim()
                ));
            }
            ShellCommand::Delete(index) => {
                let location = self.location_at(index)?;
                let removed = self.coordinator.delete(&location).await?;
                presenter.success(&format!("Deleted {}", removed.title()));
            }
            ShellCommand::Status => {
                presenter.status(
                    &self.coordinator.state().to_string(),
                    self.coordinator.affordances(),
                    self.coordinator.recordings().len(),
                );
            }
            ShellCommand::Help => presenter.help(),
            ShellCommand::Quit | ShellCommand::Empty => {}
        }
        Ok(())
    }

    /// Location of the recording at `index`, or an out-of-range error
    fn location_at(&self, index: usize) -> Result<PathBuf, CoordinatorError> {
        let recordings = self.coordinator.recordings();
        recordings
            .get(index)
            .map(|r| r.location().to_path_buf())
            .ok_or_else(|| {
                StoreError::IndexOutOfRange {
                    index,
                    len: recordings.len(),
                }
                .into()
            })
    }

    fn present(&self, notification: Notification, presenter: &Presenter) {
        match notification {
            Notification::CaptureFinished { success: true, .. } => {
                match self.coordinator.recordings().first() {
                    Some(recording) => {
                        presenter.capture_saved(recording.title(), recording.duration())
                    }
                    None => presenter.success("Recording saved"),
                }
            }
            Notification::CaptureFinished {
                success: false,
                reason: Some(reason),
            } => presenter.error(&format!("Recording failed: {}", reason)),
            Notification::CaptureFinished {
                success: false,
                reason: None,
            } => presenter.info("Recording discarded"),
            Notification::PlaybackFinished { .. } => {
                self.play_cue(AudioCueType::PlaybackStop);
            }
            Notification::PlaybackError { target, reason } => {
                self.play_cue(AudioCueType::PlaybackStop);
                presenter.error(&format!(
                    "Playback of {} failed: {}",
                    target.display(),
                    reason
                ));
            }
        }
    }

    /// Fire a cue without holding up the shell
    fn play_cue(&self, cue_type: AudioCueType) {
        let cue = Arc::clone(&self.cue);
        tokio::spawn(async move {
            if let Err(e) = cue.play(cue_type).await {
                warn!(error = %e, ?cue_type, "Audio cue failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::XdgConfigStore;

    #[tokio::test]
    async fn cli_overrides_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        store
            .save(&AppConfig {
                frame_rate: Some(30),
                cues: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();

        let cli = AppConfig {
            frame_rate: Some(120),
            ..Default::default()
        };
        let config = load_merged_config(&store, cli).await.unwrap();

        assert_eq!(config.frame_rate, Some(120));
        assert_eq!(config.cues, Some(true));
        assert_eq!(config.log_level, AppConfig::defaults().log_level);
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let config = load_merged_config(&store, AppConfig::empty()).await.unwrap();
        assert_eq!(config, AppConfig::defaults());
    }

    #[tokio::test]
    async fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "frame_rate = [").unwrap();
        let store = XdgConfigStore::with_path(path);
        assert!(load_merged_config(&store, AppConfig::empty()).await.is_err());
    }
}
