//! Microphone capture using cpal
//!
//! Clips are written as 16-bit PCM WAV at 44.1 kHz stereo:
//! - mono input is duplicated, extra channels are dropped
//! - device audio is resampled with rubato as it arrives
//! - samples are written with hound while capturing, so memory stays flat
//!   and the file header is refreshed about once a second

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::JoinHandle;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use hound::{WavSpec, WavWriter};
use rubato::{FftFixedIn, Resampler};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::application::ports::{
    CaptureBackend, CaptureError, SessionSink, CLIP_BITS_PER_SAMPLE, CLIP_CHANNELS,
    CLIP_SAMPLE_RATE,
};
use crate::domain::recording::Duration;

/// How often the stream thread checks whether it should exit
const STREAM_POLL: std::time::Duration = std::time::Duration::from_millis(20);

/// Resampler input chunk, in frames
const RESAMPLE_CHUNK: usize = 1024;

type ClipWriter = WavWriter<BufWriter<File>>;

/// State shared between a handle and its stream thread
struct StreamShared {
    /// Device sample rate, set once the stream is open
    device_sample_rate: AtomicU32,
    /// Whether incoming audio is kept
    capturing: AtomicBool,
    /// Whether the stream thread keeps the stream alive
    running: AtomicBool,
    /// Stereo frames captured so far, at the device rate
    frames: AtomicU64,
    /// Reporter for stream errors, taken by the first error
    sink: StdMutex<Option<SessionSink>>,
}

impl StreamShared {
    fn new(sink: SessionSink) -> Self {
        Self {
            device_sample_rate: AtomicU32::new(0),
            capturing: AtomicBool::new(false),
            running: AtomicBool::new(true),
            frames: AtomicU64::new(0),
            sink: StdMutex::new(Some(sink)),
        }
    }

    /// Count and forward one stereo chunk while capturing
    fn push(&self, stereo: Vec<i16>, chunks: &std_mpsc::Sender<Vec<i16>>) {
        if !self.capturing.load(Ordering::SeqCst) || stereo.is_empty() {
            return;
        }
        self.frames
            .fetch_add((stereo.len() / 2) as u64, Ordering::SeqCst);
        let _ = chunks.send(stereo);
    }

    fn report_failure(&self, reason: String) {
        let sink = self.sink.lock().ok().and_then(|mut slot| slot.take());
        if let Some(sink) = sink {
            warn!(session = %sink.session(), %reason, "Reporting capture failure");
            sink.capture_failed(reason);
        }
    }
}

/// Open capture stream with its destination file
pub struct CpalCaptureHandle {
    shared: Arc<StreamShared>,
    worker: Option<JoinHandle<Result<(), CaptureError>>>,
    destination: PathBuf,
}

impl Drop for CpalCaptureHandle {
    fn drop(&mut self) {
        self.shared.capturing.store(false, Ordering::SeqCst);
        self.shared.running.store(false, Ordering::SeqCst);
    }
}

/// Capture backend using the default cpal input device.
///
/// The stream lives on its own thread because `cpal::Stream` is not `Send`.
/// The same thread encodes the clip.
pub struct CpalCapture;

impl CpalCapture {
    /// Create a new cpal-based capture backend
    pub fn new() -> Self {
        Self
    }

    /// Get the default input device
    fn get_input_device() -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or(CaptureError::NoAudioDevice)
    }

    /// Get a suitable input configuration, preferring 44.1 kHz stereo
    fn get_input_config(
        device: &cpal::Device,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| CaptureError::OpenFailed(format!("Failed to get configs: {}", e)))?;

        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    let better_rate =
                        includes_clip_rate(&config) && !includes_clip_rate(current);
                    let better_channels = config.channels() == CLIP_CHANNELS
                        && current.channels() != CLIP_CHANNELS
                        && includes_clip_rate(&config) == includes_clip_rate(current);
                    better_rate || better_channels
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config.ok_or(CaptureError::OpenFailed(
            "No suitable config found".into(),
        ))?;

        let sample_rate = if includes_clip_rate(&config_range) {
            SampleRate(CLIP_SAMPLE_RATE)
        } else {
            config_range.max_sample_rate()
        };

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Build and play the input stream, then encode until `running` clears
    fn run_stream(
        shared: Arc<StreamShared>,
        writer: ClipWriter,
        ready: oneshot::Sender<Result<(), CaptureError>>,
    ) -> Result<(), CaptureError> {
        let (chunks_tx, chunks) = std_mpsc::channel();
        let opened = Self::get_input_device().and_then(|device| {
            let (config, sample_format) = Self::get_input_config(&device)?;
            let converter = ClipConverter::new(config.sample_rate.0)?;
            let stream = Self::build_stream(&device, &config, sample_format, &shared, chunks_tx)?;
            stream
                .play()
                .map_err(|e| CaptureError::OpenFailed(e.to_string()))?;
            shared
                .device_sample_rate
                .store(config.sample_rate.0, Ordering::SeqCst);
            debug!(
                sample_rate = config.sample_rate.0,
                channels = config.channels,
                ?sample_format,
                "Input stream open"
            );
            Ok((stream, converter))
        });

        let (stream, converter) = match opened {
            Ok(opened) => {
                let _ = ready.send(Ok(()));
                opened
            }
            Err(e) => {
                let _ = ready.send(Err(e));
                return Ok(());
            }
        };

        let encoded = encode_stream(&chunks, &shared.running, writer, converter);
        drop(stream);
        debug!("Input stream closed");

        if let Err(e) = &encoded {
            error!(error = %e, "Clip encoding failed");
            shared.report_failure(e.to_string());
        }
        encoded
    }

    fn build_stream(
        device: &cpal::Device,
        config: &StreamConfig,
        sample_format: SampleFormat,
        shared: &Arc<StreamShared>,
        chunks: std_mpsc::Sender<Vec<i16>>,
    ) -> Result<cpal::Stream, CaptureError> {
        let channels = config.channels;
        let on_error = {
            let shared = Arc::clone(shared);
            move |err: cpal::StreamError| {
                error!(error = %err, "Audio stream error");
                shared.report_failure(err.to_string());
            }
        };

        let stream = match sample_format {
            SampleFormat::I16 => {
                let shared = Arc::clone(shared);
                device.build_input_stream(
                    config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        shared.push(to_stereo(data, channels), &chunks);
                    },
                    on_error,
                    None,
                )
            }
            SampleFormat::F32 => {
                let shared = Arc::clone(shared);
                device.build_input_stream(
                    config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let i16_data: Vec<i16> =
                            data.iter().map(|&s| (s * 32767.0) as i16).collect();
                        shared.push(to_stereo(&i16_data, channels), &chunks);
                    },
                    on_error,
                    None,
                )
            }
            _ => {
                return Err(CaptureError::OpenFailed(
                    "Unsupported sample format".into(),
                ))
            }
        };

        stream.map_err(|e| CaptureError::OpenFailed(e.to_string()))
    }

    /// Check that capture and playback devices can both be used
    fn check_devices() -> bool {
        let host = cpal::default_host();
        let Some(input) = host.default_input_device() else {
            warn!("No input device");
            return false;
        };
        if let Err(e) = input.default_input_config() {
            warn!(error = %e, "Input device unusable");
            return false;
        }
        let Some(output) = host.default_output_device() else {
            warn!("No output device");
            return false;
        };
        if let Err(e) = output.default_output_config() {
            warn!(error = %e, "Output device unusable");
            return false;
        }
        true
    }
}

impl Default for CpalCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureBackend for CpalCapture {
    type Handle = CpalCaptureHandle;

    async fn request_permission(&self) -> bool {
        tokio::task::spawn_blocking(Self::check_devices)
            .await
            .unwrap_or(false)
    }

    async fn prepare(
        &self,
        destination: &Path,
        sink: SessionSink,
    ) -> Result<Self::Handle, CaptureError> {
        let writer = WavWriter::create(destination, clip_spec())
            .map_err(|e| CaptureError::OpenFailed(format!("{}: {}", destination.display(), e)))?;

        let shared = Arc::new(StreamShared::new(sink));
        let (ready_tx, ready_rx) = oneshot::channel();
        let worker = {
            let shared = Arc::clone(&shared);
            std::thread::Builder::new()
                .name("capture-stream".into())
                .spawn(move || CpalCapture::run_stream(shared, writer, ready_tx))
                .map_err(|e| CaptureError::OpenFailed(e.to_string()))?
        };

        let mut handle = CpalCaptureHandle {
            shared,
            worker: Some(worker),
            destination: destination.to_path_buf(),
        };

        match ready_rx.await {
            Ok(Ok(())) => {
                info!(destination = %destination.display(), "Capture prepared");
                Ok(handle)
            }
            Ok(Err(e)) => {
                let _ = join_worker(&mut handle).await;
                Err(e)
            }
            Err(_) => Err(CaptureError::OpenFailed(
                "Capture thread exited early".into(),
            )),
        }
    }

    async fn start(&self, handle: &mut Self::Handle) -> Result<(), CaptureError> {
        if !handle.shared.running.load(Ordering::SeqCst) {
            return Err(CaptureError::OpenFailed("Capture stream is closed".into()));
        }
        handle.shared.capturing.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self, mut handle: Self::Handle) -> Result<Duration, CaptureError> {
        handle.shared.capturing.store(false, Ordering::SeqCst);
        join_worker(&mut handle).await?;

        let duration = self.elapsed(&handle);
        info!(destination = %handle.destination.display(), %duration, "Clip written");
        Ok(duration)
    }

    fn elapsed(&self, handle: &Self::Handle) -> Duration {
        let sample_rate = handle.shared.device_sample_rate.load(Ordering::SeqCst);
        Duration::from_frames(handle.shared.frames.load(Ordering::SeqCst), sample_rate)
    }
}

/// Stop the stream thread and collect its encoding result
async fn join_worker(handle: &mut CpalCaptureHandle) -> Result<(), CaptureError> {
    handle.shared.running.store(false, Ordering::SeqCst);
    let Some(worker) = handle.worker.take() else {
        return Ok(());
    };
    match tokio::task::spawn_blocking(move || worker.join()).await {
        Ok(Ok(result)) => result,
        _ => {
            warn!("Capture thread did not shut down cleanly");
            Err(CaptureError::EncodeFailed(
                "Capture thread did not shut down cleanly".into(),
            ))
        }
    }
}

/// Write chunks as they arrive until `running` clears, then flush the
/// resampler and finish the file
fn encode_stream(
    chunks: &std_mpsc::Receiver<Vec<i16>>,
    running: &AtomicBool,
    mut writer: ClipWriter,
    mut converter: ClipConverter,
) -> Result<(), CaptureError> {
    let mut unflushed = 0usize;
    let mut write = |writer: &mut ClipWriter, samples: Vec<i16>| -> Result<(), CaptureError> {
        for &sample in &samples {
            writer.write_sample(sample).map_err(encode_error)?;
        }
        unflushed += samples.len() / 2;
        if unflushed >= CLIP_SAMPLE_RATE as usize {
            writer.flush().map_err(encode_error)?;
            unflushed = 0;
        }
        Ok(())
    };

    while running.load(Ordering::SeqCst) {
        match chunks.recv_timeout(STREAM_POLL) {
            Ok(chunk) => write(&mut writer, converter.push(&chunk)?)?,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    while let Ok(chunk) = chunks.try_recv() {
        write(&mut writer, converter.push(&chunk)?)?;
    }
    write(&mut writer, converter.finish()?)?;

    writer.finalize().map_err(encode_error)
}

fn encode_error(e: hound::Error) -> CaptureError {
    CaptureError::EncodeFailed(e.to_string())
}

fn clip_spec() -> WavSpec {
    WavSpec {
        channels: CLIP_CHANNELS,
        sample_rate: CLIP_SAMPLE_RATE,
        bits_per_sample: CLIP_BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    }
}

fn includes_clip_rate(config: &cpal::SupportedStreamConfigRange) -> bool {
    config.min_sample_rate().0 <= CLIP_SAMPLE_RATE && config.max_sample_rate().0 >= CLIP_SAMPLE_RATE
}

/// Convert interleaved device audio to interleaved stereo
fn to_stereo(samples: &[i16], channels: u16) -> Vec<i16> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().flat_map(|&s| [s, s]).collect(),
        2 => samples.to_vec(),
        n => samples
            .chunks_exact(n as usize)
            .flat_map(|frame| [frame[0], frame[1]])
            .collect(),
    }
}

/// Incremental stereo conversion from the device rate to the clip rate.
///
/// Output is aligned with the input: the resampler's delay is dropped at
/// the start and flushed with silence at the end, so `n` device frames
/// yield `ceil(n * clip_rate / device_rate)` clip frames.
struct ClipConverter {
    resampler: Option<FftFixedIn<f32>>,
    pending: [Vec<f32>; 2],
    source_rate: u32,
    delay: usize,
    frames_in: u64,
    frames_out: u64,
}

impl ClipConverter {
    fn new(source_rate: u32) -> Result<Self, CaptureError> {
        if source_rate == 0 {
            return Err(CaptureError::OpenFailed("Device sample rate is zero".into()));
        }
        let resampler = if source_rate == CLIP_SAMPLE_RATE {
            None
        } else {
            let resampler = FftFixedIn::<f32>::new(
                source_rate as usize,
                CLIP_SAMPLE_RATE as usize,
                RESAMPLE_CHUNK,
                2, // Sub-chunks
                2, // Stereo
            )
            .map_err(|e| CaptureError::OpenFailed(format!("Resampler init failed: {}", e)))?;
            Some(resampler)
        };
        let delay = resampler.as_ref().map_or(0, |r| r.output_delay());

        Ok(Self {
            resampler,
            pending: [Vec::new(), Vec::new()],
            source_rate,
            delay,
            frames_in: 0,
            frames_out: 0,
        })
    }

    /// Clip frames expected for everything pushed so far
    fn expected_frames(&self) -> u64 {
        let rate = u64::from(self.source_rate);
        (self.frames_in * u64::from(CLIP_SAMPLE_RATE)).div_ceil(rate)
    }

    /// Feed interleaved stereo; returns whatever clip audio is ready
    fn push(&mut self, stereo: &[i16]) -> Result<Vec<i16>, CaptureError> {
        let frames = stereo.len() / 2;
        self.frames_in += frames as u64;

        let Some(resampler) = self.resampler.as_mut() else {
            self.frames_out += frames as u64;
            return Ok(stereo[..frames * 2].to_vec());
        };

        for frame in stereo.chunks_exact(2) {
            self.pending[0].push(f32::from(frame[0]) / 32768.0);
            self.pending[1].push(f32::from(frame[1]) / 32768.0);
        }

        let mut out = Vec::new();
        while self.pending[0].len() >= resampler.input_frames_next() {
            let needed = resampler.input_frames_next();
            let chunk: Vec<Vec<f32>> = self
                .pending
                .iter_mut()
                .map(|channel| channel.drain(..needed).collect())
                .collect();
            let resampled = resampler.process(&chunk, None).map_err(resample_error)?;
            emit(&resampled, &mut self.delay, &mut self.frames_out, u64::MAX, &mut out);
        }
        Ok(out)
    }

    /// Drain the pending input and the resampler delay
    fn finish(mut self) -> Result<Vec<i16>, CaptureError> {
        let expected = self.expected_frames();
        let Some(mut resampler) = self.resampler.take() else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        while self.frames_out < expected {
            let needed = resampler.input_frames_next();
            let chunk: Vec<Vec<f32>> = self
                .pending
                .iter_mut()
                .map(|channel| {
                    let take = needed.min(channel.len());
                    let mut part: Vec<f32> = channel.drain(..take).collect();
                    part.resize(needed, 0.0);
                    part
                })
                .collect();
            let resampled = resampler.process(&chunk, None).map_err(resample_error)?;
            emit(&resampled, &mut self.delay, &mut self.frames_out, expected, &mut out);
        }
        Ok(out)
    }
}

/// Interleave resampled channels into `out`, skipping the first `skip`
/// frames and stopping at `limit` frames written overall
fn emit(
    channels: &[Vec<f32>],
    skip: &mut usize,
    frames_out: &mut u64,
    limit: u64,
    out: &mut Vec<i16>,
) {
    let frames = channels[0].len().min(channels[1].len());
    let start = (*skip).min(frames);
    *skip -= start;
    for i in start..frames {
        if *frames_out >= limit {
            break;
        }
        out.push(to_i16(channels[0][i]));
        out.push(to_i16(channels[1][i]));
        *frames_out += 1;
    }
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

fn resample_error(e: rubato::ResampleError) -> CaptureError {
    CaptureError::EncodeFailed(format!("Resampling failed: {}", e))
}
