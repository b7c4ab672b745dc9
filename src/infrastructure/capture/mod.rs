//! Capture infrastructure module
//!
//! Microphone capture through cpal, written to WAV clips with hound.

mod cpal_capture;

pub use cpal_capture::{CpalCapture, CpalCaptureHandle};
