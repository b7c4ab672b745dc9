//! Voice Memos - record and play back short audio clips from the terminal
//!
//! This crate provides the core functionality for capturing microphone audio
//! into WAV clips, keeping a newest-first list of them, and playing them back.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Recordings, the recording store, the session state machine and errors
//! - **Application**: The session coordinator, the frame ticker and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal capture, rodio playback, XDG config, etc.)
//! - **CLI**: Argument parsing, the interactive shell and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
