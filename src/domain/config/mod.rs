//! Configuration domain module

mod app_config;

pub use app_config::{
    AppConfig, DEFAULT_FRAME_RATE, DEFAULT_LOG_LEVEL, MAX_FRAME_RATE, STORAGE_DIR_NAME,
};
