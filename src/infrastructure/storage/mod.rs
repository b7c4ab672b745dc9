//! Clip storage infrastructure module

mod temp_dir;

pub use temp_dir::TempDirStorage;
