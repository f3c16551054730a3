pub mod audio_chunk;
pub mod capture_event;
pub mod config;
pub mod error;
pub mod state;
