// src/lib.rs
//! Diorama scene core
//!
//! An interactive 3D piece viewer: pieces stand on a table, one can be
//! selected and outlined, and the camera either orbits the table or flies
//! in first person to the selected piece. Drawing is left to the host
//! renderer.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod pieces;
pub mod prelude;

// Re-export main types for convenience
pub use app::DioramaApp;
pub use config::ViewerConfig;
pub use error::{DioramaError, Result};

/// Initializes `env_logger` with an `info` default, overridable by `RUST_LOG`
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

/// App over the placeholder figure with default settings
pub fn default() -> Result<DioramaApp> {
    DioramaApp::new(ViewerConfig::default(), gfx::assets::AssetCache::placeholder())
}
