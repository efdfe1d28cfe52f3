//! gsdrive
//!
//! Safe boundary code for driving the Ghostscript interpreter API from Rust.
//! The engine itself does the rendering; this crate makes driving it correct:
//!
//! - **Lifecycle**: [`EngineManager`] owns the engine's single process-wide
//!   instance and serializes create → run → exit → delete under one lock,
//!   with teardown on every path.
//! - **Arguments**: [`args`] compiles validated [`ConversionSettings`] into the
//!   exact, order-sensitive argument vector the engine parses.
//! - **Output**: [`bridge`] adapts the engine's stdio callbacks into
//!   [`OutputEvent`]s for registered observers without ever unwinding across
//!   the native boundary.
//!
//! The real library is linked with the `native` feature (see
//! [`native::SystemEngine`]); everything else works against any
//! [`NativeEngine`] implementation.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "native")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use gsdrive::{ConversionSettings, Device, EngineManager, PageRange, PaperSize};
//! use gsdrive::native::SystemEngine;
//!
//! let manager = EngineManager::new(SystemEngine::new()?);
//! manager.on_stderr(|ev| eprintln!("gs: {}", ev.text));
//!
//! let settings = ConversionSettings::new(Device::Jpeg)
//!     .with_pages(PageRange::between(2, 4))
//!     .with_resolution(300, 300)
//!     .with_paper(PaperSize::A4);
//! manager.convert("out-%d.jpg", &["in.ps"], &settings)?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "native"))]
//! # fn main() {}
//! ```

pub mod error;
pub use error::{Error, Result, ValidationError};

pub mod args;
pub mod bridge;
pub mod codes;
pub mod manager;
pub mod native;
pub mod settings;

// Async-friendly facade (worker-thread backed)
pub mod async_api;

pub use async_api::AsyncConverter;
pub use bridge::{ObserverFault, ObserverId, OutputEvent, Stream};
pub use codes::{ErrorCategory, ErrorCode};
pub use manager::{ConversionReport, EngineManager, LifecycleState, TeardownWarning};
pub use native::{InstanceHandle, NativeEngine, Revision, StdioCallbacks};
pub use settings::{ConversionSettings, Device, Dimensions, PageRange, PageSize, PaperSize, Resolution};

/// Configuration for an `EngineManager`
///
/// # Examples
///
/// ```
/// let cfg = gsdrive::EngineConfig::default();
/// assert_eq!(cfg.program_name, "gsdrive");
/// assert!(!cfg.log_output);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Placeholder passed as `argv[0]`; the engine ignores it
    pub program_name: String,
    /// Forward engine stdout to `log::info!` and stderr to `log::warn!`
    pub log_output: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program_name: args::DEFAULT_PROGRAM_NAME.to_string(),
            log_output: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.program_name, "gsdrive");
        assert!(!config.log_output);
    }

    #[test]
    fn test_library_name_matches_target() {
        if cfg!(windows) {
            assert!(native::LIBRARY_NAME.starts_with("gsdll"));
        } else {
            assert_eq!(native::LIBRARY_NAME, "gs");
        }
    }
}
