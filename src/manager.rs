//! Instance lifecycle manager
//!
//! The engine tolerates exactly one live instance per process. Every
//! conversion therefore goes through an `EngineManager`, which serializes the
//! create → bind → run → exit → delete sequence behind a single lock:
//!
//! ```text
//! Idle → Creating → Created → (CallbacksBound) → Running → Exited → Deleted → Idle
//! ```
//!
//! Teardown (exit, then delete) happens on every path out of `Created`,
//! including errors and panics, through the `LiveInstance` drop guard.

use std::ffi::CString;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use log::{debug, error, trace, warn};

use crate::args;
use crate::bridge::{ObserverFault, ObserverId, ObserverRegistry, OutputBridge, OutputEvent, Stream};
use crate::codes::{self, ErrorCode};
use crate::native::{self, InstanceHandle, NativeEngine, Revision};
use crate::settings::{ConversionSettings, Device, PageRange};
use crate::{EngineConfig, Error, Result};

/// Where a conversion currently is in the instance lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Creating,
    Created,
    CallbacksBound,
    Running,
    Exited,
    Deleted,
}

/// A cleanup step that failed after the primary result was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownWarning {
    pub code: ErrorCode,
}

impl fmt::Display for TeardownWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine exit failed during teardown: {}", self.code)
    }
}

/// Outcome of a successful conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Non-negative status returned by the run
    pub exit_code: i32,
    /// Teardown problems after a successful run
    pub teardown_warnings: Vec<TeardownWarning>,
    /// Observers that panicked during the run
    pub observer_faults: Vec<ObserverFault>,
}

impl ConversionReport {
    /// True when nothing went wrong on the side channels
    pub fn is_clean(&self) -> bool {
        self.teardown_warnings.is_empty() && self.observer_faults.is_empty()
    }
}

/// Owner of the single native engine instance
///
/// Share one manager (for example behind an `Arc`) between all callers; each
/// `convert` blocks until the engine is free.
pub struct EngineManager<E: NativeEngine> {
    engine: E,
    config: EngineConfig,
    state: Mutex<LifecycleState>,
    observers: ObserverRegistry,
    revision: OnceLock<Revision>,
}

impl<E: NativeEngine> EngineManager<E> {
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, EngineConfig::default())
    }

    pub fn with_config(engine: E, config: EngineConfig) -> Self {
        let observers = ObserverRegistry::new();
        if config.log_output {
            observers.register(
                Some(Stream::Stdout),
                Arc::new(|ev: &OutputEvent| log::info!(target: "gsdrive::engine", "{}", ev.text.trim_end())),
            );
            observers.register(
                Some(Stream::Stderr),
                Arc::new(|ev: &OutputEvent| log::warn!(target: "gsdrive::engine", "{}", ev.text.trim_end())),
            );
        }
        Self {
            engine,
            config,
            state: Mutex::new(LifecycleState::Idle),
            observers,
            revision: OnceLock::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Observe engine stdout during conversions
    pub fn on_stdout<F>(&self, cb: F) -> ObserverId
    where
        F: Fn(&OutputEvent) + Send + Sync + 'static,
    {
        self.observers.register(Some(Stream::Stdout), Arc::new(cb))
    }

    /// Observe engine stderr during conversions
    pub fn on_stderr<F>(&self, cb: F) -> ObserverId
    where
        F: Fn(&OutputEvent) + Send + Sync + 'static,
    {
        self.observers.register(Some(Stream::Stderr), Arc::new(cb))
    }

    /// Observe both engine streams
    pub fn on_output<F>(&self, cb: F) -> ObserverId
    where
        F: Fn(&OutputEvent) + Send + Sync + 'static,
    {
        self.observers.register(None, Arc::new(cb))
    }

    /// Returns false if the observer was not registered
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// Remove every observer, including the log forwarders from `EngineConfig::log_output`
    pub fn clear_observers(&self) {
        self.observers.clear();
    }

    /// Convert `input_paths` into `output_path` with the given settings
    ///
    /// Put `%d` in `output_path` to get one numbered file per page.
    pub fn convert<S: AsRef<str>>(
        &self,
        output_path: &str,
        input_paths: &[S],
        settings: &ConversionSettings,
    ) -> Result<ConversionReport> {
        let args = args::compile_with_program(&self.config.program_name, settings, output_path, input_paths)?;
        self.execute(&args)
    }

    /// Convert a single input file
    pub fn generate_output(
        &self,
        input_path: &str,
        output_path: &str,
        settings: &ConversionSettings,
    ) -> Result<ConversionReport> {
        self.convert(output_path, &[input_path], settings)
    }

    /// Render JPEG thumbnails for `first_page..=last_page`
    ///
    /// With `width` and `height` both zero a small fixed paper size is used,
    /// otherwise the given size in points.
    #[allow(clippy::too_many_arguments)]
    pub fn generate_page_thumbs(
        &self,
        input_path: &str,
        output_path: &str,
        first_page: u32,
        last_page: u32,
        dpi_x: u32,
        dpi_y: u32,
        width: u32,
        height: u32,
    ) -> Result<ConversionReport> {
        let settings = args::thumbnail_settings(first_page, last_page, dpi_x, dpi_y, width, height);
        self.convert(output_path, &[input_path], &settings)
    }

    /// Render a JPEG thumbnail of one page
    #[allow(clippy::too_many_arguments)]
    pub fn generate_page_thumb(
        &self,
        input_path: &str,
        output_path: &str,
        page: u32,
        dpi_x: u32,
        dpi_y: u32,
        width: u32,
        height: u32,
    ) -> Result<ConversionReport> {
        self.generate_page_thumbs(input_path, output_path, page, page, dpi_x, dpi_y, width, height)
    }

    /// Convert PostScript input to a PDF
    ///
    /// Resolution is set to pdfwrite's own default of 720 dpi.
    pub fn ps_to_pdf<S: AsRef<str>>(&self, output_path: &str, input_paths: &[S]) -> Result<ConversionReport> {
        let settings = ConversionSettings::new(Device::PdfWrite)
            .with_pages(PageRange::All)
            .with_quiet(true)
            .with_resolution(720, 720);
        self.convert(output_path, input_paths, &settings)
    }

    /// Engine build metadata, fetched on first use and cached
    pub fn revision(&self) -> Result<&Revision> {
        if let Some(rev) = self.revision.get() {
            return Ok(rev);
        }
        let fetched = self
            .engine
            .revision()
            .map_err(|code| Error::Revision(ErrorCode::from_raw(code)))?;
        debug!("engine revision: {}", fetched);
        Ok(self.revision.get_or_init(|| fetched))
    }

    fn execute(&self, args: &[String]) -> Result<ConversionReport> {
        let c_args = native::to_c_args(args)?;
        debug!("engine arguments: {:?}", args::redacted(args));

        // Snapshot observers before locking; the bridge must outlive the instance.
        let bridge = if self.observers.is_empty() {
            None
        } else {
            Some(self.observers.bridge())
        };

        let mut state = self.state.lock().unwrap_or_else(|poisoned| {
            warn!("engine lock was poisoned by a panicking conversion; recovering");
            poisoned.into_inner()
        });
        *state = LifecycleState::Idle;

        transition(&mut state, LifecycleState::Creating);
        let handle = match self.engine.new_instance() {
            Ok(handle) => handle,
            Err(code) => {
                let kind = ErrorCode::from_raw(code);
                error!("failed to create engine instance: {}", kind);
                *state = LifecycleState::Idle;
                return Err(Error::InstanceCreation(kind));
            }
        };
        transition(&mut state, LifecycleState::Created);

        let mut live = LiveInstance {
            engine: &self.engine,
            handle: Some(handle),
            state: &mut *state,
        };
        let outcome = live.run(bridge.as_ref(), &c_args);
        let teardown_warnings = live.teardown();
        drop(state);

        let observer_faults = bridge.map(|b| b.take_faults()).unwrap_or_default();
        for fault in &observer_faults {
            warn!(
                "output observer {:?} panicked on {:?}: {}",
                fault.observer, fault.stream, fault.message
            );
        }

        let exit_code = outcome?;
        Ok(ConversionReport {
            exit_code,
            teardown_warnings,
            observer_faults,
        })
    }
}

fn transition(state: &mut LifecycleState, next: LifecycleState) {
    trace!("engine lifecycle: {:?} -> {:?}", *state, next);
    *state = next;
}

/// Drop guard over a created instance: exit and delete always run
struct LiveInstance<'a, E: NativeEngine> {
    engine: &'a E,
    handle: Option<InstanceHandle>,
    state: &'a mut LifecycleState,
}

impl<E: NativeEngine> LiveInstance<'_, E> {
    fn run(&mut self, bridge: Option<&OutputBridge>, args: &[CString]) -> Result<i32> {
        let Some(handle) = self.handle.as_ref() else {
            return Err(Error::Other("engine instance already released".into()));
        };

        if let Some(bridge) = bridge {
            codes::check(self.engine.set_stdio(handle, bridge.callbacks())).map_err(Error::StdioBinding)?;
            transition(self.state, LifecycleState::CallbacksBound);
        }

        transition(self.state, LifecycleState::Running);
        codes::check(self.engine.init_with_args(handle, args)).map_err(|kind| {
            debug!("engine run failed: {}", kind);
            Error::Engine(kind)
        })
    }

    fn teardown(mut self) -> Vec<TeardownWarning> {
        self.release()
    }

    fn release(&mut self) -> Vec<TeardownWarning> {
        let Some(handle) = self.handle.take() else {
            return Vec::new();
        };

        let mut warnings = Vec::new();
        if let Err(code) = codes::check(self.engine.exit(&handle)) {
            let warning = TeardownWarning { code };
            warn!("{}", warning);
            warnings.push(warning);
        }
        transition(self.state, LifecycleState::Exited);

        self.engine.delete_instance(handle);
        transition(self.state, LifecycleState::Deleted);
        transition(self.state, LifecycleState::Idle);
        warnings
    }
}

impl<E: NativeEngine> Drop for LiveInstance<'_, E> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::StdioCallbacks;
    use std::ptr::NonNull;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Minimal double: fixed run/exit codes and call counters
    #[derive(Default)]
    struct FakeEngine {
        run_code: i32,
        exit_code: i32,
        created: AtomicUsize,
        exited: AtomicUsize,
        deleted: AtomicUsize,
        bound: AtomicUsize,
        revisions: AtomicUsize,
    }

    impl NativeEngine for FakeEngine {
        fn new_instance(&self) -> std::result::Result<InstanceHandle, i32> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(unsafe { InstanceHandle::from_raw(NonNull::dangling()) })
        }

        fn set_stdio(&self, _handle: &InstanceHandle, callbacks: StdioCallbacks) -> i32 {
            self.bound.fetch_add(1, Ordering::SeqCst);
            unsafe { callbacks.write_stdout(b"hello") };
            0
        }

        fn init_with_args(&self, _handle: &InstanceHandle, _args: &[CString]) -> i32 {
            self.run_code
        }

        fn exit(&self, _handle: &InstanceHandle) -> i32 {
            self.exited.fetch_add(1, Ordering::SeqCst);
            self.exit_code
        }

        fn delete_instance(&self, _handle: InstanceHandle) {
            self.deleted.fetch_add(1, Ordering::SeqCst);
        }

        fn revision(&self) -> std::result::Result<Revision, i32> {
            self.revisions.fetch_add(1, Ordering::SeqCst);
            Ok(Revision {
                product: "GPL Ghostscript".into(),
                copyright: "Copyright (C) Artifex Software, Inc.".into(),
                revision: 10051,
                revision_date: 20250312,
            })
        }
    }

    fn settings() -> ConversionSettings {
        ConversionSettings::new(Device::Png16m)
            .with_resolution(72, 72)
            .with_rendering_threads(1)
    }

    #[test]
    fn successful_run_tears_down_once() {
        let manager = EngineManager::new(FakeEngine::default());
        let report = manager.convert("out.png", &["in.pdf"], &settings()).unwrap();
        assert!(report.is_clean());
        let e = manager.engine();
        assert_eq!(e.created.load(Ordering::SeqCst), 1);
        assert_eq!(e.exited.load(Ordering::SeqCst), 1);
        assert_eq!(e.deleted.load(Ordering::SeqCst), 1);
        // no observers, so no binding
        assert_eq!(e.bound.load(Ordering::SeqCst), 0);
        assert_eq!(*manager.state.lock().unwrap(), LifecycleState::Idle);
    }

    #[test]
    fn exit_failure_after_success_is_a_warning() {
        let engine = FakeEngine {
            exit_code: -12,
            ..Default::default()
        };
        let manager = EngineManager::new(engine);
        let report = manager.convert("out.png", &["in.pdf"], &settings()).unwrap();
        assert_eq!(report.teardown_warnings, vec![TeardownWarning { code: ErrorCode::IoError }]);
        assert_eq!(manager.engine().deleted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn exit_failure_does_not_mask_run_failure() {
        let engine = FakeEngine {
            run_code: -15,
            exit_code: -12,
            ..Default::default()
        };
        let manager = EngineManager::new(engine);
        let err = manager.convert("out.png", &["in.pdf"], &settings()).unwrap_err();
        assert!(matches!(err, Error::Engine(ErrorCode::RangeCheck)));
    }

    #[test]
    fn positive_run_status_is_passed_through() {
        let engine = FakeEngine {
            run_code: 3,
            ..Default::default()
        };
        let manager = EngineManager::new(engine);
        let report = manager.convert("out.png", &["in.pdf"], &settings()).unwrap();
        assert_eq!(report.exit_code, 3);
        assert!(report.teardown_warnings.is_empty());
    }

    #[test]
    fn observers_trigger_binding() {
        let manager = EngineManager::new(FakeEngine::default());
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = seen.clone();
        manager.on_stdout(move |ev| sink.lock().unwrap().push_str(&ev.text));
        manager.convert("out.png", &["in.pdf"], &settings()).unwrap();
        assert_eq!(manager.engine().bound.load(Ordering::SeqCst), 1);
        assert_eq!(*seen.lock().unwrap(), "hello");
    }

    #[test]
    fn log_output_config_binds_callbacks() {
        let config = EngineConfig {
            log_output: true,
            ..Default::default()
        };
        let manager = EngineManager::with_config(FakeEngine::default(), config);
        manager.convert("out.png", &["in.pdf"], &settings()).unwrap();
        assert_eq!(manager.engine().bound.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn revision_is_fetched_once() {
        let manager = EngineManager::new(FakeEngine::default());
        let first = manager.revision().unwrap().clone();
        let second = manager.revision().unwrap();
        assert_eq!(&first, second);
        assert_eq!(first.revision, 10051);
        assert_eq!(manager.engine().revisions.load(Ordering::SeqCst), 1);
    }
}
