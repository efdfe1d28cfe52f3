//! Callback bridge between the engine's stdio ABI and output observers
//!
//! The engine writes through plain C callbacks that must report how many bytes
//! they consumed and must never unwind. The adapters here always report the
//! full length, turn each write into an [`OutputEvent`], and contain observer
//! panics as [`ObserverFault`]s that the manager surfaces after the run.

use std::ffi::{c_char, c_int, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::native::StdioCallbacks;

/// Which engine stream a chunk of output came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// A chunk of text the engine wrote during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    pub stream: Stream,
    /// Exactly the bytes the engine reported, decoded lossily as UTF-8
    pub text: String,
}

/// Observer callback for engine output
pub type OutputHandler = Arc<dyn Fn(&OutputEvent) + Send + Sync>;

/// Identifies a registered observer so it can be removed later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

/// An observer that panicked while handling an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverFault {
    pub observer: ObserverId,
    pub stream: Stream,
    pub message: String,
}

#[derive(Clone)]
struct Registration {
    id: ObserverId,
    /// `None` observes both streams
    stream: Option<Stream>,
    handler: OutputHandler,
}

/// Thread-safe list of observers, kept in registration order
#[derive(Default)]
pub struct ObserverRegistry {
    next_id: AtomicU64,
    observers: RwLock<Vec<Registration>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for one stream, or both when `stream` is `None`
    pub fn register(&self, stream: Option<Stream>, handler: OutputHandler) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut observers = self.observers.write().unwrap_or_else(|e| e.into_inner());
        observers.push(Registration { id, stream, handler });
        id
    }

    /// Returns false if no observer had this id
    pub fn remove(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write().unwrap_or_else(|e| e.into_inner());
        let before = observers.len();
        observers.retain(|r| r.id != id);
        observers.len() != before
    }

    pub fn clear(&self) {
        self.observers.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn len(&self) -> usize {
        self.observers.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freeze the current observers into a bridge for one run
    pub fn bridge(&self) -> OutputBridge {
        let observers = self.observers.read().unwrap_or_else(|e| e.into_inner());
        let select = |stream: Stream| -> Vec<(ObserverId, OutputHandler)> {
            observers
                .iter()
                .filter(|r| r.stream.map_or(true, |s| s == stream))
                .map(|r| (r.id, r.handler.clone()))
                .collect()
        };
        OutputBridge {
            stdout: select(Stream::Stdout),
            stderr: select(Stream::Stderr),
            faults: Mutex::new(Vec::new()),
        }
    }
}

/// Per-run snapshot of observers, addressed by the native callbacks
///
/// The manager owns the bridge for the duration of one run and drops it only
/// after the instance has been deleted.
pub struct OutputBridge {
    stdout: Vec<(ObserverId, OutputHandler)>,
    stderr: Vec<(ObserverId, OutputHandler)>,
    faults: Mutex<Vec<ObserverFault>>,
}

impl OutputBridge {
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }

    /// Callback table pointing back at this bridge
    ///
    /// The returned table is only valid while `self` is alive and not moved.
    pub fn callbacks(&self) -> StdioCallbacks {
        StdioCallbacks {
            caller_handle: self as *const OutputBridge as *mut c_void,
            stdin: stdin_eof,
            stdout: stdout_adapter,
            stderr: stderr_adapter,
        }
    }

    /// Deliver `bytes` to every observer of `stream`, in registration order
    pub fn deliver(&self, stream: Stream, bytes: &[u8]) {
        let observers = match stream {
            Stream::Stdout => &self.stdout,
            Stream::Stderr => &self.stderr,
        };
        if observers.is_empty() {
            return;
        }

        let event = OutputEvent {
            stream,
            text: String::from_utf8_lossy(bytes).into_owned(),
        };
        for (id, handler) in observers {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                self.record_fault(ObserverFault {
                    observer: *id,
                    stream,
                    message: panic_message(payload.as_ref()),
                });
            }
        }
    }

    /// Drain the faults collected so far
    pub fn take_faults(&self) -> Vec<ObserverFault> {
        std::mem::take(&mut *self.faults.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn record_fault(&self, fault: ObserverFault) {
        self.faults.lock().unwrap_or_else(|e| e.into_inner()).push(fault);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "observer panicked".to_string()
    }
}

/// Always end-of-input: the engine must never wait on us.
unsafe extern "system" fn stdin_eof(_caller_handle: *mut c_void, _buf: *mut c_char, _len: c_int) -> c_int {
    0
}

unsafe extern "system" fn stdout_adapter(caller_handle: *mut c_void, buf: *const c_char, len: c_int) -> c_int {
    forward(caller_handle, Stream::Stdout, buf, len)
}

unsafe extern "system" fn stderr_adapter(caller_handle: *mut c_void, buf: *const c_char, len: c_int) -> c_int {
    forward(caller_handle, Stream::Stderr, buf, len)
}

unsafe fn forward(caller_handle: *mut c_void, stream: Stream, buf: *const c_char, len: c_int) -> c_int {
    if len <= 0 {
        return 0;
    }
    if caller_handle.is_null() || buf.is_null() {
        return len;
    }
    // SAFETY: `caller_handle` came from `OutputBridge::callbacks` and the
    // bridge outlives the instance; the engine guarantees `len` readable bytes.
    let bridge = &*(caller_handle as *const OutputBridge);
    let bytes = std::slice::from_raw_parts(buf.cast::<u8>(), len as usize);
    // `deliver` contains observer panics itself; this guards the rest.
    let _ = catch_unwind(AssertUnwindSafe(|| bridge.deliver(stream, bytes)));
    len
}
